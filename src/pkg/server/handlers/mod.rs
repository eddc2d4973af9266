pub mod admin;
pub mod applications;
pub mod companies;
pub mod probes;
pub mod students;

use serde::Deserialize;

/// Create endpoints accept either a single object or an array for bulk
/// insertion, distinguished by shape.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_object_and_array_both_parse() {
        let one: OneOrMany<i32> = serde_json::from_str("3").unwrap();
        assert!(matches!(one, OneOrMany::One(3)));
        let many: OneOrMany<i32> = serde_json::from_str("[1, 2]").unwrap();
        match many {
            OneOrMany::Many(v) => assert_eq!(v, vec![1, 2]),
            _ => panic!("expected bulk shape"),
        }
    }
}
