use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::pkg::internal::{
    adaptors::students::spec::{StudentEntry, StudentListFilter},
    filters::{IntParam, Pagination},
};
use crate::prelude::Result;

const COLUMNS: &str = "id, name, email, mobile_number, usn, course, sem, branch, role";

pub struct StudentSelector<'a> {
    pool: &'a PgPool,
}

impl<'a> StudentSelector<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        StudentSelector { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<StudentEntry>> {
        let row = sqlx::query_as::<_, StudentEntry>(&format!(
            "SELECT {} FROM students WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Case-insensitive entry point, the stored USN is always upper-case.
    pub async fn get_by_usn(&self, usn: &str) -> Result<Option<StudentEntry>> {
        let row = sqlx::query_as::<_, StudentEntry>(&format!(
            "SELECT {} FROM students WHERE usn = $1",
            COLUMNS
        ))
        .bind(usn.trim().to_uppercase())
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Filtered page plus the pre-pagination total, fetched concurrently.
    pub async fn list(
        &self,
        filter: &StudentListFilter,
        page: Pagination,
    ) -> Result<(Vec<StudentEntry>, i64)> {
        let mut rows_qb = QueryBuilder::new(format!("SELECT {} FROM students", COLUMNS));
        push_conditions(&mut rows_qb, filter);
        rows_qb
            .push(" ORDER BY name ASC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM students");
        push_conditions(&mut count_qb, filter);

        let (rows, total) = tokio::try_join!(
            rows_qb.build_query_as::<StudentEntry>().fetch_all(self.pool),
            count_qb.build_query_scalar::<i64>().fetch_one(self.pool),
        )?;
        Ok((rows, total))
    }

    /// Which of the given ids do not exist, used to validate application
    /// references before insert.
    pub async fn missing_ids(&self, ids: &[i32]) -> Result<Vec<i32>> {
        let found: Vec<i32> =
            sqlx::query_scalar::<_, i32>("SELECT id FROM students WHERE id = ANY($1)")
                .bind(ids.to_vec())
                .fetch_all(self.pool)
                .await?;
        Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }
}

fn push_conditions(qb: &mut QueryBuilder<'_, Postgres>, filter: &StudentListFilter) {
    let mut sep = " WHERE ";
    if let Some(sem) = &filter.sem {
        qb.push(sep);
        sep = " AND ";
        match sem {
            IntParam::Value(v) => {
                qb.push("sem = ").push_bind(*v);
            }
            // unparseable input executes but matches nothing
            IntParam::Opaque(raw) => {
                qb.push("sem::text = ").push_bind(raw.clone());
            }
        }
    }
    if let Some(branch) = &filter.branch {
        qb.push(sep);
        sep = " AND ";
        qb.push("branch = ").push_bind(branch.clone());
    }
    if let Some(course) = &filter.course {
        qb.push(sep);
        qb.push("course = ").push_bind(course.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_filters_means_no_where_clause() {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM students");
        push_conditions(&mut qb, &StudentListFilter::default());
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM students");
    }

    #[test]
    fn filters_join_with_and() {
        let filter = StudentListFilter {
            sem: Some(IntParam::Value(7)),
            branch: Some("CSE".into()),
            course: Some("BE".into()),
        };
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM students");
        push_conditions(&mut qb, &filter);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM students WHERE sem = $1 AND branch = $2 AND course = $3"
        );
    }

    #[test]
    fn opaque_sem_compares_as_text() {
        let filter = StudentListFilter {
            sem: Some(IntParam::Opaque("abc".into())),
            ..Default::default()
        };
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM students");
        push_conditions(&mut qb, &filter);
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM students WHERE sem::text = $1");
    }
}
