pub mod admins;
pub mod applications;
pub mod companies;
pub mod students;
