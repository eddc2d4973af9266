use sqlx::PgPool;

use crate::pkg::internal::adaptors::admins::spec::AdminEntry;
use crate::prelude::Result;

const COLUMNS: &str = "id, name, email, password, role, created_at";

pub struct AdminSelector<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminSelector<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        AdminSelector { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<AdminEntry>> {
        let row = sqlx::query_as::<_, AdminEntry>(&format!(
            "SELECT {} FROM admins WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<AdminEntry>> {
        let row = sqlx::query_as::<_, AdminEntry>(&format!(
            "SELECT {} FROM admins WHERE email = $1",
            COLUMNS
        ))
        .bind(email.trim().to_lowercase())
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }
}
