use sqlx::PgPool;

use crate::pkg::internal::{
    adaptors::admins::spec::{AdminEntry, RegisterAdminInput},
    auth,
};
use crate::prelude::Result;

pub struct AdminMutator<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminMutator<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        AdminMutator { pool }
    }

    pub async fn create(&self, admin: RegisterAdminInput) -> Result<AdminEntry> {
        let row = sqlx::query_as::<_, AdminEntry>(
            r#"
            INSERT INTO admins (name, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password, role, created_at
            "#,
        )
        .bind(admin.name.trim())
        .bind(admin.email.trim().to_lowercase())
        .bind(auth::hash_password(&admin.password))
        .bind(admin.role.unwrap_or_else(|| "admin".to_string()))
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }
}
