use sqlx::PgPool;

use crate::pkg::internal::adaptors::{
    applications::spec::{ApplicationDetail, ApplicationEntry},
    companies::selectors::CompanySelector,
    students::selectors::StudentSelector,
};
use crate::prelude::Result;

const COLUMNS: &str =
    "id, student_id, company_id, status, applied_at, rounds, remarks, updated_at";

pub struct ApplicationSelector<'a> {
    pool: &'a PgPool,
}

impl<'a> ApplicationSelector<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        ApplicationSelector { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<ApplicationEntry>> {
        let row = sqlx::query_as::<_, ApplicationEntry>(&format!(
            "SELECT {} FROM applications WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// By-id lookup with populated references. An orphaned application is
    /// still returned, its dangling side comes back as None.
    pub async fn get_detail(&self, id: i32) -> Result<Option<ApplicationDetail>> {
        let Some(application) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let student_selector = StudentSelector::new(self.pool);
        let company_selector = CompanySelector::new(self.pool);
        let (student, company) = tokio::try_join!(
            student_selector.get_by_id(application.student_id),
            company_selector.get_by_id(application.company_id),
        )?;
        Ok(Some(ApplicationDetail { application, student, company }))
    }
}
