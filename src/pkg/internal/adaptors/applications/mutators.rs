use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, types::Json};

use crate::pkg::internal::adaptors::{
    applications::{
        selectors::ApplicationSelector,
        spec::{
            ApplicationEntry, ApplicationStatus, CreateApplicationInput, PatchApplicationInput,
        },
    },
    companies::selectors::CompanySelector,
    students::selectors::StudentSelector,
};
use crate::prelude::{Error, Result};

const RETURNING: &str =
    "RETURNING id, student_id, company_id, status, applied_at, rounds, remarks, updated_at";

pub struct ApplicationMutator<'a> {
    pool: &'a PgPool,
}

impl<'a> ApplicationMutator<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        ApplicationMutator { pool }
    }

    /// Referenced student and company must exist at creation time.
    pub async fn create(&self, application: CreateApplicationInput) -> Result<ApplicationEntry> {
        self.check_references(std::slice::from_ref(&application)).await?;
        let mut conn = self.pool.acquire().await?;
        insert_one(&mut *conn, application).await
    }

    /// Every reference in the batch is validated before any insert; the batch
    /// then goes in as a single transaction, all-or-nothing.
    pub async fn create_bulk(
        &self,
        applications: Vec<CreateApplicationInput>,
    ) -> Result<Vec<ApplicationEntry>> {
        self.check_references(&applications).await?;
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(applications.len());
        for application in applications {
            created.push(insert_one(&mut *tx, application).await?);
        }
        tx.commit().await?;
        Ok(created)
    }

    pub async fn update(
        &self,
        id: i32,
        patch: PatchApplicationInput,
    ) -> Result<Option<ApplicationEntry>> {
        if patch.is_empty() {
            return ApplicationSelector::new(self.pool).get_by_id(id).await;
        }
        let mut qb = QueryBuilder::new("UPDATE applications SET ");
        push_set(&mut qb, &patch);
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" ").push(RETURNING);
        let row = qb
            .build_query_as::<ApplicationEntry>()
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn check_references(&self, applications: &[CreateApplicationInput]) -> Result<()> {
        let mut student_ids: Vec<i32> = applications.iter().map(|a| a.student_id).collect();
        let mut company_ids: Vec<i32> = applications.iter().map(|a| a.company_id).collect();
        student_ids.sort_unstable();
        student_ids.dedup();
        company_ids.sort_unstable();
        company_ids.dedup();

        let student_selector = StudentSelector::new(self.pool);
        let company_selector = CompanySelector::new(self.pool);
        let (missing_students, missing_companies) = tokio::try_join!(
            student_selector.missing_ids(&student_ids),
            company_selector.missing_ids(&company_ids),
        )?;
        if !missing_students.is_empty() {
            return Err(Error::NotFound("Student not found".to_string()));
        }
        if !missing_companies.is_empty() {
            return Err(Error::NotFound("Company not found".to_string()));
        }
        Ok(())
    }
}

async fn insert_one(
    conn: &mut PgConnection,
    application: CreateApplicationInput,
) -> Result<ApplicationEntry> {
    let row = sqlx::query_as::<_, ApplicationEntry>(&format!(
        r#"
        INSERT INTO applications (student_id, company_id, status, applied_at, rounds, remarks)
        VALUES ($1, $2, $3, COALESCE($4, NOW()), $5, $6)
        {}
        "#,
        RETURNING
    ))
    .bind(application.student_id)
    .bind(application.company_id)
    .bind(application.status.unwrap_or(ApplicationStatus::Applied))
    .bind(application.applied_at)
    .bind(Json(application.rounds.unwrap_or_default()))
    .bind(application.remarks)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row)
}

fn push_set(qb: &mut QueryBuilder<'_, Postgres>, patch: &PatchApplicationInput) {
    let mut set = qb.separated(", ");
    // any mutation bumps the last-updated stamp
    set.push("updated_at = NOW()");
    if let Some(student_id) = &patch.student_id {
        set.push("student_id = ").push_bind_unseparated(*student_id);
    }
    if let Some(company_id) = &patch.company_id {
        set.push("company_id = ").push_bind_unseparated(*company_id);
    }
    if let Some(status) = &patch.status {
        set.push("status = ").push_bind_unseparated(*status);
    }
    if let Some(applied_at) = &patch.applied_at {
        set.push("applied_at = ").push_bind_unseparated(*applied_at);
    }
    if let Some(rounds) = &patch.rounds {
        set.push("rounds = ").push_bind_unseparated(Json(rounds.clone()));
    }
    if let Some(remarks) = &patch.remarks {
        set.push("remarks = ").push_bind_unseparated(remarks.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkg::internal::adaptors::applications::spec::Round;

    #[test]
    fn status_patch_bumps_updated_at() {
        let patch = PatchApplicationInput {
            status: Some(ApplicationStatus::Selected),
            remarks: Some("cleared final round".into()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::new("UPDATE applications SET ");
        push_set(&mut qb, &patch);
        assert_eq!(
            qb.sql(),
            "UPDATE applications SET updated_at = NOW(), status = $1, remarks = $2"
        );
    }

    #[test]
    fn round_list_patch_binds_json() {
        let patch = PatchApplicationInput {
            rounds: Some(vec![Round {
                round_name: Some("Technical 1".into()),
                result: Some("Pending".into()),
                date: None,
            }]),
            ..Default::default()
        };
        let mut qb = QueryBuilder::new("UPDATE applications SET ");
        push_set(&mut qb, &patch);
        assert_eq!(qb.sql(), "UPDATE applications SET updated_at = NOW(), rounds = $1");
    }
}
