use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::pkg::internal::adaptors::companies::{
    selectors::CompanySelector,
    spec::{CompanyEntry, CreateCompanyInput, PatchCompanyInput},
};
use crate::prelude::Result;

const RETURNING: &str = "RETURNING id, company_name, job_role, job_type, ctc, location, \
     cgpa, backlog_allowed, recruitment_date, created_at";

pub struct CompanyMutator<'a> {
    pool: &'a PgPool,
}

impl<'a> CompanyMutator<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        CompanyMutator { pool }
    }

    pub async fn create(&self, company: CreateCompanyInput) -> Result<CompanyEntry> {
        let mut conn = self.pool.acquire().await?;
        insert_one(&mut *conn, company).await
    }

    pub async fn create_bulk(
        &self,
        companies: Vec<CreateCompanyInput>,
    ) -> Result<Vec<CompanyEntry>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(companies.len());
        for company in companies {
            created.push(insert_one(&mut *tx, company).await?);
        }
        tx.commit().await?;
        Ok(created)
    }

    pub async fn update(
        &self,
        id: i32,
        patch: PatchCompanyInput,
    ) -> Result<Option<CompanyEntry>> {
        if patch.is_empty() {
            return CompanySelector::new(self.pool).get_by_id(id).await;
        }
        let mut qb = QueryBuilder::new("UPDATE companies SET ");
        push_set(&mut qb, &patch);
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" ").push(RETURNING);
        let row = qb
            .build_query_as::<CompanyEntry>()
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn insert_one(
    conn: &mut PgConnection,
    company: CreateCompanyInput,
) -> Result<CompanyEntry> {
    let eligibility = company.eligibility_criteria.unwrap_or_default();
    let row = sqlx::query_as::<_, CompanyEntry>(&format!(
        r#"
        INSERT INTO companies
            (company_name, job_role, job_type, ctc, location, cgpa, backlog_allowed, recruitment_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        {}
        "#,
        RETURNING
    ))
    .bind(company.company_name)
    .bind(company.job_role)
    .bind(company.job_type)
    .bind(company.ctc)
    .bind(company.location.unwrap_or_else(|| "Multiple".to_string()))
    .bind(eligibility.cgpa)
    .bind(eligibility.backlog_allowed)
    .bind(company.recruitment_date)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row)
}

fn push_set(qb: &mut QueryBuilder<'_, Postgres>, patch: &PatchCompanyInput) {
    let mut set = qb.separated(", ");
    if let Some(name) = &patch.company_name {
        set.push("company_name = ").push_bind_unseparated(name.clone());
    }
    if let Some(role) = &patch.job_role {
        set.push("job_role = ").push_bind_unseparated(role.clone());
    }
    if let Some(job_type) = &patch.job_type {
        set.push("job_type = ").push_bind_unseparated(*job_type);
    }
    if let Some(ctc) = &patch.ctc {
        set.push("ctc = ").push_bind_unseparated(ctc.clone());
    }
    if let Some(location) = &patch.location {
        set.push("location = ").push_bind_unseparated(location.clone());
    }
    if let Some(ec) = &patch.eligibility_criteria {
        set.push("cgpa = ").push_bind_unseparated(ec.cgpa);
        set.push("backlog_allowed = ").push_bind_unseparated(ec.backlog_allowed);
    }
    if let Some(date) = &patch.recruitment_date {
        set.push("recruitment_date = ").push_bind_unseparated(*date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkg::internal::adaptors::companies::spec::EligibilityCriteria;

    #[test]
    fn eligibility_patch_sets_both_columns() {
        let patch = PatchCompanyInput {
            eligibility_criteria: Some(EligibilityCriteria { cgpa: 8.0, backlog_allowed: false }),
            ..Default::default()
        };
        let mut qb = QueryBuilder::new("UPDATE companies SET ");
        push_set(&mut qb, &patch);
        assert_eq!(qb.sql(), "UPDATE companies SET cgpa = $1, backlog_allowed = $2");
    }
}
