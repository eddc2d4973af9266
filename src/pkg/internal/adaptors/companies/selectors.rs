use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::pkg::internal::{
    adaptors::companies::spec::{CompanyEntry, CompanyListFilter},
    filters::Pagination,
};
use crate::prelude::Result;

const COLUMNS: &str = "id, company_name, job_role, job_type, ctc, location, \
     cgpa, backlog_allowed, recruitment_date, created_at";

pub struct CompanySelector<'a> {
    pool: &'a PgPool,
}

impl<'a> CompanySelector<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        CompanySelector { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<CompanyEntry>> {
        let row = sqlx::query_as::<_, CompanyEntry>(&format!(
            "SELECT {} FROM companies WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list(
        &self,
        filter: &CompanyListFilter,
        page: Pagination,
    ) -> Result<(Vec<CompanyEntry>, i64)> {
        let mut rows_qb = QueryBuilder::new(format!("SELECT {} FROM companies", COLUMNS));
        push_conditions(&mut rows_qb, filter);
        rows_qb
            .push(" ORDER BY company_name ASC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM companies");
        push_conditions(&mut count_qb, filter);

        let (rows, total) = tokio::try_join!(
            rows_qb.build_query_as::<CompanyEntry>().fetch_all(self.pool),
            count_qb.build_query_scalar::<i64>().fetch_one(self.pool),
        )?;
        Ok((rows, total))
    }

    pub async fn missing_ids(&self, ids: &[i32]) -> Result<Vec<i32>> {
        let found: Vec<i32> =
            sqlx::query_scalar::<_, i32>("SELECT id FROM companies WHERE id = ANY($1)")
                .bind(ids.to_vec())
                .fetch_all(self.pool)
                .await?;
        Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }
}

fn push_conditions(qb: &mut QueryBuilder<'_, Postgres>, filter: &CompanyListFilter) {
    let mut sep = " WHERE ";
    if let Some(job_type) = &filter.job_type {
        qb.push(sep);
        sep = " AND ";
        // text comparison so an unknown label matches nothing instead of
        // failing enum coercion
        qb.push("job_type::text = ").push_bind(job_type.clone());
    }
    if let Some(location) = &filter.location {
        qb.push(sep);
        sep = " AND ";
        qb.push("location = ").push_bind(location.clone());
    }
    if let Some(name) = &filter.company_name {
        qb.push(sep);
        qb.push("company_name ILIKE ").push_bind(format!("%{}%", name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_filter_is_substring_match() {
        let filter = CompanyListFilter {
            company_name: Some("tech".into()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM companies");
        push_conditions(&mut qb, &filter);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM companies WHERE company_name ILIKE $1"
        );
    }

    #[test]
    fn all_filters_combine() {
        let filter = CompanyListFilter {
            job_type: Some("Internship".into()),
            location: Some("Bengaluru".into()),
            company_name: Some("ini".into()),
        };
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM companies");
        push_conditions(&mut qb, &filter);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM companies WHERE job_type::text = $1 \
             AND location = $2 AND company_name ILIKE $3"
        );
    }
}
