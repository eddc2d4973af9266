//! Joined reporting queries over applications. Every dashboard and listing
//! view is produced by one parametrized builder: a [`FilterSpec`] supplies
//! the match conditions, a [`ReportShape`] picks the projection. Inner joins
//! implement the drop-dangling-reference semantics, so an application whose
//! student or company was deleted never shows up here.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder, prelude::FromRow, types::Json};

use crate::pkg::internal::{
    adaptors::applications::spec::Round,
    filters::{FilterSpec, IntParam, MonthParam, Pagination, RefParam},
};
use crate::prelude::Result;

const REPORT_SOURCE: &str = " FROM applications a \
     JOIN students s ON s.id = a.student_id \
     JOIN companies c ON c.id = a.company_id";

const REPORT_COLUMNS: &str = "a.id, a.status::text AS status, a.applied_at, a.rounds, \
     a.remarks, a.updated_at, \
     s.id AS student_id, s.name AS student_name, s.usn, s.course, s.sem, s.branch, \
     s.email, s.mobile_number, \
     c.id AS company_id, c.company_name, c.job_role, c.job_type::text AS job_type, \
     c.ctc, c.location, c.recruitment_date";

#[derive(Debug, Clone, Copy)]
pub enum ReportShape {
    /// Full reshape, newest first, paginated.
    Rows(Pagination),
    /// Pre-pagination count over the same joined source.
    Count,
    /// Per-company selected counts, largest first.
    CompanySelections,
    /// Per-status counts; statuses with no matches are simply absent.
    StatusDistribution,
}

pub fn report_query(spec: &FilterSpec, shape: ReportShape) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(match shape {
        ReportShape::Rows(_) => format!("SELECT {}{}", REPORT_COLUMNS, REPORT_SOURCE),
        ReportShape::Count => format!("SELECT COUNT(*){}", REPORT_SOURCE),
        ReportShape::CompanySelections => format!(
            "SELECT c.company_name, COUNT(*) AS selected_count{}",
            REPORT_SOURCE
        ),
        ReportShape::StatusDistribution => format!(
            "SELECT a.status::text AS status, COUNT(*) AS count{}",
            REPORT_SOURCE
        ),
    });

    let mut conj = Conjunction::new();
    push_application_conditions(&mut qb, &mut conj, spec);
    push_student_conditions(&mut qb, &mut conj, spec);
    push_company_conditions(&mut qb, &mut conj, spec);

    match shape {
        ReportShape::Rows(page) => {
            qb.push(" ORDER BY a.applied_at DESC LIMIT ")
                .push_bind(page.limit)
                .push(" OFFSET ")
                .push_bind(page.offset());
        }
        ReportShape::Count => {}
        ReportShape::CompanySelections => {
            qb.push(" GROUP BY c.id, c.company_name ORDER BY selected_count DESC");
        }
        ReportShape::StatusDistribution => {
            qb.push(" GROUP BY a.status");
        }
    }
    qb
}

/// Tracks whether the next condition opens the WHERE clause or extends it.
struct Conjunction(bool);

impl Conjunction {
    fn new() -> Self {
        Conjunction(true)
    }

    fn next(&mut self) -> &'static str {
        if self.0 {
            self.0 = false;
            " WHERE "
        } else {
            " AND "
        }
    }
}

fn push_application_conditions(
    qb: &mut QueryBuilder<'static, Postgres>,
    conj: &mut Conjunction,
    spec: &FilterSpec,
) {
    if let Some(status) = &spec.status {
        qb.push(conj.next());
        // compared as text so an unknown status matches nothing
        qb.push("a.status::text = ").push_bind(status.clone());
    }
    if let Some(student) = &spec.student {
        qb.push(conj.next());
        push_ref(qb, "a.student_id", student);
    }
    if let Some(company) = &spec.company {
        qb.push(conj.next());
        push_ref(qb, "a.company_id", company);
    }
}

fn push_student_conditions(
    qb: &mut QueryBuilder<'static, Postgres>,
    conj: &mut Conjunction,
    spec: &FilterSpec,
) {
    if let Some(sem) = &spec.sem {
        qb.push(conj.next());
        match sem {
            IntParam::Value(v) => {
                qb.push("s.sem = ").push_bind(*v);
            }
            IntParam::Opaque(raw) => {
                qb.push("s.sem::text = ").push_bind(raw.clone());
            }
        }
    }
    if let Some(course) = &spec.course {
        qb.push(conj.next());
        qb.push("s.course = ").push_bind(course.clone());
    }
}

fn push_company_conditions(
    qb: &mut QueryBuilder<'static, Postgres>,
    conj: &mut Conjunction,
    spec: &FilterSpec,
) {
    if let Some(job_type) = &spec.job_type {
        qb.push(conj.next());
        qb.push("c.job_type::text = ").push_bind(job_type.clone());
    }
    if let Some(month) = &spec.recruitment_month {
        qb.push(conj.next());
        match month {
            MonthParam::Range(start, end) => {
                qb.push("c.recruitment_date >= ")
                    .push_bind(*start)
                    .push(" AND c.recruitment_date < ")
                    .push_bind(*end);
            }
            // malformed month executes but matches nothing
            MonthParam::Opaque(raw) => {
                qb.push("c.recruitment_date::text = ").push_bind(raw.clone());
            }
        }
    }
}

/// An unparseable reference is forwarded as a text comparison; it executes
/// without error and matches no row.
fn push_ref(qb: &mut QueryBuilder<'static, Postgres>, column: &str, param: &RefParam) {
    match param {
        RefParam::Key(id) => {
            qb.push(column).push(" = ").push_bind(*id);
        }
        RefParam::Opaque(raw) => {
            qb.push(column).push("::text = ").push_bind(raw.clone());
        }
    }
}

#[derive(FromRow)]
struct ReportRow {
    id: i32,
    status: String,
    applied_at: DateTime<Utc>,
    rounds: Json<Vec<Round>>,
    remarks: Option<String>,
    updated_at: DateTime<Utc>,
    student_id: i32,
    student_name: String,
    usn: String,
    course: String,
    sem: i32,
    branch: String,
    email: String,
    mobile_number: String,
    company_id: i32,
    company_name: String,
    job_role: String,
    job_type: String,
    ctc: String,
    location: String,
    recruitment_date: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: i32,
    pub name: String,
    pub usn: String,
    pub course: String,
    pub sem: i32,
    pub branch: String,
    pub email: String,
    pub mobile: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    pub id: i32,
    pub name: String,
    pub job_role: String,
    pub job_type: String,
    pub ctc: String,
    pub location: String,
    pub recruitment_date: DateTime<Utc>,
}

/// One flattened listing row: application fields plus joined summaries.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationReport {
    pub id: i32,
    pub status: String,
    pub applied_at: DateTime<Utc>,
    pub rounds: Json<Vec<Round>>,
    pub remarks: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub student: StudentSummary,
    pub company: CompanySummary,
}

impl From<ReportRow> for ApplicationReport {
    fn from(row: ReportRow) -> Self {
        ApplicationReport {
            id: row.id,
            status: row.status,
            applied_at: row.applied_at,
            rounds: row.rounds,
            remarks: row.remarks,
            updated_at: row.updated_at,
            student: StudentSummary {
                id: row.student_id,
                name: row.student_name,
                usn: row.usn,
                course: row.course,
                sem: row.sem,
                branch: row.branch,
                email: row.email,
                mobile: row.mobile_number,
            },
            company: CompanySummary {
                id: row.company_id,
                name: row.company_name,
                job_role: row.job_role,
                job_type: row.job_type,
                ctc: row.ctc,
                location: row.location,
                recruitment_date: row.recruitment_date,
            },
        }
    }
}

#[derive(FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CompanySelection {
    pub company_name: String,
    pub selected_count: i64,
}

#[derive(FromRow, Serialize, Debug, Clone)]
pub struct StatusCount {
    #[serde(rename = "_id")]
    pub status: String,
    pub count: i64,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: i64,
    pub total_companies: i64,
    pub total_applications: i64,
    pub total_selected: i64,
}

/// Page rows and the pre-pagination total, fetched concurrently. The two
/// reads may observe different snapshots; that skew is accepted rather than
/// serializing read-only queries.
pub async fn fetch_page(
    pool: &PgPool,
    spec: &FilterSpec,
    page: Pagination,
) -> Result<(Vec<ApplicationReport>, i64)> {
    let mut rows_qb = report_query(spec, ReportShape::Rows(page));
    let mut count_qb = report_query(spec, ReportShape::Count);
    let (rows, total) = tokio::try_join!(
        rows_qb.build_query_as::<ReportRow>().fetch_all(pool),
        count_qb.build_query_scalar::<i64>().fetch_one(pool),
    )?;
    Ok((rows.into_iter().map(Into::into).collect(), total))
}

pub async fn company_selections(
    pool: &PgPool,
    spec: &FilterSpec,
) -> Result<Vec<CompanySelection>> {
    let selected = spec.with_status("Selected");
    let mut qb = report_query(&selected, ReportShape::CompanySelections);
    let rows = qb
        .build_query_as::<CompanySelection>()
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn status_distribution(pool: &PgPool, spec: &FilterSpec) -> Result<Vec<StatusCount>> {
    let mut qb = report_query(spec, ReportShape::StatusDistribution);
    let rows = qb.build_query_as::<StatusCount>().fetch_all(pool).await?;
    Ok(rows)
}

/// Four independent counts under one filter set, fetched concurrently:
/// students see only student-level conditions, companies only company-level
/// ones, application totals the full join.
pub async fn dashboard_stats(pool: &PgPool, spec: &FilterSpec) -> Result<DashboardStats> {
    let mut students_qb = QueryBuilder::new("SELECT COUNT(*) FROM students s");
    let mut conj = Conjunction::new();
    push_student_conditions(&mut students_qb, &mut conj, spec);

    let mut companies_qb = QueryBuilder::new("SELECT COUNT(*) FROM companies c");
    let mut conj = Conjunction::new();
    push_company_conditions(&mut companies_qb, &mut conj, spec);

    let selected = spec.with_status("Selected");
    let mut applications_qb = report_query(spec, ReportShape::Count);
    let mut selected_qb = report_query(&selected, ReportShape::Count);

    let (total_students, total_companies, total_applications, total_selected) = tokio::try_join!(
        students_qb.build_query_scalar::<i64>().fetch_one(pool),
        companies_qb.build_query_scalar::<i64>().fetch_one(pool),
        applications_qb.build_query_scalar::<i64>().fetch_one(pool),
        selected_qb.build_query_scalar::<i64>().fetch_one(pool),
    )?;

    Ok(DashboardStats {
        total_students,
        total_companies,
        total_applications,
        total_selected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkg::internal::filters::{ReportParams, month_range};

    fn spec_from(params: ReportParams) -> FilterSpec {
        FilterSpec::from_params(&params)
    }

    #[test]
    fn unfiltered_rows_query_joins_sorts_and_paginates() {
        let qb = report_query(
            &FilterSpec::default(),
            ReportShape::Rows(Pagination { page: 2, limit: 10 }),
        );
        let sql = qb.sql();
        assert!(sql.contains("JOIN students s ON s.id = a.student_id"));
        assert!(sql.contains("JOIN companies c ON c.id = a.company_id"));
        assert!(!sql.contains("WHERE"));
        assert!(sql.ends_with("ORDER BY a.applied_at DESC LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn count_query_shares_source_without_pagination() {
        let spec = spec_from(ReportParams {
            status: Some("Applied".into()),
            ..Default::default()
        });
        let qb = report_query(&spec, ReportShape::Count);
        assert_eq!(
            qb.sql(),
            format!("SELECT COUNT(*){} WHERE a.status::text = $1", REPORT_SOURCE)
        );
    }

    #[test]
    fn conditions_apply_in_group_order() {
        let spec = spec_from(ReportParams {
            status: Some("Selected".into()),
            company_id: Some("7".into()),
            sem: Some("6".into()),
            course: Some("BE".into()),
            job_type: Some("Internship".into()),
            recruitment_month: Some("2024-03".into()),
            ..Default::default()
        });
        let qb = report_query(&spec, ReportShape::Count);
        let sql = qb.sql();
        let expected = format!(
            "SELECT COUNT(*){} WHERE a.status::text = $1 AND a.company_id = $2 \
             AND s.sem = $3 AND s.course = $4 AND c.job_type::text = $5 \
             AND c.recruitment_date >= $6 AND c.recruitment_date < $7",
            REPORT_SOURCE
        );
        assert_eq!(sql, expected);
    }

    #[test]
    fn opaque_company_id_still_executes() {
        let spec = spec_from(ReportParams {
            company: Some("65f1c0ffee".into()),
            ..Default::default()
        });
        let qb = report_query(&spec, ReportShape::Count);
        assert!(qb.sql().contains("a.company_id::text = $1"));
    }

    #[test]
    fn company_selections_group_and_sort_descending() {
        let qb = report_query(
            &FilterSpec::default().with_status("Selected"),
            ReportShape::CompanySelections,
        );
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT c.company_name, COUNT(*) AS selected_count"));
        assert!(sql.contains("a.status::text = $1"));
        assert!(sql.ends_with("GROUP BY c.id, c.company_name ORDER BY selected_count DESC"));
    }

    #[test]
    fn status_distribution_groups_by_status() {
        let qb = report_query(&FilterSpec::default(), ReportShape::StatusDistribution);
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT a.status::text AS status, COUNT(*) AS count"));
        assert!(sql.ends_with("GROUP BY a.status"));
    }

    #[test]
    fn month_filter_binds_half_open_bounds() {
        let spec = spec_from(ReportParams {
            recruitment_month: Some("2024-02".into()),
            ..Default::default()
        });
        let qb = report_query(&spec, ReportShape::Count);
        assert!(qb
            .sql()
            .contains("c.recruitment_date >= $1 AND c.recruitment_date < $2"));
        let (start, end) = month_range("2024-02").unwrap();
        assert!(start < end);
    }

    #[test]
    fn status_count_serializes_with_mongo_style_id() {
        let row = StatusCount { status: "Selected".into(), count: 4 };
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"_id":"Selected","count":4}"#
        );
    }
}
