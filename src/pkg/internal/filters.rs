use chrono::{DateTime, Months, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

/// Raw reporting query parameters as they arrive on the wire. Everything is a
/// string; the normalizer below decides what each value means.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReportParams {
    pub status: Option<String>,
    pub company: Option<String>,
    pub company_id: Option<String>,
    pub student_id: Option<String>,
    pub sem: Option<String>,
    pub course: Option<String>,
    pub job_type: Option<String>,
    pub recruitment_month: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// A reference filter: a syntactically valid id, or an opaque literal that is
/// still handed to the store and simply matches nothing. Bad ids must not
/// fail before the query executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefParam {
    Key(i32),
    Opaque(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntParam {
    Value(i32),
    Opaque(String),
}

/// `recruitmentMonth` expanded to a half-open UTC range covering the month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthParam {
    Range(DateTime<Utc>, DateTime<Utc>),
    Opaque(String),
}

/// Typed match conditions, split into the three groups the report queries
/// apply: application-level, student-level, company-level. Absent parameters
/// contribute no condition.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FilterSpec {
    // application-level
    pub status: Option<String>,
    pub student: Option<RefParam>,
    pub company: Option<RefParam>,
    // student-level
    pub sem: Option<IntParam>,
    pub course: Option<String>,
    // company-level
    pub job_type: Option<String>,
    pub recruitment_month: Option<MonthParam>,
}

impl FilterSpec {
    pub fn from_params(params: &ReportParams) -> Self {
        let company_raw = params.company.as_deref().or(params.company_id.as_deref());
        FilterSpec {
            status: params.status.clone(),
            student: params.student_id.as_deref().map(ref_param),
            company: company_raw.map(ref_param),
            sem: params.sem.as_deref().map(int_param),
            course: params.course.clone(),
            job_type: params.job_type.clone(),
            recruitment_month: params.recruitment_month.as_deref().map(month_param),
        }
    }

    /// Same filter set with the status pinned, used for selected-only views.
    pub fn with_status(&self, status: &str) -> Self {
        let mut spec = self.clone();
        spec.status = Some(status.to_string());
        spec
    }
}

pub fn ref_param(raw: &str) -> RefParam {
    match raw.parse::<i32>() {
        Ok(id) => RefParam::Key(id),
        Err(_) => RefParam::Opaque(raw.to_string()),
    }
}

pub fn int_param(raw: &str) -> IntParam {
    match raw.parse::<i32>() {
        Ok(v) => IntParam::Value(v),
        Err(_) => IntParam::Opaque(raw.to_string()),
    }
}

fn month_param(raw: &str) -> MonthParam {
    match month_range(raw) {
        Some((start, end)) => MonthParam::Range(start, end),
        None => MonthParam::Opaque(raw.to_string()),
    }
}

/// Expands a "YYYY-MM" string to `[first-of-month, first-of-next-month)`.
pub fn month_range(raw: &str) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d").ok()?;
    let next = first.checked_add_months(Months::new(1))?;
    Some((
        first.and_time(NaiveTime::MIN).and_utc(),
        next.and_time(NaiveTime::MIN).and_utc(),
    ))
}

pub const DEFAULT_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination { page: 1, limit: DEFAULT_PAGE_LIMIT }
    }
}

impl Pagination {
    /// Non-numeric or missing values fall back to the defaults, never error.
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        Pagination {
            page: parse_positive(page, 1),
            limit: parse_positive(limit, DEFAULT_PAGE_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// Total page count, the ceiling of total / limit.
    pub fn pages(&self, total: i64) -> i64 {
        (total + self.limit - 1) / self.limit
    }
}

fn parse_positive(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|v| v.parse::<i64>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn month_range_covers_half_open_interval() {
        let (start, end) = month_range("2024-03").unwrap();
        assert_eq!(start, utc(2024, 3, 1));
        assert_eq!(end, utc(2024, 4, 1));
        // leap-year February boundary
        assert!(utc(2024, 2, 29) < start);
        assert!(utc(2024, 3, 31) < end);
        assert!(utc(2024, 4, 1) >= end);
    }

    #[test]
    fn month_range_rolls_over_december() {
        let (start, end) = month_range("2023-12").unwrap();
        assert_eq!(start, utc(2023, 12, 1));
        assert_eq!(end, utc(2024, 1, 1));
    }

    #[test]
    fn malformed_month_becomes_opaque() {
        assert!(month_range("2024-13").is_none());
        assert!(month_range("march").is_none());
        let spec = FilterSpec::from_params(&ReportParams {
            recruitment_month: Some("2024-13".into()),
            ..Default::default()
        });
        assert_eq!(
            spec.recruitment_month,
            Some(MonthParam::Opaque("2024-13".into()))
        );
    }

    #[test]
    fn absent_params_contribute_no_conditions() {
        let spec = FilterSpec::from_params(&ReportParams::default());
        assert_eq!(spec, FilterSpec::default());
    }

    #[test]
    fn company_accepted_under_either_name() {
        let spec = FilterSpec::from_params(&ReportParams {
            company_id: Some("42".into()),
            ..Default::default()
        });
        assert_eq!(spec.company, Some(RefParam::Key(42)));

        let spec = FilterSpec::from_params(&ReportParams {
            company: Some("65f1c0ffee".into()),
            ..Default::default()
        });
        assert_eq!(spec.company, Some(RefParam::Opaque("65f1c0ffee".into())));
    }

    #[test]
    fn unparseable_sem_is_carried_not_dropped() {
        let spec = FilterSpec::from_params(&ReportParams {
            sem: Some("seven".into()),
            ..Default::default()
        });
        assert_eq!(spec.sem, Some(IntParam::Opaque("seven".into())));
    }

    #[test]
    fn with_status_pins_only_status() {
        let spec = FilterSpec::from_params(&ReportParams {
            course: Some("CSE".into()),
            status: Some("Applied".into()),
            ..Default::default()
        });
        let pinned = spec.with_status("Selected");
        assert_eq!(pinned.status.as_deref(), Some("Selected"));
        assert_eq!(pinned.course.as_deref(), Some("CSE"));
    }

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(Pagination::from_params(None, None), Pagination { page: 1, limit: 100 });
        assert_eq!(
            Pagination::from_params(Some("abc"), Some("ten")),
            Pagination { page: 1, limit: 100 }
        );
        assert_eq!(
            Pagination::from_params(Some("0"), Some("-5")),
            Pagination { page: 1, limit: 100 }
        );
        let p = Pagination::from_params(Some("2"), Some("10"));
        assert_eq!(p.offset(), 10);
        assert_eq!(p.pages(25), 3);
        assert_eq!(p.pages(20), 2);
        assert_eq!(p.pages(0), 0);
    }
}
