use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use validator::Validate;

#[derive(Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "job_type")]
pub enum JobType {
    #[sqlx(rename = "Full-Time")]
    #[serde(rename = "Full-Time")]
    FullTime,
    #[sqlx(rename = "Internship")]
    Internship,
    #[sqlx(rename = "Full-Time + Internship")]
    #[serde(rename = "Full-Time + Internship")]
    FullTimeInternship,
}

#[derive(FromRow, Serialize, Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityCriteria {
    pub cgpa: f64,
    pub backlog_allowed: bool,
}

impl Default for EligibilityCriteria {
    fn default() -> Self {
        EligibilityCriteria { cgpa: 0.0, backlog_allowed: true }
    }
}

#[derive(FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CompanyEntry {
    pub id: i32,
    pub company_name: String,
    pub job_role: String,
    pub job_type: JobType,
    pub ctc: String,
    pub location: String,
    #[sqlx(flatten)]
    pub eligibility_criteria: EligibilityCriteria,
    pub recruitment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyInput {
    #[validate(length(min = 1, message = "Company name is required"))]
    pub company_name: String,
    #[validate(length(min = 1, message = "Job role is required"))]
    pub job_role: String,
    pub job_type: JobType,
    #[validate(length(min = 1, message = "CTC is required"))]
    pub ctc: String,
    pub location: Option<String>,
    pub eligibility_criteria: Option<EligibilityCriteria>,
    pub recruitment_date: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PatchCompanyInput {
    pub company_name: Option<String>,
    pub job_role: Option<String>,
    pub job_type: Option<JobType>,
    pub ctc: Option<String>,
    pub location: Option<String>,
    pub eligibility_criteria: Option<EligibilityCriteria>,
    pub recruitment_date: Option<DateTime<Utc>>,
}

impl PatchCompanyInput {
    pub fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.job_role.is_none()
            && self.job_type.is_none()
            && self.ctc.is_none()
            && self.location.is_none()
            && self.eligibility_criteria.is_none()
            && self.recruitment_date.is_none()
    }
}

/// Listing filters for `GET /api/companies`. The name filter is a
/// case-insensitive substring match.
#[derive(Debug, Default, Clone)]
pub struct CompanyListFilter {
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub company_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_type_serializes_to_wire_labels() {
        assert_eq!(
            serde_json::to_string(&JobType::FullTimeInternship).unwrap(),
            r#""Full-Time + Internship""#
        );
        let parsed: JobType = serde_json::from_str(r#""Internship""#).unwrap();
        assert_eq!(parsed, JobType::Internship);
        assert!(serde_json::from_str::<JobType>(r#""Part-Time""#).is_err());
    }

    #[test]
    fn eligibility_defaults_allow_backlogs() {
        let ec = EligibilityCriteria::default();
        assert_eq!(ec.cgpa, 0.0);
        assert!(ec.backlog_allowed);
    }

    #[test]
    fn create_input_accepts_nested_eligibility() {
        let input: CreateCompanyInput = serde_json::from_str(
            r#"{
                "companyName": "Initech",
                "jobRole": "SDE",
                "jobType": "Full-Time",
                "ctc": "7 LPA",
                "eligibilityCriteria": { "cgpa": 7.5, "backlogAllowed": false },
                "recruitmentDate": "2024-03-15T00:00:00Z"
            }"#,
        )
        .unwrap();
        assert!(input.validate().is_ok());
        assert_eq!(input.eligibility_criteria.unwrap().cgpa, 7.5);
        assert!(input.location.is_none());
    }
}
