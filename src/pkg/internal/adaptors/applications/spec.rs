use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{
    prelude::{FromRow, Type},
    types::Json,
};

use crate::pkg::internal::adaptors::{
    companies::spec::CompanyEntry, students::spec::StudentEntry,
};

#[derive(Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "application_status")]
pub enum ApplicationStatus {
    Applied,
    Shortlisted,
    Selected,
    Rejected,
    #[sqlx(rename = "In Process")]
    #[serde(rename = "In Process")]
    InProcess,
}

/// One stage of a company's hiring process recorded against an application.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub round_name: Option<String>,
    pub result: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationEntry {
    pub id: i32,
    pub student_id: i32,
    pub company_id: i32,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub rounds: Json<Vec<Round>>,
    pub remarks: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Direct by-id view. References are populated when they still resolve and
/// null when the student or company has since been deleted.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetail {
    #[serde(flatten)]
    pub application: ApplicationEntry,
    pub student: Option<StudentEntry>,
    pub company: Option<CompanyEntry>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationInput {
    pub student_id: i32,
    pub company_id: i32,
    pub status: Option<ApplicationStatus>,
    pub applied_at: Option<DateTime<Utc>>,
    pub rounds: Option<Vec<Round>>,
    pub remarks: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PatchApplicationInput {
    pub student_id: Option<i32>,
    pub company_id: Option<i32>,
    pub status: Option<ApplicationStatus>,
    pub applied_at: Option<DateTime<Utc>>,
    pub rounds: Option<Vec<Round>>,
    pub remarks: Option<String>,
}

impl PatchApplicationInput {
    pub fn is_empty(&self) -> bool {
        self.student_id.is_none()
            && self.company_id.is_none()
            && self.status.is_none()
            && self.applied_at.is_none()
            && self.rounds.is_none()
            && self.remarks.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_wire_labels() {
        assert_eq!(
            serde_json::to_string(&ApplicationStatus::InProcess).unwrap(),
            r#""In Process""#
        );
        let parsed: ApplicationStatus = serde_json::from_str(r#""Shortlisted""#).unwrap();
        assert_eq!(parsed, ApplicationStatus::Shortlisted);
        assert!(serde_json::from_str::<ApplicationStatus>(r#""Waitlisted""#).is_err());
    }

    #[test]
    fn create_input_defaults_are_optional() {
        let input: CreateApplicationInput =
            serde_json::from_str(r#"{ "studentId": 1, "companyId": 2 }"#).unwrap();
        assert_eq!(input.student_id, 1);
        assert!(input.status.is_none());
        assert!(input.rounds.is_none());
    }

    #[test]
    fn rounds_deserialize_with_partial_fields() {
        let input: CreateApplicationInput = serde_json::from_str(
            r#"{
                "studentId": 1,
                "companyId": 2,
                "rounds": [{ "roundName": "Aptitude", "result": "Pass" }]
            }"#,
        )
        .unwrap();
        let rounds = input.rounds.unwrap();
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].round_name.as_deref(), Some("Aptitude"));
        assert!(rounds[0].date.is_none());
    }
}
