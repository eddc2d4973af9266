use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::pkg::internal::filters::IntParam;

/// University serial number, e.g. 4VZ22CS001. Validated after upper-casing.
pub static USN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9][A-Z]{2}\d{2}[A-Z]{2}\d{3}$").unwrap());

pub static MOBILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+\d{1,3}[- ]?)?\d{10}$").unwrap());

#[derive(FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StudentEntry {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub mobile_number: String,
    pub usn: String,
    pub course: String,
    pub sem: i32,
    pub branch: String,
    pub role: String,
}

#[derive(Deserialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentInput {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(regex(path = *MOBILE_RE, message = "Please fill a valid mobile number"))]
    pub mobile_number: String,
    #[validate(regex(path = *USN_RE, message = "Please enter a valid USN (e.g., 4VZ22CS001)"))]
    pub usn: String,
    #[validate(length(min = 1, max = 100, message = "Course must be 1-100 characters"))]
    pub course: String,
    #[validate(range(min = 1, max = 8, message = "Semester must be between 1 and 8"))]
    pub sem: i32,
    #[validate(length(min = 1, message = "Branch is required"))]
    pub branch: String,
    pub role: Option<String>,
}

impl CreateStudentInput {
    /// USN is stored upper-case and email lower-case, so normalize before
    /// validating the patterns.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.mobile_number = self.mobile_number.trim().to_string();
        self.usn = self.usn.trim().to_uppercase();
        self.course = self.course.trim().to_string();
        self.branch = self.branch.trim().to_string();
        self
    }
}

#[derive(Deserialize, Validate, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PatchStudentInput {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: Option<String>,
    #[validate(regex(path = *MOBILE_RE, message = "Please fill a valid mobile number"))]
    pub mobile_number: Option<String>,
    pub usn: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Course must be 1-100 characters"))]
    pub course: Option<String>,
    #[validate(range(min = 1, max = 8, message = "Semester must be between 1 and 8"))]
    pub sem: Option<i32>,
    pub branch: Option<String>,
    pub role: Option<String>,
}

impl PatchStudentInput {
    pub fn normalized(mut self) -> Self {
        self.email = self.email.map(|e| e.trim().to_lowercase());
        self.usn = self.usn.map(|u| u.trim().to_uppercase());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.mobile_number.is_none()
            && self.usn.is_none()
            && self.course.is_none()
            && self.sem.is_none()
            && self.branch.is_none()
            && self.role.is_none()
    }
}

/// Listing filters for `GET /api/students`.
#[derive(Debug, Default, Clone)]
pub struct StudentListFilter {
    pub sem: Option<IntParam>,
    pub branch: Option<String>,
    pub course: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(usn: &str, email: &str, mobile: &str, sem: i32) -> CreateStudentInput {
        CreateStudentInput {
            name: "Asha".into(),
            email: email.into(),
            mobile_number: mobile.into(),
            usn: usn.into(),
            course: "BE".into(),
            sem,
            branch: "CSE".into(),
            role: None,
        }
    }

    #[test]
    fn valid_student_passes() {
        let s = input("4vz22cs001", "asha@example.com", "9876543210", 5).normalized();
        assert_eq!(s.usn, "4VZ22CS001");
        assert!(s.validate().is_ok());
    }

    #[test]
    fn usn_pattern_is_enforced() {
        assert!(input("4VZ22CS01", "a@b.com", "9876543210", 5)
            .normalized()
            .validate()
            .is_err());
        assert!(input("XXVZ22CS001", "a@b.com", "9876543210", 5)
            .normalized()
            .validate()
            .is_err());
    }

    #[test]
    fn mobile_accepts_country_code() {
        assert!(input("4VZ22CS001", "a@b.com", "+91-9876543210", 5)
            .normalized()
            .validate()
            .is_ok());
        assert!(input("4VZ22CS001", "a@b.com", "12345", 5)
            .normalized()
            .validate()
            .is_err());
    }

    #[test]
    fn sem_outside_range_rejected() {
        assert!(input("4VZ22CS001", "a@b.com", "9876543210", 0)
            .validate()
            .is_err());
        assert!(input("4VZ22CS001", "a@b.com", "9876543210", 9)
            .validate()
            .is_err());
    }

    #[test]
    fn empty_patch_detected() {
        assert!(PatchStudentInput::default().is_empty());
        let patch = PatchStudentInput { sem: Some(6), ..Default::default() };
        assert!(!patch.is_empty());
    }
}
