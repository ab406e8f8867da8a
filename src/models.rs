//! Domain records as consumed by the client.
//!
//! The backend owns every table; these types mirror the rows the client reads
//! and the validated inputs it writes. Joined sub-objects are explicit
//! `Option`s so every consumer has to handle the absent case, instead of
//! trusting the shape of a nested query result.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which profile table an authenticated caller belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Startup,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Startup => write!(f, "startup"),
        }
    }
}

/// Application lifecycle state. The client writes `Pending` exactly once at
/// submission; the other two states are set externally and only read here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationStatus::Pending => write!(f, "Pending"),
            ApplicationStatus::Approved => write!(f, "Approved"),
            ApplicationStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

/// One row of the `users` table, keyed by unique email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// One row of the `startups` table, keyed by unique email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupProfile {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub cin: String,
}

/// A student-owned project. `skills` is stored as the raw comma-separated
/// text the poster typed, unlike profile skills which are split into a list.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub skills: String,
}

/// A startup-owned internship posting.
#[derive(Debug, Clone, Deserialize)]
pub struct Internship {
    pub id: i64,
    pub startup_id: i64,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub stipend: Option<f64>,
}

/// Embedded internship title on a student's own application row.
#[derive(Debug, Clone, Deserialize)]
pub struct InternshipTitle {
    pub title: String,
}

/// "My applications" row: an application joined with the title of the
/// internship it targets. The join is absent when the internship is gone.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationWithInternship {
    pub id: i64,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "internships")]
    pub internship: Option<InternshipTitle>,
}

/// Embedded applicant fields on a startup-side review row. The profile's
/// skills column itself may be null.
#[derive(Debug, Clone, Deserialize)]
pub struct Applicant {
    pub full_name: String,
    pub email: String,
    pub skills: Option<Vec<String>>,
}

/// Embedded internship fields on a startup-side review row.
#[derive(Debug, Clone, Deserialize)]
pub struct InternshipRef {
    pub title: String,
    pub startup_id: i64,
}

/// Startup-side review row: an application joined with the applicant and the
/// internship it targets.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationReview {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    #[serde(rename = "students")]
    pub student: Option<Applicant>,
    #[serde(rename = "internships")]
    pub internship: Option<InternshipRef>,
}

/// Validated input for posting a project. Construction fails before any
/// network call when a field is blank.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub skills: String,
}

impl NewProject {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        skills: impl Into<String>,
    ) -> Result<Self, Error> {
        let title = title.into();
        let description = description.into();
        let skills = skills.into();
        if title.trim().is_empty() || description.trim().is_empty() || skills.trim().is_empty() {
            return Err(Error::Validation("Please fill in all fields.".to_string()));
        }
        Ok(Self {
            title,
            description,
            skills,
        })
    }
}

/// Validated input for posting an internship. The stipend arrives as text from
/// the form and must coerce to a number here, not at the backend.
#[derive(Debug, Clone)]
pub struct NewInternship {
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub stipend: f64,
}

impl NewInternship {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        requirements: impl Into<String>,
        stipend_text: &str,
    ) -> Result<Self, Error> {
        let title = title.into();
        let description = description.into();
        let requirements = requirements.into();
        if title.trim().is_empty()
            || description.trim().is_empty()
            || requirements.trim().is_empty()
            || stipend_text.trim().is_empty()
        {
            return Err(Error::Validation("Please fill in all fields.".to_string()));
        }
        let stipend = stipend_text.trim().parse::<f64>().map_err(|_| {
            Error::Validation(format!("Stipend must be a number, got `{stipend_text}`"))
        })?;
        Ok(Self {
            title,
            description,
            requirements,
            stipend,
        })
    }
}

/// Splits a comma-separated skills field into trimmed entries. Empty entries
/// survive: "React, Node, " becomes `["React", "Node", ""]`, matching what the
/// signup form has always stored.
pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',').map(|entry| entry.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_skills_trims_and_keeps_empty_entries() {
        assert_eq!(split_skills("React, Node, "), vec!["React", "Node", ""]);
        assert_eq!(split_skills("  ML  "), vec!["ML"]);
        assert_eq!(split_skills(""), vec![""]);
    }

    #[test]
    fn internship_input_coerces_stipend_to_number() {
        let input = NewInternship::new(
            "React Native Developer Intern",
            "Build the mobile client",
            "React, TypeScript",
            "5000",
        )
        .expect("valid input");
        assert_eq!(input.stipend, 5000.0);
    }

    #[test]
    fn internship_input_rejects_non_numeric_stipend() {
        let err = NewInternship::new("Intern", "Work", "React", "lots")
            .expect_err("stipend should fail to parse");
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn blank_fields_are_rejected_before_any_request() {
        assert!(matches!(
            NewProject::new("", "desc", "React"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            NewInternship::new("Intern", "Work", "React", "   "),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn status_uses_exact_wire_strings() {
        assert_eq!(
            serde_json::to_value(ApplicationStatus::Pending).expect("serialize"),
            json!("Pending")
        );
        let status: ApplicationStatus =
            serde_json::from_value(json!("Approved")).expect("deserialize");
        assert_eq!(status, ApplicationStatus::Approved);
    }

    #[test]
    fn review_row_tolerates_missing_joins() {
        let row: ApplicationReview = serde_json::from_value(json!({
            "id": 11,
            "created_at": "2026-08-01T10:00:00+00:00",
            "cover_letter": null,
            "status": "Pending",
            "students": null,
            "internships": null
        }))
        .expect("row with absent joins should deserialize");
        assert!(row.student.is_none());
        assert!(row.internship.is_none());
        assert!(row.cover_letter.is_none());
    }
}
