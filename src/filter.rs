//! Client-side filtering of a fetched application list.
//!
//! Pure functions only: the fetched set is never mutated and never re-queried.
//! Both filters are re-applied to the original set on every change, so they
//! can be recombined in any order without compounding.

use std::str::FromStr;

use crate::models::{ApplicationReview, ApplicationStatus};

/// Status facet of the review screen. `All` is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(ApplicationStatus),
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "All" | "all" => Ok(Self::All),
            "Pending" | "pending" => Ok(Self::Only(ApplicationStatus::Pending)),
            "Approved" | "approved" => Ok(Self::Only(ApplicationStatus::Approved)),
            "Rejected" | "rejected" => Ok(Self::Only(ApplicationStatus::Rejected)),
            other => Err(format!(
                "unknown status filter `{other}` (expected All, Pending, Approved or Rejected)"
            )),
        }
    }
}

/// Applies the status facet and the skill search conjunctively, preserving the
/// input order. A search term blank after trimming is a no-op; otherwise a
/// record survives only when at least one of the applicant's skills contains
/// the term case-insensitively. Records with no applicant or no skills list
/// are excluded by an active search, never an error.
pub fn filter_applications<'a>(
    records: &'a [ApplicationReview],
    status: StatusFilter,
    search: &str,
) -> Vec<&'a ApplicationReview> {
    let term = search.trim().to_lowercase();
    records
        .iter()
        .filter(|record| match status {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => record.status == wanted,
        })
        .filter(|record| {
            if term.is_empty() {
                return true;
            }
            record
                .student
                .as_ref()
                .and_then(|student| student.skills.as_ref())
                .map(|skills| skills.iter().any(|skill| skill.to_lowercase().contains(&term)))
                .unwrap_or(false)
        })
        .collect()
}
