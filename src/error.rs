//! Error taxonomy for the SkillSpot client.
//!
//! Five failure classes cross the SDK boundary: local validation (no request
//! was sent), auth-service failures, a session whose email matches no profile
//! row, data-store read failures, and data-store write rejections. Errors are
//! surfaced to the user once and never retried.

use thiserror::Error;

use crate::models::Role;

#[derive(Debug, Error)]
pub enum Error {
    /// Rejected before any network call; the input never left the client.
    #[error("{0}")]
    Validation(String),

    /// The auth service refused the request, or no usable session exists.
    #[error("{0}")]
    Auth(String),

    /// The session's verified email matched zero rows in the role's profile
    /// table. Distinguished from [`Error::Query`] so login flows can point the
    /// caller at signup instead of showing a generic failure.
    #[error("no {role} profile found for {email}")]
    ProfileNotFound { role: Role, email: String },

    /// Any other data-store read failure.
    #[error("{0}")]
    Query(String),

    /// The data store rejected an insert.
    #[error("{0}")]
    Insert(String),

    /// Environment misconfiguration, caught before any client is built.
    #[error("{0}")]
    Config(String),
}
