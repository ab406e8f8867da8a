//! SkillSpot client SDK.
//!
//! Connects students and startups through a hosted backend that owns all
//! persistence, authentication and querying. This lib exposes the typed
//! client: configuration, the session handle, the auth-service client, the
//! table-store request builders, session-to-profile resolution, the
//! ownership-scoped writers/readers, and the pure review-list filter.

pub mod auth;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod profile;
pub mod records;
pub mod session;
pub mod store;
