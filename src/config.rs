//! Environment-driven configuration for the hosted backend.
//!
//! The client owns no schema and no server; it only needs to know where the
//! backend lives and which project key to present. Values come from the
//! environment (a `.env` file is loaded by the binaries before this runs).

use std::env;

use tracing::info;

use crate::error::Error;

/// Local development default, matching the backend's standard local port.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:54321";

#[derive(Debug, Clone)]
pub struct Config {
    /// Root URL of the hosted backend; auth lives under `/auth/v1`, the table
    /// store under `/rest/v1`.
    pub base_url: String,
    /// Project key sent as `apikey` on every request, and as the bearer token
    /// when no user session is attached.
    pub anon_key: String,
}

impl Config {
    /// Reads `SKILLSPOT_BACKEND_URL` (optional, defaulted) and
    /// `SKILLSPOT_ANON_KEY` (required).
    pub fn load() -> Result<Self, Error> {
        let base_url = env::var("SKILLSPOT_BACKEND_URL").unwrap_or_else(|_| {
            info!("SKILLSPOT_BACKEND_URL not set, using default: {DEFAULT_BACKEND_URL}");
            DEFAULT_BACKEND_URL.to_string()
        });
        let anon_key = env::var("SKILLSPOT_ANON_KEY")
            .map_err(|_| Error::Config("SKILLSPOT_ANON_KEY is not set".to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        })
    }
}
