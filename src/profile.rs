//! Session-to-profile resolution.
//!
//! Every flow that acts on behalf of a caller starts here: take the session,
//! ask the auth service for the verified email, and match it to exactly one
//! row in the role's profile table. The resolved profile is a named value the
//! writers and readers take as input, which keeps the resolve-then-act
//! dependency structural instead of merely sequential.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::AuthClient;
use crate::error::Error;
use crate::models::{Role, StartupProfile, StudentProfile};
use crate::session::Session;
use crate::store::StoreClient;

/// Resolves the calling student's `users` row by verified email.
pub async fn resolve_student(
    auth: &AuthClient,
    store: &StoreClient,
    session: &Session,
) -> Result<StudentProfile, Error> {
    resolve(auth, store, session, Role::Student, "users").await
}

/// Resolves the calling startup's `startups` row by verified email.
pub async fn resolve_startup(
    auth: &AuthClient,
    store: &StoreClient,
    session: &Session,
) -> Result<StartupProfile, Error> {
    resolve(auth, store, session, Role::Startup, "startups").await
}

/// Shared resolution pipeline. Read-only: auth lookup, then one filtered
/// single-row query. Zero matches become [`Error::ProfileNotFound`] so login
/// flows can redirect to signup instead of showing a generic failure.
async fn resolve<T: DeserializeOwned>(
    auth: &AuthClient,
    store: &StoreClient,
    session: &Session,
    role: Role,
    table: &str,
) -> Result<T, Error> {
    let user = auth.get_user(session).await?;
    let email = user
        .email
        .ok_or_else(|| Error::Auth("authenticated user has no email".to_string()))?;
    debug!(%email, %role, "resolving profile");

    let profile = store
        .from(table)
        .with_session(session)
        .eq("email", &email)
        .fetch_optional::<T>()
        .await?;
    profile.ok_or(Error::ProfileNotFound { role, email })
}
