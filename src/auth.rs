//! Client for the hosted auth service.
//!
//! The service owns accounts, passwords and token issuance; this client only
//! wraps its four operations. Any failure it returns is surfaced verbatim as
//! [`Error::Auth`] so the user sees the service's own message.

use reqwest::Client;
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::Error;
use crate::session::{AuthUser, Session};

pub struct AuthClient {
    http: Client,
    base: String,
    anon_key: String,
}

impl AuthClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            base: config.base_url.clone(),
            anon_key: config.anon_key.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base, path)
    }

    /// Registers a new account. Returns the session when the service opens one
    /// immediately, `None` while email confirmation is still pending.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, Error> {
        let response = self
            .http
            .post(self.endpoint("signup"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|err| Error::Auth(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| Error::Auth(err.to_string()))?;
        if !status.is_success() {
            return Err(Error::Auth(auth_message(&body)));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|err| Error::Auth(format!("unexpected signup response: {err}")))?;
        if value.get("access_token").is_some() {
            let session = serde_json::from_value(value)
                .map_err(|err| Error::Auth(format!("unexpected signup response: {err}")))?;
            return Ok(Some(session));
        }
        Ok(None)
    }

    /// Exchanges credentials for a session.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, Error> {
        let response = self
            .http
            .post(self.endpoint("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|err| Error::Auth(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| Error::Auth(err.to_string()))?;
        if !status.is_success() {
            return Err(Error::Auth(auth_message(&body)));
        }
        serde_json::from_str(&body)
            .map_err(|err| Error::Auth(format!("unexpected token response: {err}")))
    }

    /// Fetches the authenticated user for a session. This is the source of the
    /// verified email used for profile resolution.
    pub async fn get_user(&self, session: &Session) -> Result<AuthUser, Error> {
        let response = self
            .http
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", session.access_token))
            .send()
            .await
            .map_err(|err| Error::Auth(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| Error::Auth(err.to_string()))?;
        if !status.is_success() {
            return Err(Error::Auth(auth_message(&body)));
        }
        serde_json::from_str(&body)
            .map_err(|err| Error::Auth(format!("unexpected user response: {err}")))
    }

    /// Revokes the session server-side.
    pub async fn sign_out(&self, session: &Session) -> Result<(), Error> {
        let response = self
            .http
            .post(self.endpoint("logout"))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", session.access_token))
            .send()
            .await
            .map_err(|err| Error::Auth(err.to_string()))?;
        if response.status().is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Auth(auth_message(&body)))
    }
}

/// Pulls the human-readable message out of an auth-service error body. The
/// service uses a few different field names depending on the endpoint.
fn auth_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["error_description", "msg", "message"]
                .iter()
                .find_map(|key| value.get(key).and_then(Value::as_str).map(String::from))
        })
        .unwrap_or_else(|| body.to_string())
}
