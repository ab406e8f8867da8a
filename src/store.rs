//! Typed request builders for the hosted table store.
//!
//! The store is a table-oriented REST API: equality filters, ordering, nested
//! embeds in the `select` list, and single-row expectation via a dedicated
//! `Accept` header. The client never defines schema; it only builds requests
//! against the contract and decodes the rows it gets back.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::error::Error;
use crate::session::Session;

/// Accept header value asking the store for exactly one row.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
/// Store error code for a single-row request that matched no rows.
const NO_ROWS_CODE: &str = "PGRST116";

#[derive(Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base: String,
    anon_key: String,
}

impl StoreClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: config.base_url.clone(),
            anon_key: config.anon_key.clone(),
        }
    }

    /// Starts a read against one table.
    pub fn from(&self, table: &str) -> SelectBuilder {
        SelectBuilder {
            store: self.clone(),
            table: table.to_string(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
            token: None,
        }
    }

    /// Starts an insert into one table.
    pub fn insert_into(&self, table: &str) -> InsertBuilder {
        InsertBuilder {
            store: self.clone(),
            table: table.to_string(),
            token: None,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base, table)
    }

    /// Bearer value: the user's token when a session is attached, the project
    /// key otherwise.
    fn bearer(&self, token: Option<&str>) -> String {
        format!("Bearer {}", token.unwrap_or(&self.anon_key))
    }
}

pub struct SelectBuilder {
    store: StoreClient,
    table: String,
    columns: String,
    filters: Vec<(String, String)>,
    order: Option<String>,
    token: Option<String>,
}

impl SelectBuilder {
    /// Column list, including nested embeds such as `internships(title)`.
    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    /// Equality filter. The column may live on an embedded table
    /// (`internships.startup_id`), which makes this a filtered join when the
    /// embed is declared inner in the column list.
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(format!("{column}.desc"));
        self
    }

    pub fn with_session(mut self, session: &Session) -> Self {
        self.token = Some(session.access_token.clone());
        self
    }

    fn request(&self) -> reqwest::RequestBuilder {
        let mut params: Vec<(String, String)> =
            vec![("select".to_string(), self.columns.clone())];
        params.extend(self.filters.iter().cloned());
        if let Some(order) = &self.order {
            params.push(("order".to_string(), order.clone()));
        }
        self.store
            .http
            .get(self.store.table_url(&self.table))
            .header("apikey", &self.store.anon_key)
            .header("Authorization", self.store.bearer(self.token.as_deref()))
            .query(&params)
    }

    /// Fetches every matching row: the full set or a [`Error::Query`], never a
    /// partial result.
    pub async fn fetch_all<T: DeserializeOwned>(self) -> Result<Vec<T>, Error> {
        let response = self
            .request()
            .send()
            .await
            .map_err(|err| Error::Query(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| Error::Query(err.to_string()))?;
        if !status.is_success() {
            return Err(Error::Query(store_message(&body)));
        }
        serde_json::from_str(&body)
            .map_err(|err| Error::Query(format!("unexpected response shape: {err}")))
    }

    /// Single-row expectation. `Ok(None)` when no row matches, so callers can
    /// tell "not there" apart from every other failure.
    pub async fn fetch_optional<T: DeserializeOwned>(self) -> Result<Option<T>, Error> {
        let response = self
            .request()
            .header("Accept", SINGLE_OBJECT)
            .send()
            .await
            .map_err(|err| Error::Query(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| Error::Query(err.to_string()))?;
        if status.is_success() {
            let row = serde_json::from_str(&body)
                .map_err(|err| Error::Query(format!("unexpected response shape: {err}")))?;
            return Ok(Some(row));
        }
        if body.contains(NO_ROWS_CODE) {
            return Ok(None);
        }
        Err(Error::Query(store_message(&body)))
    }
}

pub struct InsertBuilder {
    store: StoreClient,
    table: String,
    token: Option<String>,
}

impl InsertBuilder {
    pub fn with_session(mut self, session: &Session) -> Self {
        self.token = Some(session.access_token.clone());
        self
    }

    /// Inserts one row as a single atomic operation. The backend assigns the
    /// id; nothing is returned on success.
    pub async fn row<T: Serialize>(self, row: &T) -> Result<(), Error> {
        let response = self
            .store
            .http
            .post(self.store.table_url(&self.table))
            .header("apikey", &self.store.anon_key)
            .header("Authorization", self.store.bearer(self.token.as_deref()))
            .header("Prefer", "return=minimal")
            // The store takes bulk inserts; a single row ships as a
            // one-element array.
            .json(&[row])
            .send()
            .await
            .map_err(|err| Error::Insert(err.to_string()))?;
        if response.status().is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Insert(store_message(&body)))
    }
}

/// Pulls the human-readable message out of a store error body.
fn store_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|message| message.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}
