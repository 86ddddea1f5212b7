//! Client for the Properfy real-estate API.
//!
//! Every dashboard endpoint pulls one or more collections from the same
//! bearer-authenticated API and aggregates them locally. Handlers only see
//! the [`PropertyApi`] trait so tests can swap in canned responses.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ProperfyConfig;

/// Relative paths of the collections the portal reads. Paged collections
/// are read from the first page only, with a fixed size of 3000.
pub mod paths {
    pub const PROPERTIES: &str = "property/property?page=1&size=3000";
    pub const RENTAL_CONTRACTS: &str = "rental/contract";
    pub const LEADS: &str = "crm/lead?filter=&size=3000";
    pub const CARDS: &str = "crm/card";
    pub const LEAD_INPUTS: &str = "crm/lead-input";
    pub const MAINTENANCE: &str = "property/maintenance/";
}

#[derive(Debug)]
pub enum PropertyApiError {
    Timeout(String),
    Request(String),
    Status { path: String, status: u16 },
    Decode(String),
}

impl std::fmt::Display for PropertyApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyApiError::Timeout(msg) => write!(f, "timeout: {msg}"),
            PropertyApiError::Request(msg) => write!(f, "request failed: {msg}"),
            PropertyApiError::Status { path, status } => {
                write!(f, "{path} answered with status {status}")
            }
            PropertyApiError::Decode(msg) => write!(f, "invalid JSON body: {msg}"),
        }
    }
}

impl std::error::Error for PropertyApiError {}

#[async_trait]
pub trait PropertyApi: Send + Sync {
    /// GET `path` relative to the API base URL and return the decoded body.
    async fn get_json(&self, path: &str) -> Result<Value, PropertyApiError>;
}

pub struct ProperfyClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl ProperfyClient {
    pub fn new(config: &ProperfyConfig) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl PropertyApi for ProperfyClient {
    async fn get_json(&self, path: &str) -> Result<Value, PropertyApiError> {
        let url = self.url(path);
        tracing::debug!(%url, "Fetching from property API");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PropertyApiError::Timeout(format!("{path}: {e}"))
                } else {
                    PropertyApiError::Request(format!("{path}: {e}"))
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PropertyApiError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        resp.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                PropertyApiError::Timeout(format!("{path}: {e}"))
            } else {
                PropertyApiError::Decode(format!("{path}: {e}"))
            }
        })
    }
}

/// Extract the record list from a response body.
///
/// Collections come back either as a bare array or wrapped as
/// `{"data": [...]}`; anything else is treated as empty.
pub fn records(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Fetch a collection and unwrap it with [`records`].
pub async fn fetch_records(
    api: &dyn PropertyApi,
    path: &str,
) -> Result<Vec<Value>, PropertyApiError> {
    let body = api.get_json(path).await?;
    let items = records(body);
    tracing::info!(path, count = items.len(), "Fetched records from property API");
    Ok(items)
}
