//! Record source abstraction
//!
//! - `RecordSource` trait: one GET returning a JSON document
//! - `ReportClient` (in `client`): the HTTP implementation
//! - `StaticSource`: in-memory implementation for tests and offline use
//!
//! Decoding into typed records always goes through [`fetch_records`] so the
//! envelope handling lives in exactly one place.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::envelope::Envelope;
use crate::error::{Error, Result};

/// Something that can answer a GET with a JSON document
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch `path` (relative to the backend root) with query parameters
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<serde_json::Value>;
}

/// Fetch a collection and decode it into typed records
pub async fn fetch_records<T, S>(
    source: &S,
    path: &str,
    query: &[(String, String)],
) -> Result<Envelope<T>>
where
    T: DeserializeOwned,
    S: RecordSource + ?Sized,
{
    let value = source.get_json(path, query).await?;
    let envelope = Envelope::from_value(value)?;
    info!("Fetched {} records from {}", envelope.len(), path);
    Ok(envelope)
}

/// Canned JSON documents keyed by path
///
/// Unknown paths answer 404. Every call is recorded so tests can assert on
/// the query that was sent.
#[derive(Debug, Default)]
pub struct StaticSource {
    responses: HashMap<String, serde_json::Value>,
    failing: bool,
    calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose every call fails as the network would
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with(mut self, path: &str, body: serde_json::Value) -> Self {
        self.responses
            .insert(path.trim_matches('/').to_string(), body);
        self
    }

    /// Paths and queries requested so far
    pub fn calls(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<serde_json::Value> {
        let path = path.trim_matches('/');
        debug!("Static source GET {}", path);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((path.to_string(), query.to_vec()));
        }

        if self.failing {
            return Err(Error::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                url: path.to_string(),
            });
        }

        self.responses
            .get(path)
            .cloned()
            .ok_or_else(|| Error::Status {
                status: reqwest::StatusCode::NOT_FOUND,
                url: path.to_string(),
            })
    }
}
