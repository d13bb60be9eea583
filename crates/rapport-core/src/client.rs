//! HTTP client for the ERP backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::source::{fetch_records, RecordSource};

#[derive(Debug, Clone)]
pub struct ReportClient {
    http_client: Client,
    base_url: String,
}

impl ReportClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.base_url, config.timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Full unpaginated collection of a resource (`{resource}/findall`)
    pub async fn findall<T: DeserializeOwned>(&self, resource: &str) -> Result<Vec<T>> {
        let path = format!("{}/findall", resource.trim_matches('/'));
        let envelope = fetch_records(self, &path, &[]).await?;
        Ok(envelope.into_records())
    }
}

#[async_trait]
impl RecordSource for ReportClient {
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<serde_json::Value> {
        let url = self.url(path);
        debug!("GET {} {:?}", url, query);

        let response = self.http_client.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            return Err(Error::Status {
                status: response.status(),
                url: response.url().to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Payment;
    use crate::test_utils::MockErpServer;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ReportClient::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(
            client.url("/entryPayements/rapportBanqueTotal"),
            "http://localhost:8080/entryPayements/rapportBanqueTotal"
        );
    }

    #[tokio::test]
    async fn test_findall_bare_and_content_shapes() {
        let server = MockErpServer::start().await;
        let client = ReportClient::new(&server.url(), Duration::from_secs(5)).unwrap();

        let banks: Vec<serde_json::Value> = client.findall("banques").await.unwrap();
        assert_eq!(banks.len(), 3);

        // Paged shape
        let partners: Vec<serde_json::Value> = client.findall("partenaires").await.unwrap();
        assert_eq!(partners.len(), 2);
    }

    #[tokio::test]
    async fn test_report_query_reaches_backend() {
        let server = MockErpServer::start().await;
        let client = ReportClient::new(&server.url(), Duration::from_secs(5)).unwrap();

        let query = vec![
            ("debut".to_string(), "2025-01-01".to_string()),
            ("fin".to_string(), "2025-01-31".to_string()),
        ];
        let envelope =
            fetch_records::<Payment, _>(&client, "entryPayements/rapportBanqueTotal", &query)
                .await
                .unwrap();
        assert_eq!(envelope.len(), 4);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockErpServer::start().await;
        let client = ReportClient::new(&server.url(), Duration::from_secs(5)).unwrap();

        let err = client
            .get_json("does/not/exist", &[])
            .await
            .unwrap_err();
        match err {
            Error::Status { status, url } => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
                assert!(url.ends_with("/does/not/exist"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_date_range_rejected_by_backend() {
        let server = MockErpServer::start().await;
        let client = ReportClient::new(&server.url(), Duration::from_secs(5)).unwrap();

        let err = client
            .get_json("entryPayements/rapportBanqueTotal", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Status { status, .. } if status == reqwest::StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_http_error() {
        let client = ReportClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client.get_json("banques/findall", &[]).await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
