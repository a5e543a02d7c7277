//! Row retrieval from the hosted comps store.
//!
//! The backend is a PostgREST-style endpoint: rows for a mode are pulled
//! with server-side `mode` and `winrate not null` filters, paged by
//! offset until a short page arrives. A total-row safety cap bounds
//! client memory; hitting it flags the result as truncated.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::models::RawComp;

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Default safety cap on total rows fetched per mode.
pub const DEFAULT_MAX_ROWS: usize = 20_000;

/// Errors from the query layer.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A complete (possibly capped) row set for one mode.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedRows {
    pub rows: Vec<RawComp>,
    /// True when the safety cap stopped the fetch early.
    pub truncated: bool,
}

/// Source of raw comp rows.
///
/// `fetch_page` is the only required method; the paging loop is shared.
/// Tests implement this with an in-memory source.
#[async_trait]
pub trait CompsSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Rows per page request.
    fn page_size(&self) -> usize {
        DEFAULT_PAGE_SIZE
    }

    /// Safety cap on total rows per mode.
    fn max_rows(&self) -> usize {
        DEFAULT_MAX_ROWS
    }

    /// Fetch one page of rows for a mode.
    async fn fetch_page(
        &self,
        mode: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RawComp>, QueryError>;

    /// Fetch all rows for a mode, paging until a short page or the cap.
    async fn fetch_rows(&self, mode: &str) -> Result<FetchedRows, QueryError> {
        let page_size = self.page_size().max(1);
        let max_rows = self.max_rows();

        let mut rows: Vec<RawComp> = Vec::new();
        let mut offset = 0;

        while offset < max_rows {
            let batch = self.fetch_page(mode, offset, page_size).await?;
            let batch_len = batch.len();
            rows.extend(batch);

            debug!(
                source = self.name(),
                mode, offset, batch_len, "fetched comps page"
            );

            if batch_len < page_size {
                break;
            }
            offset += page_size;
        }

        let truncated = offset >= max_rows;
        if truncated {
            warn!(
                source = self.name(),
                mode, max_rows, "row cap reached, result truncated"
            );
        }
        info!(
            source = self.name(),
            mode,
            row_count = rows.len(),
            truncated,
            "fetched comps rows"
        );

        Ok(FetchedRows { rows, truncated })
    }
}

/// Connection settings for the REST backend.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Backend base URL (the part before `/rest/v1/...`).
    pub base_url: Url,

    /// API key sent as `apikey` and bearer token, if the backend wants one.
    pub api_key: Option<String>,

    /// Table holding the comp rows.
    pub table: String,

    pub page_size: usize,
    pub max_rows: usize,
    pub timeout: Duration,
}

impl SourceConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_key: None,
            table: "comps".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_rows: DEFAULT_MAX_ROWS,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// PostgREST-backed row source.
pub struct RestSource {
    client: Client,
    config: SourceConfig,
}

impl RestSource {
    pub fn new(config: SourceConfig) -> Result<Self, QueryError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|_| QueryError::InvalidUrl("api key is not a valid header".into()))?;
            headers.insert("apikey", value.clone());
            let bearer = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|_| QueryError::InvalidUrl("api key is not a valid header".into()))?;
            headers.insert(reqwest::header::AUTHORIZATION, bearer);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// URL for one page of the comps query.
    fn page_url(&self, mode: &str, offset: usize, limit: usize) -> Result<Url, QueryError> {
        let mut url = self
            .config
            .base_url
            .join(&format!("rest/v1/{}", self.config.table))
            .map_err(|e| QueryError::InvalidUrl(e.to_string()))?;

        url.query_pairs_mut()
            .append_pair("select", "heroes,pet,winrate,teams,region")
            .append_pair("mode", &format!("eq.{mode}"))
            .append_pair("winrate", "not.is.null")
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &limit.to_string());

        Ok(url)
    }
}

#[async_trait]
impl CompsSource for RestSource {
    fn name(&self) -> &'static str {
        "rest"
    }

    fn page_size(&self) -> usize {
        self.config.page_size
    }

    fn max_rows(&self) -> usize {
        self.config.max_rows
    }

    async fn fetch_page(
        &self,
        mode: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RawComp>, QueryError> {
        let url = self.page_url(mode, offset, limit)?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NumberOrText;

    fn make_row(i: usize) -> RawComp {
        RawComp {
            heroes: Some(format!("H{i} - J{i}")),
            pet: Some("Fox".to_string()),
            winrate: Some(50.0),
            teams: Some(NumberOrText::from(4)),
            region: None,
        }
    }

    /// In-memory source with a fixed row list.
    struct FixedSource {
        rows: Vec<RawComp>,
        page_size: usize,
        max_rows: usize,
    }

    #[async_trait]
    impl CompsSource for FixedSource {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn page_size(&self) -> usize {
            self.page_size
        }

        fn max_rows(&self) -> usize {
            self.max_rows
        }

        async fn fetch_page(
            &self,
            _mode: &str,
            offset: usize,
            limit: usize,
        ) -> Result<Vec<RawComp>, QueryError> {
            let end = (offset + limit).min(self.rows.len());
            if offset >= self.rows.len() {
                return Ok(Vec::new());
            }
            Ok(self.rows[offset..end].to_vec())
        }
    }

    #[tokio::test]
    async fn test_short_page_terminates() {
        let source = FixedSource {
            rows: (0..25).map(make_row).collect(),
            page_size: 10,
            max_rows: 1000,
        };

        let fetched = source.fetch_rows("ts-forest").await.unwrap();
        assert_eq!(fetched.rows.len(), 25);
        assert!(!fetched.truncated);
    }

    #[tokio::test]
    async fn test_exact_multiple_of_page_size() {
        // 20 rows, pages of 10: the third page is empty and ends the loop.
        let source = FixedSource {
            rows: (0..20).map(make_row).collect(),
            page_size: 10,
            max_rows: 1000,
        };

        let fetched = source.fetch_rows("ts-forest").await.unwrap();
        assert_eq!(fetched.rows.len(), 20);
        assert!(!fetched.truncated);
    }

    #[tokio::test]
    async fn test_row_cap_truncates() {
        let source = FixedSource {
            rows: (0..100).map(make_row).collect(),
            page_size: 10,
            max_rows: 30,
        };

        let fetched = source.fetch_rows("ts-forest").await.unwrap();
        assert_eq!(fetched.rows.len(), 30);
        assert!(fetched.truncated);
    }

    #[tokio::test]
    async fn test_empty_source() {
        let source = FixedSource {
            rows: Vec::new(),
            page_size: 10,
            max_rows: 1000,
        };

        let fetched = source.fetch_rows("ts-forest").await.unwrap();
        assert!(fetched.rows.is_empty());
        assert!(!fetched.truncated);
    }

    #[test]
    fn test_page_url_query() {
        let config = SourceConfig::new(Url::parse("https://db.example.com/").unwrap());
        let source = RestSource::new(config).unwrap();

        let url = source.page_url("ts-forest", 2000, 1000).unwrap();
        assert_eq!(url.path(), "/rest/v1/comps");

        let query = url.query().unwrap();
        assert!(query.contains("select=heroes%2Cpet%2Cwinrate%2Cteams%2Cregion"));
        assert!(query.contains("mode=eq.ts-forest"));
        assert!(query.contains("winrate=not.is.null"));
        assert!(query.contains("offset=2000"));
        assert!(query.contains("limit=1000"));
    }

    #[test]
    fn test_rest_source_with_api_key() {
        let config = SourceConfig::new(Url::parse("https://db.example.com/").unwrap())
            .with_api_key("service-key");
        assert!(RestSource::new(config).is_ok());
    }
}
