//! HTTP client for the sales records API.
//!
//! One GET per call, no retries: a failed fetch is an error for the caller's
//! request. Responses are decoded into [`ApiSale`] and normalized into
//! [`SaleRecord`]s.

use std::time::Duration;

use reqwest::{Client, Url};
use salesdash_core::{AppConfig, SaleRecord, SourceQuery};

use crate::error::SourceError;
use crate::normalize::normalize_sales;
use crate::types::ApiSale;

pub const DEFAULT_BASE_URL: &str = "https://labdados.com/produtos";

const DEFAULT_USER_AGENT: &str = "salesdash/0.1 (sales-dashboard)";

/// Client for the sales records API.
///
/// Use [`SalesApiClient::new`] for the public endpoint or
/// [`SalesApiClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct SalesApiClient {
    client: Client,
    base_url: Url,
}

impl SalesApiClient {
    /// Creates a client pointed at the public sales API.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, SourceError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout_secs, DEFAULT_USER_AGENT)
    }

    /// Creates a client from the application config.
    ///
    /// # Errors
    ///
    /// See [`SalesApiClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        Self::with_base_url(
            &config.source_url,
            config.source_timeout_secs,
            &config.source_user_agent,
        )
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`SourceError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let base_url = Url::parse(base_url).map_err(|e| SourceError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Fetches the sales matching `query`, as returned by the API.
    ///
    /// # Errors
    ///
    /// - [`SourceError::Http`] on network failure.
    /// - [`SourceError::UnexpectedStatus`] on a non-2xx status.
    /// - [`SourceError::Deserialize`] if the body is not an array of sales.
    pub async fn fetch_raw(&self, query: &SourceQuery) -> Result<Vec<ApiSale>, SourceError> {
        let url = self.build_url(query);
        tracing::debug!(%url, "fetching sales");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<Vec<ApiSale>>(&body).map_err(|e| SourceError::Deserialize {
            context: format!("sales from {url}"),
            source: e,
        })
    }

    /// Fetches and normalizes the sales matching `query`.
    ///
    /// # Errors
    ///
    /// Everything [`SalesApiClient::fetch_raw`] returns, plus
    /// [`SourceError::InvalidRecord`] for a sale with an unusable field.
    pub async fn fetch_records(&self, query: &SourceQuery) -> Result<Vec<SaleRecord>, SourceError> {
        let raw = self.fetch_raw(query).await?;
        let records = normalize_sales(raw)?;
        tracing::info!(
            region = %query.region,
            year = ?query.year,
            records = records.len(),
            "fetched sales"
        );
        Ok(records)
    }

    /// Appends `regiao` and `ano` to the base URL. Both are always sent; an
    /// empty value means "all".
    fn build_url(&self, query: &SourceQuery) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query.query_pairs() {
                pairs.append_pair(k, &v);
            }
        }
        url
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
