//! HTTP client for the spreadsheet `values` endpoint

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client as HttpClient, Url};

use super::{SheetRow, SheetSource, ValueRange, rows_from_values};
use crate::config::Config;
use crate::error::{ApiError, ConfigError, Result};

/// Read quota is 60 requests per minute per user
const RATE_LIMIT_PER_SECOND: NonZeroU32 = NonZeroU32::MIN;

/// Allow a page worth of sheets to load without waiting
const RATE_LIMIT_BURST: NonZeroU32 = NonZeroU32::new(10).unwrap();

/// Client for `GET /v4/spreadsheets/{id}/values/{sheet}`
pub struct SheetsClient {
    http: HttpClient,
    base_url: Url,
    spreadsheet_id: String,
    api_key: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl SheetsClient {
    /// Create a client against `api_base`
    pub fn new(api_base: &str, spreadsheet_id: &str, api_key: &str) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let base_url = Url::parse(api_base)
            .map_err(|e| ConfigError::Invalid(format!("api_base '{}': {}", api_base, e)))?;

        let quota = Quota::per_second(RATE_LIMIT_PER_SECOND).allow_burst(RATE_LIMIT_BURST);

        Ok(Self {
            http,
            base_url,
            spreadsheet_id: spreadsheet_id.to_string(),
            api_key: api_key.to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Create a client from validated configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let api_key = config.api_key.as_deref().ok_or(ConfigError::MissingApiKey)?;
        let spreadsheet_id = config
            .spreadsheet_id
            .as_deref()
            .ok_or(ConfigError::MissingSpreadsheetId)?;
        Self::new(&config.api_base, spreadsheet_id, api_key)
    }

    /// URL of a sheet's values, without the API key
    fn values_url(&self, sheet: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ConfigError::Invalid(format!("api_base '{}' cannot be a base", self.base_url))
            })?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", &self.spreadsheet_id, "values", sheet]);
        Ok(url)
    }

    /// Fetch the raw value grid of a sheet
    pub async fn fetch_values(&self, sheet: &str) -> Result<ValueRange> {
        self.rate_limiter.until_ready().await;

        let url = self.values_url(sheet)?;
        log::debug!("Fetching sheet '{}' from {}", sheet, url);

        let response = self
            .http
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("API error for sheet '{}': {} {}", sheet, status, body.trim());
            return Err(ApiError::from_status(status).into());
        }

        let range = response.json::<ValueRange>().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse sheet '{}': {}", sheet, e))
        })?;

        Ok(range)
    }
}

#[async_trait]
impl SheetSource for SheetsClient {
    async fn fetch_table(&self, name: &str) -> Result<Vec<SheetRow>> {
        let range = self.fetch_values(name).await?;

        if range.values.as_ref().is_none_or(Vec::is_empty) {
            log::warn!("No data values found in sheet '{}'", name);
        }

        let rows = rows_from_values(range.values.as_deref());
        log::debug!("Converted {} rows for sheet '{}'", rows.len(), name);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use mockito::Matcher;

    #[test]
    fn test_values_url_encodes_sheet_name() {
        let client = SheetsClient::new("https://sheets.example.com", "abc", "secret").unwrap();

        let url = client.values_url("Internal Directory").unwrap();

        assert_eq!(
            url.as_str(),
            "https://sheets.example.com/v4/spreadsheets/abc/values/Internal%20Directory"
        );
        assert!(!url.as_str().contains("secret"));
    }

    #[tokio::test]
    async fn test_fetch_table_parses_grid() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v4/spreadsheets/abc/values/People")
            .match_query(Matcher::UrlEncoded("key".into(), "secret".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"range":"People!A1:B3","majorDimension":"ROWS",
                    "values":[["NAME","EMAIL"],["Ann","a@x.com"],["Bob","b@x.com"]]}"#,
            )
            .create_async()
            .await;

        let client = SheetsClient::new(&server.url(), "abc", "secret").unwrap();
        let rows = client.fetch_table("People").await.unwrap();

        mock.assert_async().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value("NAME"), "Ann");
        assert_eq!(rows[1].value("EMAIL"), "b@x.com");
    }

    #[tokio::test]
    async fn test_fetch_table_without_values_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v4/spreadsheets/abc/values/Empty")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"range":"Empty!A1:Z1000","majorDimension":"ROWS"}"#)
            .create_async()
            .await;

        let client = SheetsClient::new(&server.url(), "abc", "secret").unwrap();
        let rows = client.fetch_table("Empty").await.unwrap();

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_table_non_success_is_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v4/spreadsheets/abc/values/Missing")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":{"message":"Unable to parse range: Missing"}}"#)
            .create_async()
            .await;

        let client = SheetsClient::new(&server.url(), "abc", "secret").unwrap();
        let err = client.fetch_table("Missing").await.unwrap_err();

        match err {
            Error::Api(ApiError::Http { status, reason }) => {
                assert_eq!(status, 400);
                assert_eq!(reason, "Bad Request");
            }
            other => panic!("Expected ApiError::Http, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_table_invalid_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v4/spreadsheets/abc/values/Broken")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = SheetsClient::new(&server.url(), "abc", "secret").unwrap();
        let err = client.fetch_table("Broken").await.unwrap_err();

        assert!(matches!(err, Error::Api(ApiError::InvalidResponse(_))));
    }
}
