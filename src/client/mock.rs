//! Mock sheet source for testing
//!
//! Serves tables from memory and counts every fetch so tests can verify
//! caching and short-circuit behavior without a network.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{SheetRow, SheetSource, rows_from_values};
use crate::error::{ApiError, Result};

/// In-memory [`SheetSource`].
///
/// # Example
/// ```ignore
/// let mock = MockSheetSource::new()
///     .with_table("People", &["NAME", "EMAIL"], &[&["Ann", "a@x.com"]]);
///
/// let rows = mock.fetch_table("People").await?;
/// assert_eq!(mock.calls("People"), 1);
/// ```
#[derive(Default)]
pub struct MockSheetSource {
    tables: HashMap<String, Vec<SheetRow>>,
    failures: HashMap<String, u16>,
    delay: Option<Duration>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MockSheetSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a sheet built from a header and data rows, exactly like a grid response
    pub fn with_table(mut self, name: &str, header: &[&str], rows: &[&[&str]]) -> Self {
        let mut grid: Vec<Vec<Value>> = vec![header.iter().map(|h| Value::from(*h)).collect()];
        grid.extend(
            rows.iter()
                .map(|r| r.iter().map(|c| Value::from(*c)).collect()),
        );
        self.tables
            .insert(name.to_string(), rows_from_values(Some(grid.as_slice())));
        self
    }

    /// Serve a sheet with no values at all
    pub fn with_empty_table(mut self, name: &str) -> Self {
        self.tables.insert(name.to_string(), Vec::new());
        self
    }

    /// Fail every fetch of `name` with the given HTTP status
    pub fn with_failure(mut self, name: &str, status: u16) -> Self {
        self.failures.insert(name.to_string(), status);
        self
    }

    /// Sleep before answering, to exercise concurrent callers
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches of one sheet
    pub fn calls(&self, name: &str) -> usize {
        self.calls
            .lock()
            .map(|c| c.get(name).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Number of fetches across all sheets
    pub fn total_calls(&self) -> usize {
        self.calls.lock().map(|c| c.values().sum()).unwrap_or(0)
    }
}

#[async_trait]
impl SheetSource for MockSheetSource {
    async fn fetch_table(&self, name: &str) -> Result<Vec<SheetRow>> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(name.to_string()).or_insert(0) += 1;
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(status) = self.failures.get(name) {
            let status = reqwest::StatusCode::from_u16(*status)
                .unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
            return Err(ApiError::from_status(status).into());
        }

        match self.tables.get(name) {
            Some(rows) => Ok(rows.clone()),
            None => Err(ApiError::Http {
                status: 400,
                reason: format!("Unable to parse range: {}", name),
            }
            .into()),
        }
    }
}
