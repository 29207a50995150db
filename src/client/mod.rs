//! Spreadsheet API client

use async_trait::async_trait;

use crate::error::Result;

#[cfg(test)]
pub mod mock;
pub mod row;
pub mod sheets;

#[cfg(test)]
pub use mock::MockSheetSource;
pub use row::{SheetRow, ValueRange, rows_from_values};
pub use sheets::SheetsClient;

/// A source of named tables.
///
/// Implementations fetch one sheet and flatten it into rows (see
/// [`rows_from_values`]). A sheet with no values yields an empty vector.
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Fetch every data row of the named sheet
    async fn fetch_table(&self, name: &str) -> Result<Vec<SheetRow>>;
}

#[async_trait]
impl<S: SheetSource + ?Sized> SheetSource for std::sync::Arc<S> {
    async fn fetch_table(&self, name: &str) -> Result<Vec<SheetRow>> {
        (**self).fetch_table(name).await
    }
}
