//! Data access layer
//!
//! [`DataService`] wraps a [`SheetSource`] with the TTL cache and exposes one
//! accessor per portal table, the quick statistics, the multi-sheet search
//! and cache invalidation.

pub mod export;
pub mod schema;
pub mod search;

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::cache::{QUICK_STATS_KEY, TtlCache, sheet_key};
use crate::client::{SheetRow, SheetSource};
use crate::config::SheetNames;
use crate::error::{Error, Result};

pub use export::to_delimited_text;
pub use schema::{
    Activity, DirectoryEntry, FromRow, Municipality, ProfileCharacteristic, ReferenceFile,
    StructureComponent,
};
pub use search::{SearchHit, SearchResults};

const STRUCTURE_FIELDS: &[&str] = &["COMPONENT", "FULL_NAME", "LEVEL", "HEAD", "COMPOSITION"];

const MUNICIPALITY_FIELDS: &[&str] = &["FMA_ID", "REGION", "PROVINCE", "MUNICIPALITY"];

const ACTIVITY_FIELDS: &[&str] = &[
    "ACTIVITY_TITLE",
    "DATE_CONDUCTED",
    "LOCATION",
    "RESOURCE_PERSON",
    "REFERENCE_DOC",
];

const INTERNAL_DIRECTORY_FIELDS: &[&str] = &[
    "GIVEN_NAME",
    "LAST_NAME",
    "MIDDLE_INITIAL",
    "COMPONENT",
    "POSITION_DESIGNATION",
    "EMPLOYMENT_TYPE",
    "EMAIL",
];

const EXTERNAL_DIRECTORY_FIELDS: &[&str] = &[
    "GIVEN_NAME",
    "LAST_NAME",
    "MIDDLE_INITIAL",
    "OFFICE",
    "POSITION_DESIGNATION",
    "FMA_LEAD",
    "EMAIL",
];

const NPMO_DIRECTORY_FIELDS: &[&str] = &[
    "GIVEN_NAME",
    "LAST_NAME",
    "MIDDLE_INITIAL",
    "OFFICE",
    "POSITION_DESIGNATION",
    "COMPONENT",
    "EMAIL",
];

const REFERENCE_FIELDS: &[&str] = &["DOCUMENT_TITLE", "FILE_URL", "CATEGORY"];

/// Which of the three people directories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryKind {
    #[default]
    Internal,
    External,
    Npmo,
}

impl DirectoryKind {
    pub const ALL: [DirectoryKind; 3] = [Self::Internal, Self::External, Self::Npmo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
            Self::Npmo => "npmo",
        }
    }

    /// Heading shown above the directory table
    pub fn title(&self) -> &'static str {
        match self {
            Self::Internal => "Internal Directory",
            Self::External => "External Directory",
            Self::Npmo => "NPMO Directory",
        }
    }

    pub fn sheet<'a>(&self, sheets: &'a SheetNames) -> &'a str {
        match self {
            Self::Internal => &sheets.internal_directory,
            Self::External => &sheets.external_directory,
            Self::Npmo => &sheets.npmo_directory,
        }
    }
}

impl fmt::Display for DirectoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DirectoryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "internal" => Ok(Self::Internal),
            "external" => Ok(Self::External),
            "npmo" => Ok(Self::Npmo),
            other => Err(Error::InvalidArgument(format!(
                "Invalid directory type: {} (expected internal, external or npmo)",
                other
            ))),
        }
    }
}

/// Record counts shown on the home page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickStats {
    pub internal_count: usize,
    pub activities_count: usize,
    pub files_count: usize,
}

/// Cached, typed access to the portal tables
pub struct DataService<S: SheetSource> {
    source: S,
    cache: TtlCache,
    sheets: SheetNames,
    ttl: Duration,
}

impl<S: SheetSource> DataService<S> {
    pub fn new(source: S, sheets: SheetNames, ttl: Duration) -> Self {
        Self {
            source,
            cache: TtlCache::new(),
            sheets,
            ttl,
        }
    }

    pub fn sheets(&self) -> &SheetNames {
        &self.sheets
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fetch a sheet straight from the source, bypassing the cache
    pub async fn fetch_table(&self, name: &str) -> Result<Vec<SheetRow>> {
        log::debug!("Fetching sheet {}", name);
        self.source.fetch_table(name).await
    }

    /// Memoize `producer` under `key` for `ttl`
    pub async fn get_cached<T, F, Fut>(&self, key: &str, ttl: Duration, producer: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.cache.get_or_fetch(key, ttl, producer).await
    }

    /// Rows of a sheet keyed by canonical header, cached under `sheet_<name>`.
    ///
    /// Headers are normalized here, once per fetch, so the typed adapters,
    /// search and export all see `FULL_NAME` whether the sheet says
    /// `Full Name`, `full-name` or `FULL_NAME`.
    pub async fn get_sheet(&self, name: &str) -> Result<Vec<SheetRow>> {
        self.get_cached(&sheet_key(name), self.ttl, || async {
            let rows = self.fetch_table(name).await?;
            Ok::<_, Error>(rows.iter().map(schema::normalize_row).collect())
        })
        .await
    }

    async fn get_typed<T: FromRow>(&self, name: &str) -> Result<Vec<T>> {
        let rows = self.get_sheet(name).await?;
        Ok(schema::adapt(name, &rows)?)
    }

    /// Internal directory, activities and reference file counts.
    ///
    /// The three sheets load concurrently; any failure fails the whole call.
    pub async fn get_quick_stats(&self) -> Result<QuickStats> {
        self.get_cached(QUICK_STATS_KEY, self.ttl, || async {
            let (internal, activities, files) = tokio::try_join!(
                self.get_sheet(&self.sheets.internal_directory),
                self.get_sheet(&self.sheets.activities),
                self.get_sheet(&self.sheets.reference_files),
            )?;

            Ok::<_, Error>(QuickStats {
                internal_count: internal.len(),
                activities_count: activities.len(),
                files_count: files.len(),
            })
        })
        .await
    }

    pub async fn get_implementation_structure(&self) -> Result<Vec<StructureComponent>> {
        self.get_typed(&self.sheets.implementation_structure).await
    }

    pub async fn get_municipalities(&self) -> Result<Vec<Municipality>> {
        self.get_typed(&self.sheets.municipalities).await
    }

    pub async fn get_activities(&self) -> Result<Vec<Activity>> {
        self.get_typed(&self.sheets.activities).await
    }

    /// Entries of the directory named by `kind` (`internal`, `external`, `npmo`)
    pub async fn get_directory(&self, kind: &str) -> Result<Vec<DirectoryEntry>> {
        let kind: DirectoryKind = kind.parse()?;
        self.get_typed(kind.sheet(&self.sheets)).await
    }

    /// Rows of a directory, every column kept (for export)
    pub async fn get_directory_rows(&self, kind: DirectoryKind) -> Result<Vec<SheetRow>> {
        self.get_sheet(kind.sheet(&self.sheets)).await
    }

    pub async fn get_reference_files(&self) -> Result<Vec<ReferenceFile>> {
        self.get_typed(&self.sheets.reference_files).await
    }

    pub async fn get_fma_profile(&self) -> Result<Vec<ProfileCharacteristic>> {
        self.get_typed(&self.sheets.fma_profile).await
    }

    /// Sheets searched by [`search_all`](Self::search_all) and the fields scored in each
    pub fn search_targets(&self) -> [(&str, &'static [&'static str]); 7] {
        let s = &self.sheets;
        [
            (s.implementation_structure.as_str(), STRUCTURE_FIELDS),
            (s.municipalities.as_str(), MUNICIPALITY_FIELDS),
            (s.activities.as_str(), ACTIVITY_FIELDS),
            (s.internal_directory.as_str(), INTERNAL_DIRECTORY_FIELDS),
            (s.external_directory.as_str(), EXTERNAL_DIRECTORY_FIELDS),
            (s.npmo_directory.as_str(), NPMO_DIRECTORY_FIELDS),
            (s.reference_files.as_str(), REFERENCE_FIELDS),
        ]
    }

    /// Case-insensitive substring search over every portal table.
    ///
    /// A blank query returns nothing without touching the source. A sheet
    /// that fails to load is logged and left out.
    pub async fn search_all(&self, query: &str) -> Result<SearchResults> {
        let Some(query) = search::normalize_query(query) else {
            return Ok(SearchResults::default());
        };

        // Fetch concurrently, scan in table order
        let targets = self.search_targets();
        let tables = join_all(targets.iter().map(|(sheet, _)| self.get_sheet(sheet))).await;

        let mut collector = search::Collector::new();
        for ((sheet, fields), rows) in targets.iter().zip(tables) {
            match rows {
                Ok(rows) => collector.scan(sheet, &rows, fields, &query),
                Err(e) => log::warn!("Skipping {} in search: {}", sheet, e),
            }
        }

        let results = collector.finish();
        log::debug!(
            "Search '{}': {} results, {} suggestions",
            query,
            results.results.len(),
            results.suggestions.len()
        );
        Ok(results)
    }

    /// Drop every cached table and statistic. Returns the number of entries removed.
    pub fn invalidate_all(&self) -> usize {
        let removed = self.cache.invalidate_all();
        log::info!("Cache cleared ({} entries)", removed);
        removed
    }
}
