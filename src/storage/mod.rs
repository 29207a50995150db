//! Durable client-side string store
//!
//! Holds the last visited fragment and the recent search list between runs.
//! Store failures never reach the user: [`Session`] logs them and carries on.

pub mod sqlite;

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::StorageError;

pub use sqlite::SqliteStore;

/// Key of the last navigated fragment
pub const LAST_PAGE_KEY: &str = "lastPage";

/// Key of the JSON-encoded recent search list
pub const RECENT_SEARCHES_KEY: &str = "recentSearches";

/// Most recent searches kept
pub const MAX_RECENT_SEARCHES: usize = 5;

type Result<T> = std::result::Result<T, StorageError>;

/// String key/value store that may be unavailable
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local store, used when the durable store cannot be opened and in tests
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails, like a disabled browser storage
    pub fn unavailable() -> Self {
        Self {
            values: Mutex::default(),
            unavailable: true,
        }
    }

    fn values(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        if self.unavailable {
            return Err(StorageError::Unavailable("storage is disabled".to_string()));
        }
        self.values
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values()?.remove(key);
        Ok(())
    }
}

/// Typed access to the portal's stored keys.
///
/// Every read falls back to "nothing stored" and every write is best-effort.
pub struct Session {
    store: Box<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Open the durable store, falling back to a process-local one
    pub fn open_default() -> Self {
        match SqliteStore::open() {
            Ok(store) => Self::new(Box::new(store)),
            Err(e) => {
                log::warn!("Durable storage not available, using memory: {}", e);
                Self::new(Box::new(MemoryStore::new()))
            }
        }
    }

    /// Fragment remembered from the previous navigation
    pub fn last_page(&self) -> Option<String> {
        match self.store.get(LAST_PAGE_KEY) {
            Ok(value) => value.filter(|v| !v.trim().is_empty()),
            Err(e) => {
                log::warn!("Could not read {}: {}", LAST_PAGE_KEY, e);
                None
            }
        }
    }

    pub fn remember_page(&self, fragment: &str) {
        if let Err(e) = self.store.set(LAST_PAGE_KEY, fragment) {
            log::warn!("Could not store {}: {}", LAST_PAGE_KEY, e);
        }
    }

    /// Recent searches, most recent first
    pub fn recent_searches(&self) -> Vec<String> {
        let raw = match self.store.get(RECENT_SEARCHES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("Could not read {}: {}", RECENT_SEARCHES_KEY, e);
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed {}: {}", RECENT_SEARCHES_KEY, e);
            Vec::new()
        })
    }

    /// Put `query` at the front of the recent list, dropping an exact duplicate
    /// and keeping at most [`MAX_RECENT_SEARCHES`]. Returns the new list.
    pub fn record_search(&self, query: &str) -> Vec<String> {
        let mut recent: Vec<String> = std::iter::once(query.to_string())
            .chain(self.recent_searches().into_iter().filter(|s| s != query))
            .collect();
        recent.truncate(MAX_RECENT_SEARCHES);

        match serde_json::to_string(&recent) {
            Ok(json) => {
                if let Err(e) = self.store.set(RECENT_SEARCHES_KEY, &json) {
                    log::warn!("Could not store {}: {}", RECENT_SEARCHES_KEY, e);
                }
            }
            Err(e) => log::warn!("Could not encode {}: {}", RECENT_SEARCHES_KEY, e),
        }
        recent
    }

    pub fn clear_recent_searches(&self) {
        if let Err(e) = self.store.remove(RECENT_SEARCHES_KEY) {
            log::warn!("Could not clear {}: {}", RECENT_SEARCHES_KEY, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(Box::new(MemoryStore::new()))
    }

    #[test]
    fn test_last_page_round_trip() {
        let session = session();
        assert_eq!(session.last_page(), None);

        session.remember_page("#directory");
        assert_eq!(session.last_page().as_deref(), Some("#directory"));
    }

    #[test]
    fn test_unavailable_store_is_silent() {
        let session = Session::new(Box::new(MemoryStore::unavailable()));

        session.remember_page("#home");
        assert_eq!(session.last_page(), None);
        assert_eq!(session.record_search("fish"), vec!["fish"]);
        assert!(session.recent_searches().is_empty());
    }

    #[test]
    fn test_record_search_most_recent_first_and_deduplicated() {
        let session = session();
        session.record_search("a");
        session.record_search("b");
        let recent = session.record_search("a");

        assert_eq!(recent, vec!["a", "b"]);
        assert_eq!(session.recent_searches(), vec!["a", "b"]);
    }

    #[test]
    fn test_record_search_caps_list() {
        let session = session();
        for q in ["1", "2", "3", "4", "5", "6", "7"] {
            session.record_search(q);
        }

        assert_eq!(session.recent_searches(), vec!["7", "6", "5", "4", "3"]);
    }

    #[test]
    fn test_dedup_is_exact_match() {
        let session = session();
        session.record_search("Fish");
        let recent = session.record_search("fish");

        assert_eq!(recent, vec!["fish", "Fish"]);
    }

    #[test]
    fn test_malformed_recent_searches_read_as_empty() {
        let store = MemoryStore::new();
        store.set(RECENT_SEARCHES_KEY, "not json").unwrap();
        let session = Session::new(Box::new(store));

        assert!(session.recent_searches().is_empty());
        assert_eq!(session.record_search("q"), vec!["q"]);
    }

    #[test]
    fn test_clear_recent_searches() {
        let session = session();
        session.record_search("q");
        session.clear_recent_searches();

        assert!(session.recent_searches().is_empty());
    }
}
