//! Cache key naming

/// Key of the aggregated home-page counters
pub const QUICK_STATS_KEY: &str = "quickstats";

/// Key under which a sheet's rows are cached
pub fn sheet_key(sheet: &str) -> String {
    format!("sheet_{}", sheet)
}
