//! Naive multi-sheet substring search

use std::collections::HashSet;

use serde::Serialize;

use crate::client::SheetRow;

/// Results kept after ranking
pub const MAX_RESULTS: usize = 50;

/// Top results whose matched field feeds the suggestions
pub const SUGGESTION_SOURCES: usize = 5;

/// Score for a field equal to the query
const EXACT_SCORE: u32 = 10;

/// Score for a field containing the query
const PARTIAL_SCORE: u32 = 1;

/// A matching row with its provenance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub row: SheetRow,

    #[serde(rename = "_sheet")]
    pub sheet: String,

    #[serde(rename = "_score")]
    pub score: u32,

    /// Last field that contributed to the score
    #[serde(rename = "_field")]
    pub field: String,
}

impl SearchHit {
    /// The row with `_sheet`, `_score` and `_field` appended
    pub fn to_row(&self) -> SheetRow {
        let mut row = self.row.clone();
        row.insert("_sheet", self.sheet.clone());
        row.insert("_score", self.score.to_string());
        row.insert("_field", self.field.clone());
        row
    }

    /// Value of the matched field
    pub fn matched_value(&self) -> &str {
        self.row.value(&self.field)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub results: Vec<SearchHit>,
    pub suggestions: Vec<String>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Lowercased, trimmed form of a query. `None` for a blank query.
pub fn normalize_query(query: &str) -> Option<String> {
    let q = query.trim().to_lowercase();
    (!q.is_empty()).then_some(q)
}

/// Score one row against a normalized query over `fields`.
///
/// Returns the total and the last field with a nonzero score, or `None`
/// when nothing matched.
pub fn score_row(row: &SheetRow, fields: &[&str], query: &str) -> Option<(u32, String)> {
    let mut total = 0;
    let mut matched = None;

    for field in fields {
        let value = row.value(field).to_lowercase();
        let score = if value == query {
            EXACT_SCORE
        } else if value.contains(query) {
            PARTIAL_SCORE
        } else {
            0
        };

        if score > 0 {
            total += score;
            matched = Some(*field);
        }
    }

    matched.map(|f| (total, f.to_string()))
}

/// Accumulates hits across sheets, skipping rows already seen in a sheet
#[derive(Debug, Default)]
pub struct Collector {
    hits: Vec<SearchHit>,
    seen: HashSet<String>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score every row of one sheet and keep the matches
    pub fn scan(&mut self, sheet: &str, rows: &[SheetRow], fields: &[&str], query: &str) {
        for row in rows {
            let Some((score, field)) = score_row(row, fields, query) else {
                continue;
            };

            let content = serde_json::to_string(row).unwrap_or_default();
            if !self.seen.insert(format!("{}_{}", sheet, content)) {
                continue;
            }

            self.hits.push(SearchHit {
                row: row.clone(),
                sheet: sheet.to_string(),
                score,
                field,
            });
        }
    }

    /// Rank by descending score (ties keep scan order), cap, and derive suggestions
    pub fn finish(mut self) -> SearchResults {
        self.hits.sort_by(|a, b| b.score.cmp(&a.score));
        self.hits.truncate(MAX_RESULTS);

        let mut suggestions: Vec<String> = Vec::new();
        for hit in self.hits.iter().take(SUGGESTION_SOURCES) {
            let value = hit.matched_value();
            if !value.is_empty() && !suggestions.iter().any(|s| s == value) {
                suggestions.push(value.to_string());
            }
        }

        SearchResults {
            results: self.hits,
            suggestions,
        }
    }
}
