//! Typed records for each portal table
//!
//! Raw sheet headers are normalized once per fetch into canonical names
//! (trimmed, uppercased, runs of whitespace or `-` collapsed to `_`), so
//! `Key Characteristics`, `KEY CHARACTERISTICS` and `key_characteristics`
//! all read as `KEY_CHARACTERISTICS`. A [`Column`] then lists the canonical
//! name followed by its accepted aliases; the first one present wins.
//!
//! Adapters fail with [`SchemaError::MissingColumn`] when a required column
//! is absent from the sheet. Optional columns read as `""`.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::client::SheetRow;
use crate::error::SchemaError;

/// Canonical form of a header
pub fn canonical_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for c in raw.trim().chars() {
        if c.is_whitespace() || c == '-' || c == '_' {
            pending_sep = true;
            continue;
        }
        if pending_sep && !out.is_empty() {
            out.push('_');
        }
        pending_sep = false;
        out.extend(c.to_uppercase());
    }
    out
}

/// The row with every header in canonical form. When two headers collapse
/// to the same name the leftmost one is kept.
pub fn normalize_row(row: &SheetRow) -> SheetRow {
    let mut out = SheetRow::new();
    for (header, value) in row.iter() {
        let key = canonical_header(header);
        if out.get(&key).is_none() {
            out.insert(key, value);
        }
    }
    out
}

/// A logical column and its fallback spellings, in lookup order
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

impl Column {
    const fn new(name: &'static str) -> Self {
        Self { name, aliases: &[] }
    }

    const fn with_aliases(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { name, aliases }
    }

    fn spellings(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }
}

pub mod columns {
    use super::Column;

    pub const COMPONENT: Column = Column::new("COMPONENT");
    pub const FULL_NAME: Column = Column::new("FULL_NAME");
    pub const LEVEL: Column = Column::new("LEVEL");
    pub const HEAD: Column = Column::new("HEAD");
    pub const COMPOSITION: Column = Column::new("COMPOSITION");

    pub const FMA_ID: Column = Column::with_aliases("FMA_ID", &["FMA"]);
    pub const REGION: Column = Column::new("REGION");
    pub const PROVINCE: Column = Column::new("PROVINCE");
    pub const MUNICIPALITY: Column = Column::with_aliases("MUNICIPALITY", &["CITY_MUNICIPALITY"]);

    pub const ACTIVITY_TITLE: Column = Column::with_aliases("ACTIVITY_TITLE", &["TITLE"]);
    pub const DATE_CONDUCTED: Column = Column::with_aliases("DATE_CONDUCTED", &["DATE"]);
    pub const LOCATION: Column = Column::with_aliases("LOCATION", &["VENUE"]);
    pub const RESOURCE_PERSON: Column = Column::new("RESOURCE_PERSON");
    pub const REFERENCE_DOC: Column = Column::with_aliases("REFERENCE_DOC", &["REFERENCE_DOCUMENT"]);

    pub const GIVEN_NAME: Column = Column::with_aliases("GIVEN_NAME", &["FIRST_NAME"]);
    pub const LAST_NAME: Column = Column::with_aliases("LAST_NAME", &["SURNAME"]);
    pub const MIDDLE_INITIAL: Column = Column::with_aliases("MIDDLE_INITIAL", &["MI"]);
    pub const POSITION_DESIGNATION: Column =
        Column::with_aliases("POSITION_DESIGNATION", &["POSITION", "DESIGNATION"]);
    pub const EMPLOYMENT_TYPE: Column = Column::new("EMPLOYMENT_TYPE");
    pub const OFFICE: Column = Column::with_aliases("OFFICE", &["AGENCY"]);
    pub const FMA_LEAD: Column = Column::new("FMA_LEAD");
    pub const EMAIL: Column = Column::with_aliases("EMAIL", &["EMAIL_ADDRESS"]);

    pub const DOCUMENT_TITLE: Column = Column::with_aliases("DOCUMENT_TITLE", &["TITLE"]);
    pub const FILE_URL: Column = Column::with_aliases("FILE_URL", &["URL", "LINK"]);
    pub const CATEGORY: Column = Column::new("CATEGORY");

    pub const KEY_CHARACTERISTICS: Column =
        Column::with_aliases("KEY_CHARACTERISTICS", &["KEY_CHARACTERISTIC"]);
    pub const MEASUREMENT: Column = Column::new("MEASUREMENT");
    pub const FMA_06: Column = Column::with_aliases("FMA_06", &["FMA06", "FMA_6", "FMA6"]);
    pub const FMA_09: Column = Column::with_aliases("FMA_09", &["FMA09", "FMA_9", "FMA9"]);
}

/// A sheet row keyed by canonical header
#[derive(Debug, Clone, Default)]
pub struct CanonicalRow {
    fields: HashMap<String, String>,
}

impl CanonicalRow {
    /// Normalize a raw row. When two headers collapse to the same name the
    /// leftmost one is kept.
    pub fn from_row(row: &SheetRow) -> Self {
        let mut fields = HashMap::with_capacity(row.len());
        for (header, value) in row.iter() {
            fields
                .entry(canonical_header(header))
                .or_insert_with(|| value.to_string());
        }
        Self { fields }
    }

    /// Whether any spelling of the column exists
    pub fn has(&self, column: &Column) -> bool {
        column.spellings().any(|s| self.fields.contains_key(s))
    }

    /// Value of the first spelling present, trimmed; `""` when absent
    pub fn get(&self, column: &Column) -> &str {
        column
            .spellings()
            .find_map(|s| self.fields.get(s))
            .map(|v| v.trim())
            .unwrap_or("")
    }

    fn text(&self, column: &Column) -> String {
        self.get(column).to_string()
    }
}

/// Conversion from a normalized row into a typed record
pub trait FromRow: Sized {
    /// Columns the sheet must have
    const REQUIRED: &'static [Column];

    fn from_row(row: &CanonicalRow) -> Self;
}

/// Normalize and convert every row of `table`.
///
/// Fails on the first required column the sheet lacks. An empty sheet has
/// no header to check and adapts to an empty vector.
pub fn adapt<T: FromRow>(table: &str, rows: &[SheetRow]) -> Result<Vec<T>, SchemaError> {
    let rows: Vec<CanonicalRow> = rows.iter().map(CanonicalRow::from_row).collect();

    if let Some(first) = rows.first()
        && let Some(missing) = T::REQUIRED.iter().find(|c| !first.has(c))
    {
        return Err(SchemaError::MissingColumn {
            table: table.to_string(),
            column: missing.name.to_string(),
        });
    }

    Ok(rows.iter().map(T::from_row).collect())
}

/// One unit of the implementation structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureComponent {
    pub component: String,
    pub full_name: String,
    pub level: String,
    pub head: String,
    pub composition: String,
}

impl FromRow for StructureComponent {
    const REQUIRED: &'static [Column] = &[columns::COMPONENT];

    fn from_row(row: &CanonicalRow) -> Self {
        Self {
            component: row.text(&columns::COMPONENT),
            full_name: row.text(&columns::FULL_NAME),
            level: row.text(&columns::LEVEL),
            head: row.text(&columns::HEAD),
            composition: row.text(&columns::COMPOSITION),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Municipality {
    pub fma_id: String,
    pub region: String,
    pub province: String,
    pub municipality: String,
}

impl FromRow for Municipality {
    const REQUIRED: &'static [Column] = &[columns::FMA_ID, columns::MUNICIPALITY];

    fn from_row(row: &CanonicalRow) -> Self {
        Self {
            fma_id: row.text(&columns::FMA_ID),
            region: row.text(&columns::REGION),
            province: row.text(&columns::PROVINCE),
            municipality: row.text(&columns::MUNICIPALITY),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub title: String,
    pub date_conducted: String,
    pub location: String,
    pub resource_person: String,
    pub reference_doc: String,
}

impl Activity {
    /// Parsed `date_conducted`, if it is in a recognizable format
    pub fn date(&self) -> Option<NaiveDate> {
        parse_date(&self.date_conducted)
    }
}

impl FromRow for Activity {
    const REQUIRED: &'static [Column] = &[columns::ACTIVITY_TITLE, columns::DATE_CONDUCTED];

    fn from_row(row: &CanonicalRow) -> Self {
        Self {
            title: row.text(&columns::ACTIVITY_TITLE),
            date_conducted: row.text(&columns::DATE_CONDUCTED),
            location: row.text(&columns::LOCATION),
            resource_person: row.text(&columns::RESOURCE_PERSON),
            reference_doc: row.text(&columns::REFERENCE_DOC),
        }
    }
}

/// A person in one of the three directories. Columns a directory does not
/// have read as `""`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub given_name: String,
    pub middle_initial: String,
    pub last_name: String,
    pub position: String,
    pub email: String,
    pub component: String,
    pub office: String,
    pub employment_type: String,
    pub fma_lead: String,
}

impl DirectoryEntry {
    /// "Given M. Last", skipping empty parts
    pub fn full_name(&self) -> String {
        let middle = match self.middle_initial.trim_end_matches('.') {
            "" => String::new(),
            m => format!("{}.", m),
        };
        [self.given_name.as_str(), middle.as_str(), self.last_name.as_str()]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Office for external/NPMO entries, component for internal ones
    pub fn affiliation(&self) -> &str {
        if self.office.is_empty() {
            &self.component
        } else {
            &self.office
        }
    }
}

impl FromRow for DirectoryEntry {
    const REQUIRED: &'static [Column] = &[columns::GIVEN_NAME, columns::LAST_NAME];

    fn from_row(row: &CanonicalRow) -> Self {
        Self {
            given_name: row.text(&columns::GIVEN_NAME),
            middle_initial: row.text(&columns::MIDDLE_INITIAL),
            last_name: row.text(&columns::LAST_NAME),
            position: row.text(&columns::POSITION_DESIGNATION),
            email: row.text(&columns::EMAIL),
            component: row.text(&columns::COMPONENT),
            office: row.text(&columns::OFFICE),
            employment_type: row.text(&columns::EMPLOYMENT_TYPE),
            fma_lead: row.text(&columns::FMA_LEAD),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFile {
    pub title: String,
    pub url: String,
    pub category: String,
}

impl FromRow for ReferenceFile {
    const REQUIRED: &'static [Column] = &[columns::DOCUMENT_TITLE, columns::FILE_URL];

    fn from_row(row: &CanonicalRow) -> Self {
        Self {
            title: row.text(&columns::DOCUMENT_TITLE),
            url: row.text(&columns::FILE_URL),
            category: row.text(&columns::CATEGORY),
        }
    }
}

/// One measurement of the FMA 06 / FMA 09 comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileCharacteristic {
    pub key_characteristic: String,
    pub measurement: String,
    pub fma_06: String,
    pub fma_09: String,
}

impl FromRow for ProfileCharacteristic {
    const REQUIRED: &'static [Column] = &[columns::KEY_CHARACTERISTICS];

    fn from_row(row: &CanonicalRow) -> Self {
        Self {
            key_characteristic: row.text(&columns::KEY_CHARACTERISTICS),
            measurement: row.text(&columns::MEASUREMENT),
            fma_06: row.text(&columns::FMA_06),
            fma_09: row.text(&columns::FMA_09),
        }
    }
}

/// Parse the date formats seen in the activities sheet
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    const FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> SheetRow {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_canonical_header() {
        assert_eq!(canonical_header("Key Characteristics"), "KEY_CHARACTERISTICS");
        assert_eq!(canonical_header("  FMA 06 "), "FMA_06");
        assert_eq!(canonical_header("given-name"), "GIVEN_NAME");
        assert_eq!(canonical_header("E-mail  Address"), "E_MAIL_ADDRESS");
        assert_eq!(canonical_header("FMA__ID"), "FMA_ID");
        assert_eq!(canonical_header("EMAIL"), "EMAIL");
    }

    #[test]
    fn test_alias_fallback_order() {
        let canon = CanonicalRow::from_row(&row(&[("FMA6", "late"), ("FMA 06", "early")]));
        assert_eq!(canon.get(&columns::FMA_06), "early");

        let canon = CanonicalRow::from_row(&row(&[("FMA6", "only")]));
        assert_eq!(canon.get(&columns::FMA_06), "only");
    }

    #[test]
    fn test_adapt_profile_with_spaced_headers() {
        let rows = vec![row(&[
            ("Key Characteristics", "Area"),
            ("Measurement", "sq km"),
            ("FMA 06", " 1,200 "),
            ("FMA_09", "900"),
        ])];

        let profile: Vec<ProfileCharacteristic> = adapt("FMA_Profile", &rows).unwrap();

        assert_eq!(profile[0].key_characteristic, "Area");
        assert_eq!(profile[0].fma_06, "1,200");
        assert_eq!(profile[0].fma_09, "900");
    }

    #[test]
    fn test_adapt_missing_required_column_fails() {
        let rows = vec![row(&[("TITLE_OF_ACTIVITY", "x"), ("DATE_CONDUCTED", "2024-01-01")])];

        let err = adapt::<Activity>("Activities", &rows).unwrap_err();

        match err {
            SchemaError::MissingColumn { table, column } => {
                assert_eq!(table, "Activities");
                assert_eq!(column, "ACTIVITY_TITLE");
            }
        }
    }

    #[test]
    fn test_adapt_empty_sheet() {
        let entries: Vec<DirectoryEntry> = adapt("Internal_Directory", &[]).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_optional_columns_default_to_empty() {
        let rows = vec![row(&[("GIVEN_NAME", "Ann"), ("LAST_NAME", "Cruz")])];

        let entries: Vec<DirectoryEntry> = adapt("Internal_Directory", &rows).unwrap();

        assert_eq!(entries[0].email, "");
        assert_eq!(entries[0].full_name(), "Ann Cruz");
    }

    #[test]
    fn test_directory_full_name_and_affiliation() {
        let rows = vec![row(&[
            ("GIVEN_NAME", "Ann"),
            ("MIDDLE_INITIAL", "B."),
            ("LAST_NAME", "Cruz"),
            ("OFFICE", "BFAR"),
            ("COMPONENT", "Science"),
        ])];

        let entry = &adapt::<DirectoryEntry>("NPMO_Directory", &rows).unwrap()[0];

        assert_eq!(entry.full_name(), "Ann B. Cruz");
        assert_eq!(entry.affiliation(), "BFAR");
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_date("2024-03-05"), Some(expected));
        assert_eq!(parse_date("03/05/2024"), Some(expected));
        assert_eq!(parse_date("March 5, 2024"), Some(expected));
        assert_eq!(parse_date("Mar 5, 2024"), Some(expected));
        assert_eq!(parse_date("2024-03-05T08:00:00+08:00"), Some(expected));
        assert_eq!(parse_date("sometime"), None);
        assert_eq!(parse_date(""), None);
    }
}
