use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// One row: column name → text value, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == column)
    }

    /// Replaces the value in place when the column exists, appends otherwise.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.set(column, value);
        }
        record
    }
}

/// Ordered records plus the header derived from them.
///
/// The header is the union of every record's columns in first-seen order.
/// Records may be ragged; missing cells read as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    header: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    pub fn new(records: Vec<Record>) -> Self {
        Self::with_header(Vec::new(), records)
    }

    /// Starts the header from `columns` (e.g. a file's header row, which is
    /// authoritative even when there are no data rows) and extends it with
    /// any further columns the records carry.
    pub fn with_header(columns: Vec<String>, records: Vec<Record>) -> Self {
        let mut header = Vec::new();
        let mut seen = HashSet::new();
        let record_columns = records.iter().flat_map(|r| r.columns().map(str::to_string));
        for column in columns.into_iter().chain(record_columns) {
            if seen.insert(column.clone()) {
                header.push(column);
            }
        }
        Self { header, records }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.header.iter().any(|c| c == column)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Cell lookup with padding semantics: a column the row lacks is "".
    pub fn value(&self, row: usize, column: &str) -> &str {
        self.records
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or("")
    }

    /// Row values aligned to the header, padded with empty strings.
    pub fn padded_rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        self.records.iter().map(move |record| {
            self.header
                .iter()
                .map(|column| record.get(column).unwrap_or(""))
                .collect()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub url: String,
    pub attribution: String,
}

/// Parsed lookup response for one business name. `PlaceResult::default()`
/// is the empty result used for any failed or skipped lookup.
///
/// `rating` keeps the number as the service wrote it, so `5` and `4.0`
/// render unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    pub review_count: Option<u64>,
    pub rating: Option<serde_json::Number>,
    pub photos: Vec<Photo>,
}

impl PlaceResult {
    pub fn is_empty(&self) -> bool {
        self.review_count.is_none() && self.rating.is_none() && self.photos.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinMode {
    #[default]
    Inner,
    Left,
    Right,
    Outer,
}

impl JoinMode {
    pub const ALL: [JoinMode; 4] = [JoinMode::Inner, JoinMode::Left, JoinMode::Right, JoinMode::Outer];

    pub fn as_str(&self) -> &'static str {
        match self {
            JoinMode::Inner => "inner",
            JoinMode::Left => "left",
            JoinMode::Right => "right",
            JoinMode::Outer => "outer",
        }
    }

    pub(crate) fn keeps_unmatched_left(&self) -> bool {
        matches!(self, JoinMode::Left | JoinMode::Outer)
    }

    pub(crate) fn keeps_unmatched_right(&self) -> bool {
        matches!(self, JoinMode::Right | JoinMode::Outer)
    }
}

impl fmt::Display for JoinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JoinMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JoinMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "invalid join mode '{}', expected one of: inner, left, right, outer",
                    s
                )
            })
    }
}
