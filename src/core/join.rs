//! Relational join of two tables on a normalized key column.

use crate::core::normalize::{KeyNormalization, NormalizeKey};
use crate::domain::model::{JoinMode, Record, Table};
use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// What to do with a row whose key cell is missing or normalizes to "".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingKeyPolicy {
    /// Drop the row with a warning.
    #[default]
    Skip,
    /// Keep the row under the empty key; empty keys match each other.
    EmptyKey,
}

impl MissingKeyPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingKeyPolicy::Skip => "skip",
            MissingKeyPolicy::EmptyKey => "empty-key",
        }
    }
}

impl fmt::Display for MissingKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingKeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "skip" => Ok(MissingKeyPolicy::Skip),
            "empty-key" => Ok(MissingKeyPolicy::EmptyKey),
            other => Err(format!(
                "invalid missing-key policy '{}', expected one of: skip, empty-key",
                other
            )),
        }
    }
}

pub struct JoinEngine {
    key_column: String,
    mode: JoinMode,
    normalizer: Box<dyn NormalizeKey>,
    missing_key: MissingKeyPolicy,
}

/// Row position in its source table paired with its join key.
type KeyedRow = (usize, String);

impl JoinEngine {
    pub fn new(key_column: impl Into<String>, mode: JoinMode) -> Self {
        Self {
            key_column: key_column.into(),
            mode,
            normalizer: Box::new(KeyNormalization::default()),
            missing_key: MissingKeyPolicy::default(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: impl NormalizeKey + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    pub fn with_missing_key_policy(mut self, policy: MissingKeyPolicy) -> Self {
        self.missing_key = policy;
        self
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn mode(&self) -> JoinMode {
        self.mode
    }

    /// Fails before producing any row when either table lacks the key column.
    pub fn check_key_column(&self, table: &Table, source_name: &str) -> Result<()> {
        if table.has_column(&self.key_column) {
            Ok(())
        } else {
            Err(EtlError::MissingColumnError {
                column: self.key_column.clone(),
                source_name: source_name.to_string(),
            })
        }
    }

    pub fn join(&self, left: &Table, right: &Table) -> Result<Table> {
        self.check_key_column(left, "left table")?;
        self.check_key_column(right, "right table")?;

        let left_keys = self.keyed_rows(left, "left");
        let right_keys = self.keyed_rows(right, "right");

        let header: Vec<String> = left
            .header()
            .iter()
            .chain(right.header())
            .cloned()
            .collect();
        // Dedupe (the key column appears in both) before rendering rows.
        let header = Table::with_header(header, Vec::new()).header().to_vec();

        let lefts = left.records();
        let rights = right.records();
        let mut rows = Vec::new();

        if self.mode == JoinMode::Right {
            let left_index = index_by_key(&left_keys);
            for (ri, key) in &right_keys {
                match left_index.get(key.as_str()) {
                    Some(matches) => rows.extend(
                        matches
                            .iter()
                            .map(|&li| self.merge_row(&header, Some(&lefts[li]), Some(&rights[*ri]))),
                    ),
                    None => rows.push(self.merge_row(&header, None, Some(&rights[*ri]))),
                }
            }
        } else {
            let right_index = index_by_key(&right_keys);
            let mut matched_right = HashSet::new();
            for (li, key) in &left_keys {
                match right_index.get(key.as_str()) {
                    Some(matches) => {
                        for &ri in matches {
                            matched_right.insert(ri);
                            rows.push(self.merge_row(&header, Some(&lefts[*li]), Some(&rights[ri])));
                        }
                    }
                    None if self.mode.keeps_unmatched_left() => {
                        rows.push(self.merge_row(&header, Some(&lefts[*li]), None));
                    }
                    None => {}
                }
            }

            if self.mode.keeps_unmatched_right() {
                for (ri, _) in &right_keys {
                    if !matched_right.contains(ri) {
                        rows.push(self.merge_row(&header, None, Some(&rights[*ri])));
                    }
                }
            }
        }

        tracing::debug!(
            "{} join produced {} rows from {} left and {} right rows",
            self.mode,
            rows.len(),
            left.len(),
            right.len()
        );

        Ok(Table::with_header(header, rows))
    }

    fn keyed_rows(&self, table: &Table, side: &str) -> Vec<KeyedRow> {
        let mut keyed = Vec::with_capacity(table.len());
        for (index, record) in table.records().iter().enumerate() {
            let key = record
                .get(&self.key_column)
                .map(|raw| self.normalizer.normalize(raw));

            match (key, self.missing_key) {
                (Some(key), _) if !key.is_empty() => keyed.push((index, key)),
                (_, MissingKeyPolicy::EmptyKey) => keyed.push((index, String::new())),
                (_, MissingKeyPolicy::Skip) => {
                    tracing::warn!(
                        "Skipping {} row {}: no value for '{}'",
                        side,
                        index + 1,
                        self.key_column
                    );
                }
            }
        }
        keyed
    }

    /// Right-hand values win on collisions, except for the key column which
    /// comes from the left row when there is one.
    fn merge_row(&self, header: &[String], left: Option<&Record>, right: Option<&Record>) -> Record {
        header
            .iter()
            .map(|column| {
                let left_value = left.and_then(|r| r.get(column));
                let right_value = right.and_then(|r| r.get(column));
                let value = if *column == self.key_column {
                    left_value.or(right_value)
                } else {
                    right_value.or(left_value)
                };
                (column.clone(), value.unwrap_or("").to_string())
            })
            .collect()
    }
}

fn index_by_key(rows: &[KeyedRow]) -> HashMap<&str, Vec<usize>> {
    let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (position, key) in rows {
        index.entry(key.as_str()).or_default().push(*position);
    }
    index
}
