use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maps a raw key cell to the value rows are matched on. Must be pure; the
/// same normalizer is applied to both tables of a merge.
pub trait NormalizeKey: Send + Sync {
    fn normalize(&self, raw: &str) -> String;
}

impl<F> NormalizeKey for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn normalize(&self, raw: &str) -> String {
        self(raw)
    }
}

/// Built-in key policies. `Exact` (identity) is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyNormalization {
    #[default]
    Exact,
    Trim,
    /// Trims, collapses inner whitespace runs and lowercases.
    CaseInsensitive,
}

impl KeyNormalization {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyNormalization::Exact => "exact",
            KeyNormalization::Trim => "trim",
            KeyNormalization::CaseInsensitive => "case-insensitive",
        }
    }
}

impl NormalizeKey for KeyNormalization {
    fn normalize(&self, raw: &str) -> String {
        match self {
            KeyNormalization::Exact => raw.to_string(),
            KeyNormalization::Trim => raw.trim().to_string(),
            KeyNormalization::CaseInsensitive => raw
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase(),
        }
    }
}

impl fmt::Display for KeyNormalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyNormalization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(KeyNormalization::Exact),
            "trim" => Ok(KeyNormalization::Trim),
            "case-insensitive" => Ok(KeyNormalization::CaseInsensitive),
            other => Err(format!(
                "invalid key normalization '{}', expected one of: exact, trim, case-insensitive",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_is_identity() {
        assert_eq!(KeyNormalization::Exact.normalize("  Joe's Cafe "), "  Joe's Cafe ");
        assert_eq!(KeyNormalization::default(), KeyNormalization::Exact);
    }

    #[test]
    fn test_case_insensitive_folds_case_and_whitespace() {
        let n = KeyNormalization::CaseInsensitive;
        assert_eq!(n.normalize("  Joe's   CAFE\t"), "joe's cafe");
        assert_eq!(n.normalize("Joe's Cafe"), n.normalize("joe's  cafe "));
    }

    #[test]
    fn test_trim_keeps_case() {
        assert_eq!(KeyNormalization::Trim.normalize(" Cafe  A "), "Cafe  A");
    }

    #[test]
    fn test_closures_are_normalizers() {
        let strip_suffix = |raw: &str| raw.trim_end_matches(" LLC").to_string();
        assert_eq!(strip_suffix.normalize("Acme LLC"), "Acme");
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!(
            "case-insensitive".parse::<KeyNormalization>().unwrap(),
            KeyNormalization::CaseInsensitive
        );
        assert!("fuzzy".parse::<KeyNormalization>().is_err());
    }
}
