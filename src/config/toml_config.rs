use crate::config::{EnrichConfig, PlacesConfig};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk configuration for the enrichment run.
///
/// ```toml
/// [enrich]
/// input_path = "input.csv"
/// output_path = "output.csv"
/// concurrent_requests = 4
/// request_delay_ms = 200
///
/// [places]
/// api_key = "${GOOGLE_PLACES_API_KEY}"
/// photo_max_width = 800
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub enrich: EnrichConfig,
    pub places: PlacesConfig,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unset variables are left
    /// as written so validation can report them.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn into_enrich_config(self) -> EnrichConfig {
        EnrichConfig {
            places: self.places,
            ..self.enrich
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.clone().into_enrich_config().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let toml_content = r#"
[enrich]
input_path = "businesses.csv"
concurrent_requests = 4

[places]
photo_max_width = 800
api_key = "abc"
"#;

        let config = TomlConfig::from_toml_str(toml_content)
            .unwrap()
            .into_enrich_config();

        assert_eq!(config.input_path, "businesses.csv");
        assert_eq!(config.output_path, "output.csv");
        assert_eq!(config.key_column, "Business Name");
        assert_eq!(config.concurrent_requests, 4);
        assert_eq!(config.places.photo_max_width, 800);
        assert_eq!(config.places.field_mask, crate::config::DEFAULT_FIELD_MASK);
        assert_eq!(config.places.api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PLACES_ENRICH_TEST_KEY", "from-env");

        let toml_content = r#"
[places]
api_key = "${PLACES_ENRICH_TEST_KEY}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.places.api_key.as_deref(), Some("from-env"));

        std::env::remove_var("PLACES_ENRICH_TEST_KEY");
    }

    #[test]
    fn test_unresolved_variable_fails_validation() {
        let toml_content = r#"
[places]
api_key = "${PLACES_ENRICH_UNSET_VARIABLE}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[enrich\ninput_path = 1").unwrap_err();
        assert!(matches!(err, EtlError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[enrich]\noutput_path = \"enriched.csv\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.enrich.output_path, "enriched.csv");
    }
}
