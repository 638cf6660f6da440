#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::join::MissingKeyPolicy;
use crate::core::normalize::KeyNormalization;
use crate::core::{ConfigProvider, JoinMode};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_required_field,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const API_KEY_ENV: &str = "GOOGLE_PLACES_API_KEY";
pub const DEFAULT_KEY_COLUMN: &str = "Business Name";
pub const DEFAULT_ENDPOINT: &str = "https://places.googleapis.com/v1/places:searchText";
pub const DEFAULT_PHOTO_BASE_URL: &str = "https://places.googleapis.com/v1";
pub const DEFAULT_FIELD_MASK: &str = "places.rating,places.userRatingCount,places.photos";
pub const MAX_CONCURRENT_REQUESTS: usize = 32;

/// Settings for the remote place search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    pub endpoint: String,
    pub photo_base_url: String,
    pub field_mask: String,
    pub photo_max_width: u32,
    pub timeout_seconds: Option<u64>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            photo_base_url: DEFAULT_PHOTO_BASE_URL.to_string(),
            field_mask: DEFAULT_FIELD_MASK.to_string(),
            photo_max_width: 400,
            timeout_seconds: Some(30),
            api_key: None,
        }
    }
}

impl PlacesConfig {
    /// Fills the credential from the environment unless already set.
    pub fn with_env_api_key(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var(API_KEY_ENV).ok();
        }
        self
    }
}

impl Validate for PlacesConfig {
    fn validate(&self) -> Result<()> {
        let api_key = validate_required_field(API_KEY_ENV, &self.api_key)?;
        validate_non_empty_string(API_KEY_ENV, api_key)?;
        if api_key.contains("${") {
            return Err(EtlError::InvalidConfigValueError {
                field: API_KEY_ENV.to_string(),
                value: api_key.clone(),
                reason: "unresolved environment variable".to_string(),
            });
        }
        validate_url("places.endpoint", &self.endpoint)?;
        validate_url("places.photo_base_url", &self.photo_base_url)?;
        validate_non_empty_string("places.field_mask", &self.field_mask)?;
        validate_range("places.photo_max_width", self.photo_max_width, 1, 4800)?;
        Ok(())
    }
}

/// Enrichment pipeline settings: the `[enrich]` table plus `[places]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    pub input_path: String,
    pub output_path: String,
    pub key_column: String,
    pub concurrent_requests: usize,
    pub request_delay_ms: u64,
    #[serde(skip)]
    pub places: PlacesConfig,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            input_path: "input.csv".to_string(),
            output_path: "output.csv".to_string(),
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            concurrent_requests: 1,
            request_delay_ms: 0,
            places: PlacesConfig::default(),
        }
    }
}

impl ConfigProvider for EnrichConfig {
    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn key_column(&self) -> &str {
        &self.key_column
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl Validate for EnrichConfig {
    fn validate(&self) -> Result<()> {
        self.places.validate()?;
        validate_path("enrich.input_path", &self.input_path)?;
        validate_path("enrich.output_path", &self.output_path)?;
        validate_non_empty_string("enrich.key_column", &self.key_column)?;
        validate_range(
            "enrich.concurrent_requests",
            self.concurrent_requests,
            1,
            MAX_CONCURRENT_REQUESTS,
        )?;
        Ok(())
    }
}

/// Merge utility settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    pub left_path: String,
    pub right_path: String,
    pub output_path: String,
    pub mode: JoinMode,
    pub key_column: String,
    pub key_normalization: KeyNormalization,
    pub missing_key: MissingKeyPolicy,
}

impl MergeConfig {
    pub fn new(
        left_path: impl Into<String>,
        right_path: impl Into<String>,
        output_path: impl Into<String>,
    ) -> Self {
        Self {
            left_path: left_path.into(),
            right_path: right_path.into(),
            output_path: output_path.into(),
            mode: JoinMode::default(),
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            key_normalization: KeyNormalization::default(),
            missing_key: MissingKeyPolicy::default(),
        }
    }

    pub fn with_mode(mut self, mode: JoinMode) -> Self {
        self.mode = mode;
        self
    }
}

impl Validate for MergeConfig {
    fn validate(&self) -> Result<()> {
        validate_path("file1", &self.left_path)?;
        validate_path("file2", &self.right_path)?;
        validate_path("output", &self.output_path)?;
        validate_non_empty_string("key_column", &self.key_column)?;
        Ok(())
    }
}
