use crate::config::toml_config::TomlConfig;
use crate::config::{EnrichConfig, MergeConfig};
use crate::core::join::MissingKeyPolicy;
use crate::core::normalize::KeyNormalization;
use crate::core::JoinMode;
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "places-enrich")]
#[command(about = "Enrich a CSV of business names with review counts, ratings and photos")]
pub struct EnrichCli {
    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Input CSV with a business-name column
    #[arg(short, long)]
    pub input: Option<String>,

    /// Output CSV path
    #[arg(short, long)]
    pub output: Option<String>,

    /// Column holding the business name
    #[arg(long)]
    pub key_column: Option<String>,

    /// Maximum lookups in flight (1 = sequential)
    #[arg(long)]
    pub concurrent_requests: Option<usize>,

    /// Pause before each lookup after the first, in milliseconds
    #[arg(long)]
    pub request_delay_ms: Option<u64>,

    /// Photo width requested from the media endpoint
    #[arg(long)]
    pub photo_max_width: Option<u32>,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl EnrichCli {
    /// File settings first, then flag overrides, then the credential from
    /// the environment when neither supplied one.
    pub fn into_config(self) -> Result<EnrichConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?.into_enrich_config(),
            None => EnrichConfig::default(),
        };

        if let Some(input) = self.input {
            config.input_path = input;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(key_column) = self.key_column {
            config.key_column = key_column;
        }
        if let Some(concurrent) = self.concurrent_requests {
            config.concurrent_requests = concurrent;
        }
        if let Some(delay) = self.request_delay_ms {
            config.request_delay_ms = delay;
        }
        if let Some(width) = self.photo_max_width {
            config.places.photo_max_width = width;
        }

        config.places = config.places.with_env_api_key();
        Ok(config)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "merge-csv")]
#[command(about = "Merge two CSV files based on the Business Name column")]
pub struct MergeCli {
    /// Path to the first CSV file
    pub file1: String,

    /// Path to the second CSV file
    pub file2: String,

    /// Path for the output merged CSV file
    pub output: String,

    /// Type of merge to perform
    #[arg(long, default_value_t = JoinMode::Inner)]
    pub merge_type: JoinMode,

    /// Column both files are joined on
    #[arg(long, default_value = crate::config::DEFAULT_KEY_COLUMN)]
    pub key_column: String,

    /// How key values are compared
    #[arg(long, default_value_t = KeyNormalization::Exact)]
    pub key_normalization: KeyNormalization,

    /// Rows with no key value: skip them or match them as an empty key
    #[arg(long, default_value_t = MissingKeyPolicy::Skip)]
    pub on_missing_key: MissingKeyPolicy,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl From<MergeCli> for MergeConfig {
    fn from(cli: MergeCli) -> Self {
        MergeConfig {
            left_path: cli.file1,
            right_path: cli.file2,
            output_path: cli.output,
            mode: cli.merge_type,
            key_column: cli.key_column,
            key_normalization: cli.key_normalization,
            missing_key: cli.on_missing_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_cli_defaults() {
        let cli = MergeCli::try_parse_from(["merge-csv", "a.csv", "b.csv", "out.csv"]).unwrap();
        let config = MergeConfig::from(cli);

        assert_eq!(config.mode, JoinMode::Inner);
        assert_eq!(config.key_column, "Business Name");
        assert_eq!(config.key_normalization, KeyNormalization::Exact);
        assert_eq!(config.missing_key, MissingKeyPolicy::Skip);
    }

    #[test]
    fn test_merge_cli_rejects_unknown_mode() {
        let result = MergeCli::try_parse_from([
            "merge-csv",
            "a.csv",
            "b.csv",
            "out.csv",
            "--merge-type",
            "cross",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_cli_options() {
        let cli = MergeCli::try_parse_from([
            "merge-csv",
            "a.csv",
            "b.csv",
            "out.csv",
            "--merge-type",
            "outer",
            "--key-normalization",
            "case-insensitive",
            "--on-missing-key",
            "empty-key",
        ])
        .unwrap();

        assert_eq!(cli.merge_type, JoinMode::Outer);
        assert_eq!(cli.key_normalization, KeyNormalization::CaseInsensitive);
        assert_eq!(cli.on_missing_key, MissingKeyPolicy::EmptyKey);
        assert_eq!(cli.log_format, LogFormat::Compact);
    }

    #[test]
    fn test_log_format_flag() {
        let cli =
            EnrichCli::try_parse_from(["places-enrich", "--log-format", "json", "-v"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(cli.verbose);

        let result = MergeCli::try_parse_from([
            "merge-csv",
            "a.csv",
            "b.csv",
            "out.csv",
            "--log-format",
            "pretty",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_enrich_cli_overrides() {
        let cli = EnrichCli::try_parse_from([
            "places-enrich",
            "--input",
            "shops.csv",
            "--concurrent-requests",
            "3",
            "--request-delay-ms",
            "250",
        ])
        .unwrap();

        let config = cli.into_config().unwrap();
        assert_eq!(config.input_path, "shops.csv");
        assert_eq!(config.output_path, "output.csv");
        assert_eq!(config.concurrent_requests, 3);
        assert_eq!(config.request_delay_ms, 250);
    }
}
