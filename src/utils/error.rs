use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Column '{column}' not found in {source_name}")]
    MissingColumnError { column: String, source_name: String },

    #[error("Lookup failed for '{query}': {message}")]
    LookupError { query: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingColumnError { .. } => ErrorCategory::Configuration,
            EtlError::ApiError(_) | EtlError::LookupError { .. } => ErrorCategory::Network,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. } => ErrorCategory::Data,
            EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Per-record lookup errors are downgraded to empty results; everything
    /// else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        self.category() == ErrorCategory::Network
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::MissingConfigError { field } => {
                format!("Set {} in the environment, a .env file or the config file", field)
            }
            EtlError::InvalidConfigValueError { field, .. } => {
                format!("Check the value of '{}' and try again", field)
            }
            EtlError::ConfigError { .. } => "Review the command line and config file".to_string(),
            EtlError::MissingColumnError { column, .. } => format!(
                "Make sure the input file has a header row containing '{}', or pass --key-column",
                column
            ),
            EtlError::ApiError(_) | EtlError::LookupError { .. } => {
                "Check network connectivity and that the API key is valid".to_string()
            }
            EtlError::CsvError(_) => "Make sure the input is valid comma-separated text".to_string(),
            EtlError::IoError(_) => "Check that the file paths exist and are writable".to_string(),
            EtlError::SerializationError(_) => {
                "The remote service returned an unexpected payload".to_string()
            }
            EtlError::ProcessingError { .. } => "Inspect the input data for malformed rows".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Remote lookup problem: {}", self),
            ErrorCategory::Data => format!("Data problem: {}", self),
            ErrorCategory::System => format!("System problem: {}", self),
        }
    }

    /// Process exit code for a fatal error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
