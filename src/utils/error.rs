use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Input file not found: {path}")]
    MissingInputError { path: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Scrape error: {message}")]
    ScrapeError { message: String },

    #[error("Template error: {message}")]
    TemplateError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    FileSystem,
    Data,
    Configuration,
    Template,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl SiteError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SiteError::HttpError(_) => ErrorCategory::Network,
            SiteError::IoError(_) | SiteError::ZipError(_) | SiteError::MissingInputError { .. } => {
                ErrorCategory::FileSystem
            }
            SiteError::CsvError(_)
            | SiteError::SerializationError(_)
            | SiteError::ScrapeError { .. }
            | SiteError::ProcessingError { .. }
            | SiteError::ValidationError { .. } => ErrorCategory::Data,
            SiteError::ConfigValidationError { .. }
            | SiteError::InvalidConfigValueError { .. }
            | SiteError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SiteError::TemplateError { .. } => ErrorCategory::Template,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Template => ErrorSeverity::High,
            ErrorCategory::FileSystem => match self {
                SiteError::MissingInputError { .. } => ErrorSeverity::High,
                _ => ErrorSeverity::Critical,
            },
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SiteError::HttpError(_) => {
                "Check network access to Enrollware and re-run; prices already cached are kept"
            }
            SiteError::MissingInputError { .. } => {
                "Run the earlier pipeline step first (fetch → scrape → site) or fix the path in site.toml"
            }
            SiteError::IoError(_) | SiteError::ZipError(_) => {
                "Check that the output directory exists and is writable"
            }
            SiteError::SerializationError(_) | SiteError::CsvError(_) => {
                "Regenerate schedule.json with the scrape command"
            }
            SiteError::ScrapeError { .. } => {
                "Open the snapshot and check that it still contains Enrollware enrpanel blocks or enroll?id= links"
            }
            SiteError::TemplateError { .. } => {
                "Make sure the template still contains its placeholder marker"
            }
            SiteError::ProcessingError { .. } | SiteError::ValidationError { .. } => {
                "Inspect schedule.json; re-running scrape rebuilds it from the snapshot"
            }
            SiteError::ConfigValidationError { .. }
            | SiteError::InvalidConfigValueError { .. }
            | SiteError::MissingConfigError { .. } => "Fix site.toml and try again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the remote site: {}", self),
            ErrorCategory::FileSystem => format!("File problem: {}", self),
            ErrorCategory::Data => format!("Schedule data problem: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Template => format!("Template problem: {}", self),
        }
    }

    /// Exit code the CLI uses for this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_is_high_severity() {
        let err = SiteError::MissingInputError {
            path: "docs/data/schedule.json".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::FileSystem);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
        assert!(err.user_friendly_message().contains("schedule.json"));
    }

    #[test]
    fn test_config_errors_are_critical() {
        let err = SiteError::MissingConfigError {
            field: "enrollware.base_url".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
    }
}
