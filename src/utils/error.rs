use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned HTTP {status}: {body}")]
    ApiStatusError { status: u16, body: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Order data error: {message}")]
    DataError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AnalyticsError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AnalyticsError::ApiError(_) | AnalyticsError::ApiStatusError { .. } => {
                ErrorCategory::Network
            }
            AnalyticsError::ConfigError { .. }
            | AnalyticsError::MissingConfigError { .. }
            | AnalyticsError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            AnalyticsError::CsvError(_)
            | AnalyticsError::SerializationError(_)
            | AnalyticsError::DataError { .. } => ErrorCategory::Data,
            AnalyticsError::ZipError(_)
            | AnalyticsError::IoError(_)
            | AnalyticsError::StorageError { .. } => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路錯誤通常重試即可
            AnalyticsError::ApiError(_) => ErrorSeverity::Medium,
            AnalyticsError::ApiStatusError { status, .. } if *status >= 500 => {
                ErrorSeverity::Medium
            }
            AnalyticsError::ApiStatusError { .. } => ErrorSeverity::High,
            AnalyticsError::ConfigError { .. }
            | AnalyticsError::MissingConfigError { .. }
            | AnalyticsError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            AnalyticsError::CsvError(_)
            | AnalyticsError::SerializationError(_)
            | AnalyticsError::DataError { .. } => ErrorSeverity::High,
            AnalyticsError::ZipError(_)
            | AnalyticsError::IoError(_)
            | AnalyticsError::StorageError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AnalyticsError::ApiError(_) => {
                "Check network connectivity and that the orders endpoint is reachable"
            }
            AnalyticsError::ApiStatusError { status: 401 | 403, .. } => {
                "Check the API key (--api-key or source.api_key)"
            }
            AnalyticsError::ApiStatusError { .. } => {
                "Check the orders endpoint URL and the query parameters it accepts"
            }
            AnalyticsError::MissingConfigError { .. } => {
                "Provide the missing value on the command line or in the TOML config"
            }
            AnalyticsError::ConfigError { .. } | AnalyticsError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again"
            }
            AnalyticsError::CsvError(_)
            | AnalyticsError::SerializationError(_)
            | AnalyticsError::DataError { .. } => {
                "Make sure the orders payload is a JSON array of order rows"
            }
            AnalyticsError::ZipError(_)
            | AnalyticsError::IoError(_)
            | AnalyticsError::StorageError { .. } => {
                "Check that the output path exists and is writable"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not fetch orders: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Data => format!("Could not process order data: {}", self),
            ErrorCategory::Storage => format!("Could not write the sales report: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_errors_are_retryable() {
        let err = AnalyticsError::ApiStatusError {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let err = AnalyticsError::ApiStatusError {
            status: 401,
            body: "bad key".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("API key"));
    }

    #[test]
    fn test_config_error_message() {
        let err = AnalyticsError::MissingConfigError {
            field: "seller_id".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.user_friendly_message().contains("seller_id"));
    }
}
