use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Registry request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Registry returned HTTP {status} for {url}")]
    RegistryStatusError { status: u16, url: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Projection error: {0}")]
    ProjError(#[from] proj4rs::errors::Error),

    #[error("Invalid projection definition for {id}: {reason}")]
    InvalidProjectionDefinition { id: String, reason: String },

    #[error("Unknown projection: {id}")]
    UnknownProjection { id: String },

    #[error("No usable registry result for hint '{hint}'")]
    NotFound { hint: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

pub type Result<T> = std::result::Result<T, ResolverError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Projection,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ResolverError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ResolverError::ApiError(_) | ResolverError::RegistryStatusError { .. } => {
                ErrorCategory::Network
            }
            ResolverError::SerializationError(_)
            | ResolverError::NotFound { .. }
            | ResolverError::ValidationError { .. } => ErrorCategory::Data,
            ResolverError::ProjError(_)
            | ResolverError::InvalidProjectionDefinition { .. }
            | ResolverError::UnknownProjection { .. } => ErrorCategory::Projection,
            ResolverError::ConfigError { .. }
            | ResolverError::ConfigValidationError { .. }
            | ResolverError::InvalidConfigValueError { .. }
            | ResolverError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ResolverError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Data => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Projection => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Network and projection problems are recovered by falling back to the default view.
    pub fn is_recoverable(&self) -> bool {
        self.severity() <= ErrorSeverity::Medium
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ResolverError::ApiError(e) if e.is_timeout() => {
                "The projection registry did not answer in time".to_string()
            }
            ResolverError::ApiError(_) | ResolverError::RegistryStatusError { .. } => {
                "Could not reach the projection registry".to_string()
            }
            ResolverError::SerializationError(_) => {
                "The projection registry returned an unreadable answer".to_string()
            }
            ResolverError::NotFound { hint } => {
                format!("Nothing usable found for '{}'", hint)
            }
            ResolverError::ProjError(_)
            | ResolverError::InvalidProjectionDefinition { .. }
            | ResolverError::UnknownProjection { .. } => {
                "The projection definition could not be used".to_string()
            }
            ResolverError::ConfigError { message } => format!("Configuration problem: {}", message),
            ResolverError::ConfigValidationError { field, .. }
            | ResolverError::InvalidConfigValueError { field, .. }
            | ResolverError::MissingConfigError { field } => {
                format!("Configuration field '{}' is invalid", field)
            }
            ResolverError::ValidationError { message } => message.clone(),
            ResolverError::IoError(e) => format!("File system error: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the network connection and the registry endpoint",
            ErrorCategory::Data => "Try a different EPSG code or search term",
            ErrorCategory::Projection => "Pick another CRS; this definition is not supported",
            ErrorCategory::Configuration => "Fix the command line arguments or the TOML config file",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_category() {
        let not_found = ResolverError::NotFound {
            hint: "999999".to_string(),
        };
        assert_eq!(not_found.category(), ErrorCategory::Data);
        assert_eq!(not_found.severity(), ErrorSeverity::Low);
        assert!(not_found.is_recoverable());

        let config = ResolverError::MissingConfigError {
            field: "registry.endpoint".to_string(),
        };
        assert_eq!(config.severity(), ErrorSeverity::High);
        assert!(!config.is_recoverable());
    }

    #[test]
    fn test_user_friendly_message_names_the_hint() {
        let err = ResolverError::NotFound {
            hint: "25832".to_string(),
        };
        assert!(err.user_friendly_message().contains("25832"));
    }
}
