use thiserror::Error;

#[derive(Error, Debug)]
pub enum DuplicatorError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    HttpStatusError { status: u16, body: String },

    #[error("GraphQL errors: {message}")]
    GraphQlError { message: String },

    #[error("Malformed API response: {message}")]
    MalformedResponseError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration file not found: {path}")]
    ConfigNotFoundError { path: String },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Workflow '{id}' not found")]
    WorkflowNotFoundError { id: String },

    #[error("Workflow '{id}' is disabled")]
    WorkflowDisabledError { id: String },

    #[error("Destination '{destination}' references unknown template '{template}'")]
    UnknownTemplateError {
        destination: String,
        template: String,
    },

    #[error("Item '{name}' not found in board {board_id}")]
    ItemNotFoundError { name: String, board_id: u64 },

    #[error("Aborted by user")]
    UserAbortError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Lookup,
    Transport,
    Io,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DuplicatorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_)
            | Self::HttpStatusError { .. }
            | Self::GraphQlError { .. }
            | Self::MalformedResponseError { .. } => ErrorCategory::Transport,
            Self::IoError(_) => ErrorCategory::Io,
            Self::SerializationError(_)
            | Self::ConfigError { .. }
            | Self::ConfigNotFoundError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::WorkflowNotFoundError { .. }
            | Self::WorkflowDisabledError { .. }
            | Self::UnknownTemplateError { .. } => ErrorCategory::Configuration,
            Self::ItemNotFoundError { .. } => ErrorCategory::Lookup,
            Self::UserAbortError => ErrorCategory::User,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::User => ErrorSeverity::Low,
            ErrorCategory::Transport => ErrorSeverity::Medium,
            ErrorCategory::Lookup | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    /// Whether the failure came from the remote API rather than local data.
    pub fn is_transport_fault(&self) -> bool {
        self.category() == ErrorCategory::Transport
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::ApiError(_) => "Check network connectivity and the API URL".to_string(),
            Self::HttpStatusError { status, .. } if *status == 401 || *status == 403 => {
                "Check that MONDAY_API_KEY is valid and has access to the boards".to_string()
            }
            Self::HttpStatusError { .. } => "Retry later or check the API status page".to_string(),
            Self::GraphQlError { .. } => {
                "Check board ids, group ids and column ids in the workflow configuration"
                    .to_string()
            }
            Self::MalformedResponseError { .. } => {
                "Check that the API URL points at the Monday v2 GraphQL endpoint".to_string()
            }
            Self::IoError(_) => "Check file permissions and available disk space".to_string(),
            Self::SerializationError(_) | Self::ConfigError { .. } => {
                "Fix the syntax of the workflow configuration file".to_string()
            }
            Self::ConfigNotFoundError { .. } => {
                "Create config/workflows.json from config/workflows.template.json".to_string()
            }
            Self::MissingConfigError { field } => format!("Provide a value for '{}'", field),
            Self::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}'", field)
            }
            Self::WorkflowNotFoundError { .. } => {
                "Run with --list to see the available workflow ids".to_string()
            }
            Self::WorkflowDisabledError { .. } => {
                "Set \"enabled\": true on the workflow to run it".to_string()
            }
            Self::UnknownTemplateError { template, .. } => {
                format!("Define template '{}' or fix the template key", template)
            }
            Self::ItemNotFoundError { .. } => {
                "Check the item name; matching is exact and case-sensitive".to_string()
            }
            Self::UserAbortError => "Run again when ready".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Lookup => format!("Lookup failed: {}", self),
            ErrorCategory::Transport => format!("Monday API call failed: {}", self),
            ErrorCategory::Io => format!("File system error: {}", self),
            ErrorCategory::User => self.to_string(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl From<toml::de::Error> for DuplicatorError {
    fn from(e: toml::de::Error) -> Self {
        DuplicatorError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, DuplicatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_errors_are_medium_severity() {
        let err = DuplicatorError::HttpStatusError {
            status: 500,
            body: "boom".to_string(),
        };
        assert!(err.is_transport_fault());
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_missing_item_is_lookup_failure() {
        let err = DuplicatorError::ItemNotFoundError {
            name: "Acme Corp".to_string(),
            board_id: 1,
        };
        assert_eq!(err.category(), ErrorCategory::Lookup);
        assert!(!err.is_transport_fault());
        assert!(err.user_friendly_message().contains("Acme Corp"));
    }

    #[test]
    fn test_auth_status_suggests_api_key() {
        let err = DuplicatorError::HttpStatusError {
            status: 401,
            body: String::new(),
        };
        assert!(err.recovery_suggestion().contains("MONDAY_API_KEY"));
    }
}
