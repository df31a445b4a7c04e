use thiserror::Error;

#[derive(Error, Debug)]
pub enum RentalError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Notification channel error: {0}")]
    SocketError(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Authentication required, redirecting to {redirect}")]
    Unauthorized {
        redirect: String,
        from: Option<String>,
    },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("{kind} '{id}' not found")]
    NotFound { kind: String, id: String },

    #[error("Notification channel is not connected")]
    NotConnected,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Configuration,
    Validation,
    Storage,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RentalError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn unauthorized(from: Option<String>) -> Self {
        Self::Unauthorized {
            redirect: crate::LOGIN_ROUTE.to_string(),
            from,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::SocketError(_) | Self::HttpStatus { .. } | Self::NotConnected => {
                ErrorCategory::Network
            }
            Self::Unauthorized { .. } => ErrorCategory::Authentication,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::ValidationError { .. } | Self::EmptyCart => ErrorCategory::Validation,
            Self::IoError(_) => ErrorCategory::Storage,
            Self::CsvError(_) | Self::SerializationError(_) | Self::NotFound { .. } => {
                ErrorCategory::Data
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::EmptyCart | Self::NotFound { .. } => ErrorSeverity::Low,
            Self::ApiError(_)
            | Self::SocketError(_)
            | Self::HttpStatus { .. }
            | Self::NotConnected => ErrorSeverity::Medium,
            Self::Unauthorized { .. }
            | Self::ValidationError { .. }
            | Self::CsvError(_)
            | Self::SerializationError(_) => ErrorSeverity::High,
            Self::IoError(_)
            | Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::ApiError(_) | Self::HttpStatus { .. } => {
                "Check the API base URL and your network connection, then try again".to_string()
            }
            Self::SocketError(_) | Self::NotConnected => {
                "Check the notification channel URL; the client reconnects automatically".to_string()
            }
            Self::Unauthorized { redirect, .. } => {
                format!("Sign in again ({}) with `autopro auth login`", redirect)
            }
            Self::EmptyCart => "Add a car to the cart with `autopro cart add` first".to_string(),
            Self::NotFound { kind, .. } => format!("List available {} records and pick an existing id", kind),
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => {
                "Review the configuration file and command-line overrides".to_string()
            }
            Self::ValidationError { .. } => "Correct the highlighted input and retry".to_string(),
            Self::IoError(_) => "Check that the storage directory exists and is writable".to_string(),
            Self::CsvError(_) | Self::SerializationError(_) => {
                "The data is malformed; inspect the server response or the stored file".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(_) => "Could not reach the rental service".to_string(),
            Self::HttpStatus { status, .. } => format!("The rental service answered with status {}", status),
            Self::SocketError(_) => "The notification channel failed".to_string(),
            Self::NotConnected => "Not connected to the notification server".to_string(),
            Self::Unauthorized { .. } => "Your session has expired or you are not signed in".to_string(),
            Self::EmptyCart => "Your cart is empty".to_string(),
            Self::NotFound { kind, id } => format!("{} {} does not exist", kind, id),
            Self::ValidationError { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RentalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_points_to_login() {
        let err = RentalError::unauthorized(Some("/admin".to_string()));
        match &err {
            RentalError::Unauthorized { redirect, from } => {
                assert_eq!(redirect, "/login");
                assert_eq!(from.as_deref(), Some("/admin"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.category(), ErrorCategory::Authentication);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(RentalError::EmptyCart.severity() < RentalError::NotConnected.severity());
        assert!(
            RentalError::MissingConfigError {
                field: "api.base_url".to_string()
            }
            .severity()
                > RentalError::validation("bad").severity()
        );
    }
}
