use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{service} API error ({status}): {body}")]
    ApiError {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Telegram API error: {description}")]
    TelegramError { description: String },

    #[error("{setting} is not configured")]
    NotConfigured { setting: &'static str },
}

// reqwest includes the request URL in its Display output, and Telegram URLs
// carry the bot token.
impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::Http(err.without_url())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Upstream,
    Data,
}

impl RelayError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RelayError::MissingConfigError { .. }
            | RelayError::InvalidConfigValueError { .. }
            | RelayError::NotConfigured { .. } => ErrorCategory::Configuration,
            RelayError::Http(e) if e.is_decode() => ErrorCategory::Data,
            RelayError::Http(_) => ErrorCategory::Network,
            RelayError::ApiError { .. } | RelayError::TelegramError { .. } => {
                ErrorCategory::Upstream
            }
            RelayError::SerializationError(_) => ErrorCategory::Data,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RelayError::Http(e) if e.is_timeout())
    }

    /// Message shown to the chat user. Transport failures get plain wording,
    /// everything else is its `Display` form.
    pub fn user_friendly_message(&self) -> String {
        match self {
            RelayError::Http(e) if e.is_timeout() => {
                "the request timed out before the service answered".to_string()
            }
            RelayError::Http(e) if e.is_connect() => "could not reach the service".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
