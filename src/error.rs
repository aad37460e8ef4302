// Netw client error types
use thiserror::Error;

/// Errors surfaced by the session client and the typed API.
///
/// The store catches all of these at its action boundary and records
/// [`NetwError::user_message`] instead of propagating them.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NetwError {
    // Bad credentials, rejected refresh, missing app credentials
    #[error("Authentication failed: {0}")]
    Auth(String),

    // Refresh-and-retry exhausted; caller must send the user back to login
    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NetwError {
    pub fn auth(message: impl Into<String>) -> Self {
        NetwError::Auth(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        NetwError::Network(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        NetwError::NotFound(message.into())
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        NetwError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        NetwError::Decode(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        NetwError::Storage(message.into())
    }

    /// Stable code for JSON output and log fields
    pub fn error_code(&self) -> &'static str {
        match self {
            NetwError::Auth(_) => "AUTH_ERROR",
            NetwError::SessionExpired => "SESSION_EXPIRED",
            NetwError::Network(_) => "NETWORK_ERROR",
            NetwError::NotFound(_) => "NOT_FOUND",
            NetwError::Api { .. } => "API_ERROR",
            NetwError::Decode(_) => "DECODE_ERROR",
            NetwError::Storage(_) => "STORAGE_ERROR",
            NetwError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Message suitable for display in the console
    pub fn user_message(&self) -> String {
        match self {
            NetwError::Auth(msg) => format!("Authentication failed: {}", msg),
            NetwError::SessionExpired => "Session expired, please log in again".to_string(),
            NetwError::Network(_) => "Unable to reach the Netw API".to_string(),
            NetwError::NotFound(what) => format!("{} not found", what),
            NetwError::Api { message, .. } => message.clone(),
            NetwError::Decode(_) => "The Netw API returned an unexpected response".to_string(),
            NetwError::Storage(msg) => format!("Unable to access stored credentials: {}", msg),
            NetwError::Config(msg) => msg.clone(),
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, NetwError::SessionExpired)
    }
}

impl From<serde_json::Error> for NetwError {
    fn from(err: serde_json::Error) -> Self {
        NetwError::Decode(err.to_string())
    }
}

pub type NetwResult<T> = Result<T, NetwError>;
