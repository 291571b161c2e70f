use thiserror::Error;

/// Fallback message when a non-2xx response carries no `message` field.
pub const DEFAULT_API_ERROR_MESSAGE: &str = "API request failed";

/// Unified error type for the entire equipment-ledger-core library.
/// Every public function returns `Result<T, CoreError>`.
///
/// Foreign errors are flattened to strings on conversion, which keeps the
/// type `Clone` so one failure can be handed to every waiter of a shared lookup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    // ── API / Network ───────────────────────────────────────────────
    /// The server answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api { message: String, status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // ── Payloads ────────────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Local state ─────────────────────────────────────────────────
    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// Build an API error from a status code and an optional server message.
    pub fn api(status: u16, message: Option<String>) -> Self {
        CoreError::Api {
            message: message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_API_ERROR_MESSAGE.to_string()),
            status,
        }
    }

    /// HTTP status for API errors, `None` for every other failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            CoreError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text shown to the user where the failed view or form renders its error.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Strip query strings: request URLs may carry filter values we don't want in logs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
