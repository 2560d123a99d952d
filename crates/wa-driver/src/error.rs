use thiserror::Error;
use wa_core::Locator;

/// Failures reported by the browser driver service or its transport. The
/// display text is what ends up in a command's result string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("element not found: {locator}")]
    ElementNotFound { locator: Locator },
    #[error("{status} - {body}")]
    Status { status: u16, body: String },
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },
    #[error("unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
    #[error("{0}")]
    Unsupported(String),
}

impl DriverError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. })
    }
}
