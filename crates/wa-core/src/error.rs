use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct AutomationError {
    pub code: String,
    pub message: String,
}

impl AutomationError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_code_and_message() {
        let error = AutomationError::new("ENGINE_NOT_WAITING", "Not waiting for user input.");
        assert_eq!(
            error.to_string(),
            "ENGINE_NOT_WAITING: Not waiting for user input."
        );
    }
}
