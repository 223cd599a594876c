//! Application error type.
//!
//! Every failure carries the process exit code it maps to:
//!
//! - `2`: configuration, usage, or filesystem setup problems
//! - `3`: no usable input data for a stage
//! - `4`: fetch or numerical failures

use thiserror::Error;

#[derive(Clone, Error)]
#[error("{message}")]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_bare_message() {
        let err = AppError::new(3, "No raw CSV files found.");
        assert_eq!(err.to_string(), "No raw CSV files found.");
        assert_eq!(err.exit_code(), 3);
    }
}
