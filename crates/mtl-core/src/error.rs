//! Error types for formula, trace, and weakening operations

use thiserror::Error;

/// Main error type for `mtl-core` operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeakenError {
    #[error("Parse error at line {line}, column {column}: {message}")]
    ParseError {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Invalid path {path:?} at index {at}: no such child")]
    InvalidPath { path: Vec<usize>, at: usize },

    #[error("Invalid interval [{lo}, {hi:?}]: lower bound must be ≤ upper bound")]
    BadInterval { lo: u64, hi: Option<u64> },

    #[error("Cannot weaken a non-temporal node: {node}")]
    UnsupportedWeakenTarget { node: &'static str },

    #[error("Cannot directly weaken an unbounded {node}")]
    UnboundedDirectWeaken { node: &'static str },

    #[error("No loop could be identified in trace")]
    NoLoopDetected,
}

impl WeakenError {
    pub fn parse_error(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Whether the caller might retry with different inputs, as opposed to a
    /// structural defect in the formula/trace that can never succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::ParseError { .. } => false,
            Self::InvalidPath { .. } => false,
            Self::BadInterval { .. } => false,
            Self::UnsupportedWeakenTarget { .. } => false,
            Self::UnboundedDirectWeaken { .. } => false,
            Self::NoLoopDetected => true,
        }
    }
}

/// Result type for `mtl-core` operations
pub type WeakenResult<T> = Result<T, WeakenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = WeakenError::parse_error(10, 5, "unexpected token");
        match error {
            WeakenError::ParseError {
                line,
                column,
                message,
            } => {
                assert_eq!(line, 10);
                assert_eq!(column, 5);
                assert_eq!(message, "unexpected token");
            }
            _ => panic!("expected parse error"),
        }
    }

    #[test]
    fn test_error_recoverability() {
        assert!(!WeakenError::parse_error(1, 1, "test").is_recoverable());
        assert!(WeakenError::NoLoopDetected.is_recoverable());
        assert!(!WeakenError::UnboundedDirectWeaken { node: "Eventually" }.is_recoverable());
    }
}
