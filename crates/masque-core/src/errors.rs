//! Unified error system for Masque
//!
//! Every failure in a PSI run is one of three kinds. The kind travels with the
//! error across the Client ⇄ Broker boundary as an [`ErrorCode`], so a caller
//! can tell a rejected descriptor apart from a broken Aggregator.
//!
//! Messages never carry plaintext or masked elements.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error type for all Masque operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum PsiError {
    /// Malformed or empty service descriptors, or an unknown service/operation
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message describing the invalid input
        message: String,
    },

    /// Key generation failure, unreachable or non-conforming Aggregator
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal failure
        message: String,
    },

    /// The inbound call was cancelled or timed out before completion
    #[error("Cancelled: {message}")]
    Cancelled {
        /// Error message describing what was cancelled
        message: String,
    },
}

impl PsiError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a cancelled error
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled {
            message: message.into(),
        }
    }

    /// Status code of this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::Internal { .. } => ErrorCode::Internal,
            Self::Cancelled { .. } => ErrorCode::Cancelled,
        }
    }

    /// Error message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument { message }
            | Self::Internal { message }
            | Self::Cancelled { message } => message,
        }
    }

    /// Rebuild an error from a wire status code and message
    pub fn from_code(code: ErrorCode, message: impl Into<String>) -> Self {
        match code {
            ErrorCode::InvalidArgument => Self::invalid_argument(message),
            ErrorCode::Internal => Self::internal(message),
            ErrorCode::Cancelled => Self::cancelled(message),
        }
    }
}

/// RPC status-style error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Caller supplied bad input
    InvalidArgument,
    /// Server-side failure
    Internal,
    /// Call cancelled or timed out
    Cancelled,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::Internal => "INTERNAL",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(name)
    }
}

/// Standard Result type for Masque operations
pub type Result<T> = std::result::Result<T, PsiError>;
