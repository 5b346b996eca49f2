//! Client ⇄ Broker wire messages
//!
//! JSON with camelCase field names; masked elements travel as base64 strings.

use crate::errors::{ErrorCode, PsiError};
use crate::types::{MaskedElement, ServiceDescriptor};
use serde::{Deserialize, Serialize};

/// Masked client set plus the upstream operations to compare against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsiRequest {
    /// Client elements under the client's mask, in client order
    pub masked_client_elements: Vec<MaskedElement>,
    /// Upstream operations whose element sets the Broker should fetch
    pub descriptors: Vec<ServiceDescriptor>,
}

/// Broker reply carrying both masked sequences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsiResponse {
    /// The request's elements with the Broker mask added, same order and length
    pub double_masked_client_elements: Vec<MaskedElement>,
    /// Aggregator elements under the Broker mask
    pub masked_upstream_elements: Vec<MaskedElement>,
}

/// Error body returned by the Broker on failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Error kind
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
}

impl From<&PsiError> for Status {
    fn from(err: &PsiError) -> Self {
        Self {
            code: err.code(),
            message: err.message().to_string(),
        }
    }
}

impl From<Status> for PsiError {
    fn from(status: Status) -> Self {
        PsiError::from_code(status.code, status.message)
    }
}
