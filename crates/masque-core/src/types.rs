//! Protocol data model
//!
//! Elements are opaque byte sequences. They are deliberately not `Display` and
//! their `Debug` output shows only the length, so a stray log line cannot leak
//! an identifier.

use crate::errors::{PsiError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One identifier from a party's private set
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Element(Vec<u8>);

impl Element {
    /// Wrap raw bytes as an element
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Borrow the element bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the element, returning its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the element has no bytes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Element(<{} bytes>)", self.0.len())
    }
}

impl AsRef<[u8]> for Element {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Element {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Element {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<String> for Element {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl From<&str> for Element {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

/// An element after one or more mask layers
///
/// Same length as the element it came from. Serialized as a standard base64
/// string.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct MaskedElement(Vec<u8>);

impl MaskedElement {
    /// Wrap masked bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Borrow the masked bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Mutable access for in-place masking
    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.0
    }

    /// Consume, returning the masked bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no bytes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for MaskedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MaskedElement(<{} bytes>)", self.0.len())
    }
}

impl AsRef<[u8]> for MaskedElement {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for MaskedElement {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Serialize for MaskedElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for MaskedElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Self)
            .map_err(|e| de::Error::custom(format!("invalid base64 element: {e}")))
    }
}

/// Names one upstream operation whose element set should be fetched
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescriptor {
    /// Upstream service name
    pub service_name: String,
    /// Operation exposed by that service
    pub operation_name: String,
}

impl ServiceDescriptor {
    /// Create a descriptor
    pub fn new(service_name: impl Into<String>, operation_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            operation_name: operation_name.into(),
        }
    }

    /// Check that both names are present and free of whitespace
    pub fn validate(&self) -> Result<()> {
        check_name("service name", &self.service_name)?;
        check_name("operation name", &self.operation_name)
    }

    /// `[serviceName, operationName]` pair as sent to the Aggregator
    pub fn as_pair(&self) -> [&str; 2] {
        [&self.service_name, &self.operation_name]
    }
}

fn check_name(what: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(PsiError::invalid_argument(format!("empty {what}")));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(PsiError::invalid_argument(format!(
            "{what} '{name}' contains whitespace"
        )));
    }
    Ok(())
}

/// Validate a descriptor list before any external call is made
///
/// The list must be non-empty and every descriptor well-formed.
pub fn validate_descriptors(descriptors: &[ServiceDescriptor]) -> Result<()> {
    if descriptors.is_empty() {
        return Err(PsiError::invalid_argument(
            "at least one service descriptor is required",
        ));
    }
    for (index, descriptor) in descriptors.iter().enumerate() {
        descriptor.validate().map_err(|e| {
            PsiError::invalid_argument(format!("descriptor {index}: {}", e.message()))
        })?;
    }
    Ok(())
}
