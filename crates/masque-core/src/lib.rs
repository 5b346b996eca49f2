//! Masque Core: shared vocabulary for the masking PSI protocol
//!
//! This crate holds everything the Client, the Broker and the transport layer
//! agree on: the data model ([`Element`], [`MaskedElement`],
//! [`ServiceDescriptor`]), the Client ⇄ Broker wire messages, the single
//! [`PsiError`] type with its status codes, the effect traits through which the
//! orchestration layer reaches the outside world, and configuration.
//!
//! ## Core Components
//!
//! - **Types**: elements and service descriptors
//! - **Messages**: [`PsiRequest`] / [`PsiResponse`] and the error [`Status`] body
//! - **Effects**: [`Aggregator`] and [`Broker`] traits
//! - **Config**: [`BrokerConfig`] and [`ClientConfig`]

pub mod config;
pub mod effects;
pub mod errors;
pub mod messages;
pub mod types;

pub use config::{BrokerConfig, ClientConfig, ConfigError};
pub use effects::{Aggregator, Broker};
pub use errors::{ErrorCode, PsiError, Result};
pub use messages::{PsiRequest, PsiResponse, Status};
pub use types::{validate_descriptors, Element, MaskedElement, ServiceDescriptor};
