//! Masque Testing Infrastructure
//!
//! Common stubs and fixtures so protocol, transport and binary tests do not
//! each grow their own fake Aggregator.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! masque-testkit = { workspace = true }
//! ```
//!
//! ```rust,no_run
//! use masque_testkit::*;
//!
//! # async fn demo() {
//! let aggregator = StubAggregator::returning(elements(&["Jane", "Charles"]));
//! // ... hand `aggregator` to a MaskingBroker
//! assert_eq!(aggregator.call_count(), 0);
//! # }
//! ```

pub mod aggregator;
pub mod fixtures;
pub mod http;
pub mod keys;

pub use aggregator::*;
pub use fixtures::*;
pub use http::*;
pub use keys::*;
