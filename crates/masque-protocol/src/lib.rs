//! Masque Protocol: the double-masking PSI run
//!
//! ```text
//! Client --(masked set, descriptors)--> Broker --(descriptors)--> Aggregator
//! Client <--(double-masked set, masked upstream set)-- Broker <--(plaintext)--
//! ```
//!
//! - [`intersection`] counts byte-equal elements between two sequences.
//! - [`broker`] is the stateless Broker call: validate, key, fetch, mask.
//! - [`client`] drives one run from a plaintext set to an intersection count.
//!
//! Neither orchestrator holds state between calls. Each generates its own
//! key inside the call and drops it before returning.

pub mod broker;
pub mod client;
pub mod intersection;

pub use broker::MaskingBroker;
pub use client::PsiClient;
pub use intersection::{intersect, matching};
