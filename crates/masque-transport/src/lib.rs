//! Masque Transport: HTTP edges of the protocol
//!
//! - [`aggregator`]: [`HttpAggregator`], the Broker's JSON client for the
//!   Aggregator's `POST /PSI`
//! - [`broker_server`]: axum router exposing a Broker as `POST /psi`
//! - [`broker_client`]: [`HttpBroker`], the Client's side of that RPC
//! - [`intake`]: the client-facing multipart form server that parses a CSV
//!   upload and descriptor tokens and drives one PSI run
//!
//! Everything protocol-relevant lives in `masque-protocol`; this crate only
//! moves bytes and maps errors to and from HTTP.

pub mod aggregator;
pub mod broker_client;
pub mod broker_server;
pub mod intake;

pub use aggregator::HttpAggregator;
pub use broker_client::{broker_endpoint, HttpBroker};
pub use broker_server::{broker_router, BrokerServer};
pub use intake::{intake_router, IntakeError, IntakeForm, IntakeServer};
