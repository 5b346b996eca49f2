//! Effect traits for the orchestration layer
//!
//! Orchestration code never opens sockets itself. It reaches the Aggregator
//! and the Broker through these traits, so production code plugs in HTTP
//! handlers and tests plug in in-memory stubs.

use crate::errors::Result;
use crate::messages::{PsiRequest, PsiResponse};
use crate::types::{Element, ServiceDescriptor};
use async_trait::async_trait;
use std::sync::Arc;

/// Resolves named upstream operations to their plaintext element sets
#[async_trait]
pub trait Aggregator: Send + Sync {
    /// Fetch the union of elements the named operations expose
    ///
    /// Unknown services or operations fail with `InvalidArgument`; anything
    /// else that goes wrong is `Internal` (or `Cancelled` on timeout).
    async fn fetch(&self, descriptors: &[ServiceDescriptor]) -> Result<Vec<Element>>;
}

/// The single Broker RPC
#[async_trait]
pub trait Broker: Send + Sync {
    /// Add the Broker mask to the client set and return it alongside the
    /// masked upstream set
    async fn compute_masked(&self, request: PsiRequest) -> Result<PsiResponse>;
}

#[async_trait]
impl<A: Aggregator + ?Sized> Aggregator for Arc<A> {
    async fn fetch(&self, descriptors: &[ServiceDescriptor]) -> Result<Vec<Element>> {
        (**self).fetch(descriptors).await
    }
}

#[async_trait]
impl<B: Broker + ?Sized> Broker for Arc<B> {
    async fn compute_masked(&self, request: PsiRequest) -> Result<PsiResponse> {
        (**self).compute_masked(request).await
    }
}
