//! Broker orchestration
//!
//! The Broker turns a client-masked request into a response carrying two
//! sequences masked under one fresh Broker key:
//!
//! 1. validate the descriptor list (no external call on failure)
//! 2. generate the key (before any network traffic)
//! 3. fetch the upstream elements from the Aggregator, once
//! 4. mask the client sequence and the upstream sequence with the same key
//!
//! Any failure aborts the call; there is no partial response. The struct only
//! holds its collaborators, so one instance serves any number of concurrent
//! calls without locking.

use async_trait::async_trait;
use masque_core::{
    validate_descriptors, Aggregator, Broker, PsiRequest, PsiResponse, Result,
};
use masque_crypto::{KeySource, OsKeySource};
use tracing::{debug, warn};

/// Stateless Broker over an injected Aggregator and key source
#[derive(Debug, Clone)]
pub struct MaskingBroker<A, K = OsKeySource> {
    aggregator: A,
    keys: K,
}

impl<A: Aggregator> MaskingBroker<A> {
    /// Broker drawing keys from the operating system RNG
    pub fn new(aggregator: A) -> Self {
        Self::with_key_source(aggregator, OsKeySource)
    }
}

impl<A: Aggregator, K: KeySource> MaskingBroker<A, K> {
    /// Broker with an explicit key source
    pub fn with_key_source(aggregator: A, keys: K) -> Self {
        Self { aggregator, keys }
    }

    /// Run one Broker call
    pub async fn compute_masked(&self, request: PsiRequest) -> Result<PsiResponse> {
        let PsiRequest {
            masked_client_elements,
            descriptors,
        } = request;

        validate_descriptors(&descriptors)?;
        let key = self.keys.generate()?;

        debug!(
            descriptors = descriptors.len(),
            client_elements = masked_client_elements.len(),
            "fetching upstream elements"
        );
        let upstream = self.aggregator.fetch(&descriptors).await.map_err(|e| {
            warn!(code = %e.code(), "aggregator fetch failed");
            e
        })?;

        let response = PsiResponse {
            double_masked_client_elements: key.remask_all(masked_client_elements),
            masked_upstream_elements: key.mask_all(&upstream),
        };
        debug!(
            upstream_elements = response.masked_upstream_elements.len(),
            "masked response ready"
        );
        Ok(response)
    }
}

#[async_trait]
impl<A: Aggregator, K: KeySource> Broker for MaskingBroker<A, K> {
    async fn compute_masked(&self, request: PsiRequest) -> Result<PsiResponse> {
        MaskingBroker::compute_masked(self, request).await
    }
}
