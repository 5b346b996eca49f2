//! Client orchestration
//!
//! One call to [`PsiClient::run_psi`] is one run: a fresh client key masks the
//! local set, the Broker adds its layer, the same client key strips the client
//! layer again, and what remains is compared against the Broker-masked
//! upstream set. Failures surface unchanged; nothing is retried.

use crate::intersection::intersect;
use masque_core::{Broker, Element, PsiError, PsiRequest, Result, ServiceDescriptor};
use masque_crypto::{KeySource, OsKeySource};
use tracing::{debug, info};

/// Drives PSI runs against a Broker
#[derive(Debug, Clone)]
pub struct PsiClient<B, K = OsKeySource> {
    broker: B,
    keys: K,
}

impl<B: Broker> PsiClient<B> {
    /// Client drawing keys from the operating system RNG
    pub fn new(broker: B) -> Self {
        Self::with_key_source(broker, OsKeySource)
    }
}

impl<B: Broker, K: KeySource> PsiClient<B, K> {
    /// Client with an explicit key source
    pub fn with_key_source(broker: B, keys: K) -> Self {
        Self { broker, keys }
    }

    /// Size of the intersection between `local_elements` and the union the
    /// named upstream operations expose
    pub async fn run_psi(
        &self,
        local_elements: &[Element],
        descriptors: Vec<ServiceDescriptor>,
    ) -> Result<usize> {
        let key = self.keys.generate()?;
        let masked_client_elements = key.mask_all(local_elements);
        let sent = masked_client_elements.len();

        debug!(
            client_elements = sent,
            descriptors = descriptors.len(),
            "sending masked set to broker"
        );
        let response = self
            .broker
            .compute_masked(PsiRequest {
                masked_client_elements,
                descriptors,
            })
            .await?;

        let returned = response.double_masked_client_elements.len();
        if returned != sent {
            return Err(PsiError::internal(format!(
                "broker returned {returned} client elements, expected {sent}"
            )));
        }

        let broker_masked = key.remask_all(response.double_masked_client_elements);
        let count = intersect(&broker_masked, &response.masked_upstream_elements);
        info!(
            client_elements = sent,
            upstream_elements = response.masked_upstream_elements.len(),
            intersection = count,
            "psi run complete"
        );
        Ok(count)
    }
}
