//! HTTP Aggregator client
//!
//! `POST {base}/PSI` with a JSON array of `[service, operation]` pairs. The
//! reply must be 200 with a JSON array of strings.
//!
//! | outcome | error |
//! |---|---|
//! | 400 | `InvalidArgument` |
//! | other non-200, unreachable, timeout, bad body | `Internal` |
//!
//! `Cancelled` belongs to the Broker server's own deadline, not to this hop.
//! Error messages never quote the response body.

use async_trait::async_trait;
use masque_core::{Aggregator, Element, PsiError, Result, ServiceDescriptor};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// Aggregator reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpAggregator {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpAggregator {
    /// Create a client for the Aggregator at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PsiError::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create a client sharing an existing connection pool
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            endpoint: format!("{}/PSI", base_url.trim_end_matches('/')),
            client,
        }
    }

    /// Full URL requests are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Aggregator for HttpAggregator {
    async fn fetch(&self, descriptors: &[ServiceDescriptor]) -> Result<Vec<Element>> {
        let pairs: Vec<[&str; 2]> = descriptors.iter().map(ServiceDescriptor::as_pair).collect();
        debug!(endpoint = %self.endpoint, descriptors = pairs.len(), "posting to aggregator");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&pairs)
            .send()
            .await
            .map_err(|e| upstream_error("aggregator request", &e))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::BAD_REQUEST => {
                return Err(PsiError::invalid_argument(
                    "aggregator rejected the requested service or operation",
                ))
            }
            status => {
                return Err(PsiError::internal(format!(
                    "aggregator returned HTTP {status}"
                )))
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| upstream_error("aggregator response", &e))?;
        let values: Vec<String> = serde_json::from_slice(&body).map_err(|e| {
            PsiError::internal(format!(
                "aggregator response is not a JSON string array (line {}, column {})",
                e.line(),
                e.column()
            ))
        })?;

        debug!(elements = values.len(), "aggregator returned elements");
        Ok(values.into_iter().map(Element::from).collect())
    }
}

fn upstream_error(what: &str, err: &reqwest::Error) -> PsiError {
    if err.is_timeout() {
        PsiError::internal(format!("{what} timed out"))
    } else {
        PsiError::internal(format!("{what} failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_psi_path() {
        let aggregator =
            HttpAggregator::new("http://localhost:8888/", Duration::from_secs(1)).unwrap();
        assert_eq!(aggregator.endpoint(), "http://localhost:8888/PSI");
    }
}
