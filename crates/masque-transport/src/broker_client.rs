//! Client side of the Broker RPC

use async_trait::async_trait;
use masque_core::{Broker, PsiError, PsiRequest, PsiResponse, Result, Status};
use std::time::Duration;
use tracing::debug;

/// Broker reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpBroker {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpBroker {
    /// Create a client for the Broker at `address` (`host:port` or a URL)
    pub fn new(address: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PsiError::internal(format!("failed to build HTTP client: {e}")))?;
        Self::with_client(address, client)
    }

    /// Create a client sharing an existing connection pool
    pub fn with_client(address: &str, client: reqwest::Client) -> Result<Self> {
        Ok(Self {
            endpoint: broker_endpoint(address)?,
            client,
        })
    }

    /// Full URL requests are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Broker for HttpBroker {
    async fn compute_masked(&self, request: PsiRequest) -> Result<PsiResponse> {
        debug!(endpoint = %self.endpoint, "calling broker");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error("broker request", &e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error("broker response", &e))?;

        if status.is_success() {
            return serde_json::from_slice(&body).map_err(|e| {
                PsiError::internal(format!(
                    "malformed broker response (line {}, column {})",
                    e.line(),
                    e.column()
                ))
            });
        }
        match serde_json::from_slice::<Status>(&body) {
            Ok(status) => Err(status.into()),
            Err(_) => Err(PsiError::internal(format!(
                "broker returned HTTP {status}"
            ))),
        }
    }
}

/// Map a reqwest failure: timeouts cancel the run, everything else is internal
fn transport_error(what: &str, err: &reqwest::Error) -> PsiError {
    if err.is_timeout() {
        PsiError::cancelled(format!("{what} timed out"))
    } else {
        PsiError::internal(format!("{what} failed: {err}"))
    }
}

/// Normalise a Broker address into its `/psi` endpoint
///
/// Bare `host:port` addresses get `http://` prepended.
pub fn broker_endpoint(address: &str) -> Result<String> {
    let address = address.trim();
    if address.is_empty() {
        return Err(PsiError::invalid_argument("broker address is empty"));
    }
    let base = if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{address}")
    };
    let url = reqwest::Url::parse(&base)
        .map_err(|e| PsiError::invalid_argument(format!("invalid broker address: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(PsiError::invalid_argument(format!(
            "broker address must be an http(s) host, got '{address}'"
        )));
    }
    Ok(format!("{}/psi", base.trim_end_matches('/')))
}
