//! Broker HTTP server
//!
//! Each request runs on its own task with only call-local state. The call is
//! bounded by the configured timeout; when the deadline passes, or the
//! client hangs up, the in-flight future is dropped and with it the outbound
//! Aggregator request.
//!
//! Request bodies above the configured limit are answered with 413 and an
//! `INTERNAL` status: the caller's data is valid, this Broker just will not
//! take that much of it.

use crate::aggregator::HttpAggregator;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use masque_core::{Broker, BrokerConfig, ErrorCode, PsiError, PsiRequest, Status};
use masque_protocol::MaskingBroker;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
struct BrokerState {
    broker: Arc<dyn Broker>,
    timeout: Duration,
}

/// Router exposing `broker` as `POST /psi` plus `GET /health`
///
/// `max_request_bytes` caps the JSON body of `/psi`.
pub fn broker_router(
    broker: Arc<dyn Broker>,
    timeout: Duration,
    max_request_bytes: usize,
) -> Router {
    Router::new()
        .route("/psi", post(handle_psi))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(max_request_bytes))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(BrokerState { broker, timeout })
}

/// HTTP status carrying each error code
pub fn http_status(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::Cancelled => StatusCode::REQUEST_TIMEOUT,
    }
}

async fn handle_psi(
    State(state): State<BrokerState>,
    payload: Result<Json<PsiRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            let err = PsiError::internal("request exceeds the broker's body limit");
            return error_response_with(StatusCode::PAYLOAD_TOO_LARGE, &err);
        }
        Err(rejection) => {
            return error_response(&PsiError::invalid_argument(format!(
                "malformed request: {}",
                rejection.body_text()
            )))
        }
    };

    match tokio::time::timeout(state.timeout, state.broker.compute_masked(request)).await {
        Ok(Ok(response)) => (StatusCode::OK, Json(response)).into_response(),
        Ok(Err(err)) => error_response(&err),
        Err(_) => error_response(&PsiError::cancelled(format!(
            "broker call exceeded {}s deadline",
            state.timeout.as_secs()
        ))),
    }
}

fn error_response(err: &PsiError) -> Response {
    error_response_with(http_status(err.code()), err)
}

fn error_response_with(status: StatusCode, err: &PsiError) -> Response {
    warn!(code = %err.code(), %status, "broker call failed: {}", err.message());
    (status, Json(Status::from(err))).into_response()
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Broker process: HTTP Aggregator, masking Broker and router
#[derive(Debug, Clone)]
pub struct BrokerServer {
    config: BrokerConfig,
}

impl BrokerServer {
    /// Create a server from configuration
    pub fn new(config: BrokerConfig) -> Self {
        Self { config }
    }

    /// Build the router wired to the configured Aggregator
    pub fn router(&self) -> masque_core::Result<Router> {
        let aggregator =
            HttpAggregator::new(&self.config.aggregator_url, self.config.request_timeout())?;
        let broker: Arc<dyn Broker> = Arc::new(MaskingBroker::new(aggregator));
        Ok(broker_router(
            broker,
            self.config.request_timeout(),
            self.config.max_request_bytes,
        ))
    }

    /// Bind and serve until `shutdown` resolves
    pub async fn start<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router()?;
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        info!(
            "broker listening at {} (aggregator {})",
            listener.local_addr()?,
            self.config.aggregator_url
        );
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
