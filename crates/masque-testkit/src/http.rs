//! Mock HTTP Aggregator and server helpers
//!
//! Servers bind `127.0.0.1:0` and run on a background task for the rest of
//! the test.

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// What the mock Aggregator answers on `POST /PSI`
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 200 with a JSON string array
    Elements(Vec<String>),
    /// Bare status code with an empty body
    Status(u16),
    /// Status code with a raw body
    Body(u16, String),
    /// Never answer
    Hang,
}

impl MockReply {
    /// 200 reply from string literals
    pub fn elements(values: &[&str]) -> Self {
        Self::Elements(values.iter().map(|v| (*v).to_string()).collect())
    }
}

#[derive(Clone)]
struct MockState {
    reply: MockReply,
    hits: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<Value>>>,
    last_content_type: Arc<Mutex<Option<String>>>,
}

/// Running mock Aggregator
#[derive(Clone)]
pub struct MockAggregator {
    /// Base URL, without the `/PSI` suffix
    pub base_url: String,
    state: MockState,
}

impl MockAggregator {
    /// Start a mock Aggregator with a fixed reply
    pub async fn spawn(reply: MockReply) -> Self {
        let state = MockState {
            reply,
            hits: Arc::new(AtomicUsize::new(0)),
            last_body: Arc::new(Mutex::new(None)),
            last_content_type: Arc::new(Mutex::new(None)),
        };
        let router = Router::new()
            .route("/PSI", post(handle_psi))
            .with_state(state.clone());
        let addr = spawn_router(router).await;
        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Requests received so far
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// JSON body of the most recent request
    pub fn last_body(&self) -> Option<Value> {
        self.state.last_body.lock().unwrap().clone()
    }

    /// `Content-Type` of the most recent request
    pub fn last_content_type(&self) -> Option<String> {
        self.state.last_content_type.lock().unwrap().clone()
    }
}

async fn handle_psi(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_content_type.lock().unwrap() = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    *state.last_body.lock().unwrap() = serde_json::from_str(&body).ok();

    match state.reply {
        MockReply::Elements(values) => (StatusCode::OK, Json(values)).into_response(),
        MockReply::Status(code) => StatusCode::from_u16(code).unwrap().into_response(),
        MockReply::Body(code, text) => (StatusCode::from_u16(code).unwrap(), text).into_response(),
        MockReply::Hang => {
            std::future::pending::<()>().await;
            StatusCode::OK.into_response()
        }
    }
}

/// Serve `router` on an ephemeral loopback port
pub async fn spawn_router(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("test server failed: {e}");
        }
    });
    addr
}

/// URL of a loopback port with nothing listening on it
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
