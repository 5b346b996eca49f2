//! Client-facing intake server
//!
//! Accepts a multipart form with
//!
//! - `csvfile`: the client's identifiers; every non-empty field of every
//!   record is one element
//! - `svcinfo`: whitespace-separated `service operation` token pairs
//! - `upstreamurl`: the Broker's address
//!
//! and answers with the intersection count as plain text. Form problems are
//! 400s and never reach the protocol.

use crate::broker_client::HttpBroker;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use masque_core::{ClientConfig, Element, ErrorCode, PsiError, ServiceDescriptor};
use masque_protocol::PsiClient;
use std::future::Future;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Form field holding the Broker address
pub const FIELD_BROKER: &str = "upstreamurl";
/// Form field holding the CSV upload
pub const FIELD_CSV: &str = "csvfile";
/// Form field holding the descriptor tokens
pub const FIELD_DESCRIPTORS: &str = "svcinfo";

/// Problems with the submitted form
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    /// Body is not a readable multipart form
    #[error("unable to parse form: {0}")]
    Form(String),
    /// Upload exceeds the configured body limit
    #[error("upload exceeds the size limit")]
    TooLarge,
    /// A required field is absent
    #[error("missing form field '{0}'")]
    MissingField(&'static str),
    /// CSV upload could not be read
    #[error("unable to read CSV: {0}")]
    Csv(String),
    /// Descriptor tokens are empty or unpaired
    #[error("invalid service descriptors: {0}")]
    Descriptors(String),
    /// Broker address is unusable
    #[error("invalid broker address: {0}")]
    BrokerAddress(String),
}

impl IntakeError {
    /// HTTP status the intake answers with
    pub fn status(&self) -> StatusCode {
        match self {
            Self::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<MultipartError> for IntakeError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::TooLarge
        } else {
            Self::Form(err.body_text())
        }
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// A parsed intake submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeForm {
    /// Broker address as submitted
    pub broker_address: String,
    /// Client identifiers in upload order
    pub elements: Vec<Element>,
    /// Upstream operations to compare against
    pub descriptors: Vec<ServiceDescriptor>,
}

impl IntakeForm {
    /// Parse raw field values
    pub fn parse(broker_address: &str, csv: &str, tokens: &str) -> Result<Self, IntakeError> {
        let broker_address = broker_address.trim();
        if broker_address.is_empty() {
            return Err(IntakeError::MissingField(FIELD_BROKER));
        }
        Ok(Self {
            broker_address: broker_address.to_string(),
            elements: parse_elements(csv)?,
            descriptors: parse_descriptors(tokens)?,
        })
    }

    /// Read the multipart body, ignoring unknown fields
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, IntakeError> {
        let mut broker = None;
        let mut csv = None;
        let mut tokens = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                FIELD_BROKER => {
                    broker = Some(field.text().await?);
                }
                FIELD_DESCRIPTORS => {
                    tokens = Some(field.text().await?);
                }
                FIELD_CSV => {
                    let bytes = field.bytes().await?;
                    let text = String::from_utf8(bytes.to_vec())
                        .map_err(|_| IntakeError::Csv("file is not valid UTF-8".to_string()))?;
                    csv = Some(text);
                }
                _ => {}
            }
        }

        let broker = broker.ok_or(IntakeError::MissingField(FIELD_BROKER))?;
        let csv = csv.ok_or(IntakeError::MissingField(FIELD_CSV))?;
        let tokens = tokens.ok_or(IntakeError::MissingField(FIELD_DESCRIPTORS))?;
        Self::parse(&broker, &csv, &tokens)
    }
}

/// Split CSV text into elements
///
/// Records may have any number of fields. Fields are trimmed, may be
/// double-quoted (`""` escapes a quote) and are skipped when empty.
pub fn parse_elements(text: &str) -> Result<Vec<Element>, IntakeError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut elements = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IntakeError::Csv(csv_error_position(&e)))?;
        elements.extend(
            record
                .iter()
                .filter(|field| !field.is_empty())
                .map(Element::from),
        );
    }
    Ok(elements)
}

/// Describe a CSV error by position only, never by content
fn csv_error_position(err: &csv::Error) -> String {
    match err.position() {
        Some(pos) => format!("malformed record at line {}", pos.line()),
        None => "malformed input".to_string(),
    }
}

/// Pair up whitespace-separated `service operation` tokens
pub fn parse_descriptors(tokens: &str) -> Result<Vec<ServiceDescriptor>, IntakeError> {
    let tokens: Vec<&str> = tokens.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(IntakeError::Descriptors(
            "no service/operation pairs given".to_string(),
        ));
    }
    if tokens.len() % 2 != 0 {
        return Err(IntakeError::Descriptors(format!(
            "expected service/operation pairs, got {} tokens",
            tokens.len()
        )));
    }
    Ok(tokens
        .chunks_exact(2)
        .map(|pair| ServiceDescriptor::new(pair[0], pair[1]))
        .collect())
}

/// HTTP status the intake answers with when a run fails
pub fn intake_status(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorCode::Cancelled => StatusCode::REQUEST_TIMEOUT,
        ErrorCode::Internal => StatusCode::BAD_GATEWAY,
    }
}

#[derive(Clone)]
struct IntakeState {
    http: reqwest::Client,
}

/// Router serving the intake form on `POST /` and `POST /psi`
pub fn intake_router(config: &ClientConfig) -> masque_core::Result<Router> {
    let http = reqwest::Client::builder()
        .timeout(config.broker_timeout())
        .build()
        .map_err(|e| PsiError::internal(format!("failed to build HTTP client: {e}")))?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::HEAD]);

    Ok(Router::new()
        .route("/", post(handle_psi))
        .route("/psi", post(handle_psi))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(IntakeState { http }))
}

async fn handle_psi(
    State(state): State<IntakeState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => return IntakeError::Form(rejection.body_text()).into_response(),
    };
    let form = match IntakeForm::from_multipart(multipart).await {
        Ok(form) => form,
        Err(err) => {
            warn!("rejected intake form: {err}");
            return err.into_response();
        }
    };
    let broker = match HttpBroker::with_client(&form.broker_address, state.http.clone()) {
        Ok(broker) => broker,
        Err(err) => return IntakeError::BrokerAddress(err.message().to_string()).into_response(),
    };

    info!(
        elements = form.elements.len(),
        descriptors = form.descriptors.len(),
        broker = %broker.endpoint(),
        "starting psi run"
    );
    match PsiClient::new(broker)
        .run_psi(&form.elements, form.descriptors)
        .await
    {
        Ok(count) => (StatusCode::OK, count.to_string()).into_response(),
        Err(err) => {
            warn!(code = %err.code(), "psi run failed: {}", err.message());
            (intake_status(err.code()), err.to_string()).into_response()
        }
    }
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Client intake process
#[derive(Debug, Clone)]
pub struct IntakeServer {
    config: ClientConfig,
}

impl IntakeServer {
    /// Create a server from configuration
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Bind and serve until `shutdown` resolves
    pub async fn start<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = intake_router(&self.config)?;
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        info!("client intake listening at {}", listener.local_addr()?);
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(elements: &[Element]) -> Vec<String> {
        elements
            .iter()
            .map(|e| String::from_utf8(e.as_bytes().to_vec()).unwrap())
            .collect()
    }

    #[test]
    fn single_row_csv() {
        let elements = parse_elements("Lyle,Jane,Jack,Charles\n").unwrap();
        assert_eq!(names(&elements), ["Lyle", "Jane", "Jack", "Charles"]);
    }

    #[test]
    fn single_column_csv_with_crlf() {
        let elements = parse_elements("Lyle\r\nJane\r\n\r\nJack").unwrap();
        assert_eq!(names(&elements), ["Lyle", "Jane", "Jack"]);
    }

    #[test]
    fn fields_are_trimmed_and_empties_skipped() {
        let elements = parse_elements(" Lyle , ,Jane,").unwrap();
        assert_eq!(names(&elements), ["Lyle", "Jane"]);
    }

    #[test]
    fn quoted_fields_keep_commas_and_quotes() {
        let elements = parse_elements("\"Smith, Jane\",\"say \"\"hi\"\"\" ,Jack").unwrap();
        assert_eq!(names(&elements), ["Smith, Jane", "say \"hi\"", "Jack"]);
    }

    #[test]
    fn empty_csv_is_empty_set() {
        assert!(parse_elements("").unwrap().is_empty());
    }

    #[test]
    fn quoted_fields_span_lines() {
        let elements = parse_elements("\"Jane\nDoe\",Jack\n\"  \"\n").unwrap();
        assert_eq!(names(&elements), ["Jane\nDoe", "Jack"]);
    }

    #[test]
    fn ragged_records_are_accepted() {
        let elements = parse_elements("Lyle\nJane,Jack\nCharles,,Mallory\n").unwrap();
        assert_eq!(names(&elements), ["Lyle", "Jane", "Jack", "Charles", "Mallory"]);
    }

    #[test]
    fn descriptor_tokens_pair_up() {
        let descriptors = parse_descriptors("users list_names  orders customers").unwrap();
        assert_eq!(
            descriptors,
            vec![
                ServiceDescriptor::new("users", "list_names"),
                ServiceDescriptor::new("orders", "customers"),
            ]
        );
    }

    #[test]
    fn unpaired_or_empty_tokens_are_rejected() {
        assert!(matches!(parse_descriptors("users"), Err(IntakeError::Descriptors(_))));
        assert!(matches!(parse_descriptors("   "), Err(IntakeError::Descriptors(_))));
    }

    #[test]
    fn form_requires_broker_address() {
        let err = IntakeForm::parse(" ", "Jane", "users list").unwrap_err();
        assert_eq!(err, IntakeError::MissingField(FIELD_BROKER));
    }

    #[test]
    fn run_failures_map_to_statuses() {
        assert_eq!(intake_status(ErrorCode::InvalidArgument), StatusCode::BAD_REQUEST);
        assert_eq!(intake_status(ErrorCode::Internal), StatusCode::BAD_GATEWAY);
        assert_eq!(intake_status(ErrorCode::Cancelled), StatusCode::REQUEST_TIMEOUT);
    }
}
