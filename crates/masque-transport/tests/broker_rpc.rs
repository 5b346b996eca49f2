//! Broker server and HttpBroker talking over loopback HTTP

#![allow(clippy::unwrap_used)]

use masque_core::config::DEFAULT_MAX_REQUEST_BYTES;
use masque_core::{Broker, BrokerConfig, ErrorCode, PsiRequest, Status};
use masque_crypto::MaskKey;
use masque_protocol::{MaskingBroker, PsiClient};
use masque_testkit::{
    descriptors, elements, scenario_client_elements, scenario_descriptors, spawn_router,
    HangingAggregator, MockAggregator, MockReply, StubAggregator,
};
use masque_transport::{broker_router, BrokerServer, HttpBroker};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Broker wired to a mock HTTP Aggregator, the way the binary runs it
async fn spawn_broker(aggregator_url: &str) -> String {
    let config = BrokerConfig {
        aggregator_url: aggregator_url.to_string(),
        ..BrokerConfig::testing()
    };
    let router = BrokerServer::new(config).router().unwrap();
    spawn_router(router).await.to_string()
}

/// In-process Broker behind the HTTP router with the default body limit
async fn serve(broker: Arc<dyn Broker>, timeout: Duration) -> SocketAddr {
    spawn_router(broker_router(broker, timeout, DEFAULT_MAX_REQUEST_BYTES)).await
}

fn http_broker(address: &str) -> HttpBroker {
    HttpBroker::new(address, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn scenario_over_http() {
    let aggregator = MockAggregator::spawn(MockReply::elements(&["Jane", "Charles", "Mallory"])).await;
    let broker = spawn_broker(&aggregator.base_url).await;

    let client = PsiClient::new(http_broker(&broker));
    let count = client
        .run_psi(&scenario_client_elements(), scenario_descriptors())
        .await
        .unwrap();

    assert_eq!(count, 2);
    assert_eq!(aggregator.hits(), 1);
}

#[tokio::test]
async fn aggregator_rejection_reaches_client_as_invalid_argument() {
    let aggregator = MockAggregator::spawn(MockReply::Status(400)).await;
    let broker = spawn_broker(&aggregator.base_url).await;

    let err = PsiClient::new(http_broker(&broker))
        .run_psi(&elements(&["Jane"]), descriptors(&[("nope", "missing")]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
}

#[tokio::test]
async fn aggregator_failure_reaches_client_as_internal() {
    let aggregator = MockAggregator::spawn(MockReply::Status(500)).await;
    let broker = spawn_broker(&aggregator.base_url).await;

    let err = PsiClient::new(http_broker(&broker))
        .run_psi(&elements(&["Jane"]), scenario_descriptors())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Internal);
}

#[tokio::test]
async fn empty_descriptors_rejected_before_aggregator() {
    let aggregator = MockAggregator::spawn(MockReply::elements(&["Jane"])).await;
    let broker = spawn_broker(&aggregator.base_url).await;

    let response = reqwest::Client::new()
        .post(format!("http://{broker}/psi"))
        .json(&PsiRequest {
            masked_client_elements: Vec::new(),
            descriptors: Vec::new(),
        })
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let status: Status = response.json().await.unwrap();
    assert_eq!(status.code, ErrorCode::InvalidArgument);
    assert_eq!(aggregator.hits(), 0);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let aggregator = MockAggregator::spawn(MockReply::elements(&[])).await;
    let broker = spawn_broker(&aggregator.base_url).await;

    let response = reqwest::Client::new()
        .post(format!("http://{broker}/psi"))
        .header("content-type", "application/json")
        .body("{\"maskedClientElements\": 7}")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(aggregator.hits(), 0);
}

#[tokio::test]
async fn response_round_trips_masked_elements() {
    let stub = StubAggregator::returning(elements(&["Jane", "Mallory"]));
    let broker: Arc<dyn Broker> = Arc::new(MaskingBroker::new(stub));
    let addr = serve(broker, Duration::from_secs(5)).await;

    let key = MaskKey::generate().unwrap();
    let masked = key.mask_all(&elements(&["Jane", "Jack", "Lyle"]));
    let response = http_broker(&addr.to_string())
        .compute_masked(PsiRequest {
            masked_client_elements: masked.clone(),
            descriptors: scenario_descriptors(),
        })
        .await
        .unwrap();

    assert_eq!(response.double_masked_client_elements.len(), 3);
    assert_eq!(response.masked_upstream_elements.len(), 2);
    for (single, double) in masked.iter().zip(&response.double_masked_client_elements) {
        assert_eq!(single.len(), double.len());
    }
}

#[tokio::test]
async fn deadline_cancels_in_flight_aggregator_call() {
    let hanging = HangingAggregator::new();
    let broker: Arc<dyn Broker> = Arc::new(MaskingBroker::new(hanging.clone()));
    let addr = serve(broker, Duration::from_millis(150)).await;

    let err = PsiClient::new(http_broker(&addr.to_string()))
        .run_psi(&elements(&["Jane"]), scenario_descriptors())
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::Cancelled);
    assert!(hanging.started());
    assert!(hanging.was_cancelled());
}

#[tokio::test]
async fn unreachable_broker_is_internal() {
    let err = PsiClient::new(http_broker(&masque_testkit::unreachable_url()))
        .run_psi(&elements(&["Jane"]), scenario_descriptors())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Internal);
}

#[tokio::test]
async fn health_check_answers_ok() {
    let broker: Arc<dyn Broker> = Arc::new(MaskingBroker::new(StubAggregator::returning(vec![])));
    let addr = serve(broker, Duration::from_secs(1)).await;

    let response = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn oversized_request_is_payload_too_large_not_invalid_argument() {
    let stub = Arc::new(StubAggregator::returning(elements(&["Jane"])));
    let broker: Arc<dyn Broker> = Arc::new(MaskingBroker::new(Arc::clone(&stub)));
    let addr = spawn_router(broker_router(broker, Duration::from_secs(5), 1024)).await;

    let key = MaskKey::generate().unwrap();
    let local: Vec<String> = (0..200).map(|i| format!("id{i}")).collect();
    let local: Vec<&str> = local.iter().map(String::as_str).collect();
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/psi"))
        .json(&PsiRequest {
            masked_client_elements: key.mask_all(&elements(&local)),
            descriptors: scenario_descriptors(),
        })
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::PAYLOAD_TOO_LARGE);
    let status: Status = response.json().await.unwrap();
    assert_eq!(status.code, ErrorCode::Internal);
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn client_side_timeout_is_cancelled() {
    let hanging = HangingAggregator::new();
    let broker: Arc<dyn Broker> = Arc::new(MaskingBroker::new(hanging.clone()));
    let addr = serve(broker, Duration::from_secs(30)).await;

    let client = HttpBroker::new(&addr.to_string(), Duration::from_millis(150)).unwrap();
    let err = PsiClient::new(client)
        .run_psi(&elements(&["Jane"]), scenario_descriptors())
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::Cancelled);
}
