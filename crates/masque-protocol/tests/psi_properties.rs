//! Property Tests: end-to-end PSI runs
//!
//! A full run (client mask, broker mask, client unmask, intersect) must agree
//! with a plain byte-equality intersection of the unmasked sets, duplicates
//! included, and must not depend on which keys a run happened to draw.

#![allow(clippy::unwrap_used)]

use masque_core::Element;
use masque_protocol::{MaskingBroker, PsiClient};
use masque_testkit::*;
use proptest::prelude::*;
use std::sync::Arc;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

/// Small alphabet so that collisions and duplicates actually happen
fn arb_set() -> impl Strategy<Value = Vec<Element>> {
    prop::collection::vec(
        prop::sample::select(vec!["Lyle", "Jane", "Jack", "Charles", "Mallory", "", "J"]),
        0..24,
    )
    .prop_map(|names| names.into_iter().map(Element::from).collect())
}

/// Entries of the larger side (the second on a tie) found in the smaller side
fn plain_count(local: &[Element], upstream: &[Element]) -> usize {
    let (smaller, larger) = if upstream.len() < local.len() {
        (upstream, local)
    } else {
        (local, upstream)
    };
    larger.iter().filter(|e| smaller.contains(e)).count()
}

fn run(local: &[Element], upstream: Vec<Element>, seed: u64) -> usize {
    let broker = MaskingBroker::with_key_source(
        StubAggregator::returning(upstream),
        SeededKeySource::new(seed),
    );
    let client = PsiClient::with_key_source(broker, SeededKeySource::new(seed.wrapping_add(1)));
    runtime()
        .block_on(client.run_psi(local, scenario_descriptors()))
        .unwrap()
}

proptest! {
    /// Property: masked run equals the plaintext intersection
    #[test]
    fn prop_run_matches_plain_intersection(
        local in arb_set(),
        upstream in arb_set(),
        seed in any::<u64>()
    ) {
        prop_assert_eq!(run(&local, upstream.clone(), seed), plain_count(&local, &upstream));
    }

    /// Property: independent keys give the same count
    #[test]
    fn prop_run_is_key_independent(
        local in arb_set(),
        upstream in arb_set(),
        a in any::<u64>(),
        b in any::<u64>()
    ) {
        prop_assert_eq!(run(&local, upstream.clone(), a), run(&local, upstream, b));
    }
}

#[tokio::test]
async fn repeated_runs_with_os_keys_agree() {
    let broker = MaskingBroker::new(StubAggregator::returning(scenario_upstream_elements()));
    let client = PsiClient::new(broker);

    let first = client
        .run_psi(&scenario_client_elements(), scenario_descriptors())
        .await
        .unwrap();
    let second = client
        .run_psi(&scenario_client_elements(), scenario_descriptors())
        .await
        .unwrap();

    assert_eq!(first, 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn duplicate_client_identifiers_inflate_count() {
    let broker = MaskingBroker::new(StubAggregator::returning(elements(&["Jane", "Jack"])));
    let client = PsiClient::new(broker);

    // Client side is larger, so it is scanned and each "Jane" counts.
    let count = client
        .run_psi(&elements(&["Jane", "Jane", "Jane"]), scenario_descriptors())
        .await
        .unwrap();
    assert_eq!(count, 3);
}

#[tokio::test]
async fn concurrent_runs_share_one_broker() {
    let aggregator = CatalogAggregator::new()
        .with("users", "list_names", &["Jane", "Charles", "Mallory"])
        .with("orders", "customers", &["Lyle"]);
    let broker = Arc::new(MaskingBroker::new(aggregator));

    let mut handles = Vec::new();
    for i in 0..16 {
        let client = PsiClient::new(broker.clone());
        handles.push(tokio::spawn(async move {
            let descriptors = if i % 2 == 0 {
                descriptors(&[("users", "list_names")])
            } else {
                descriptors(&[("users", "list_names"), ("orders", "customers")])
            };
            (i, client.run_psi(&scenario_client_elements(), descriptors).await)
        }));
    }

    for handle in handles {
        let (i, result) = handle.await.unwrap();
        let expected = if i % 2 == 0 { 2 } else { 3 };
        assert_eq!(result.unwrap(), expected);
    }
}
