//! In-memory Aggregator stubs

use crate::fixtures::elements;
use async_trait::async_trait;
use masque_core::{Aggregator, Element, PsiError, Result, ServiceDescriptor};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Aggregator that returns a fixed result and counts calls
#[derive(Debug)]
pub struct StubAggregator {
    reply: Result<Vec<Element>>,
    calls: AtomicUsize,
    last_descriptors: Mutex<Option<Vec<ServiceDescriptor>>>,
}

impl StubAggregator {
    /// Always answer with `elements`
    pub fn returning(elements: Vec<Element>) -> Self {
        Self {
            reply: Ok(elements),
            calls: AtomicUsize::new(0),
            last_descriptors: Mutex::new(None),
        }
    }

    /// Always fail with `err`
    pub fn failing(err: PsiError) -> Self {
        Self {
            reply: Err(err),
            calls: AtomicUsize::new(0),
            last_descriptors: Mutex::new(None),
        }
    }

    /// Number of `fetch` calls so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Descriptors passed to the most recent call
    pub fn last_descriptors(&self) -> Option<Vec<ServiceDescriptor>> {
        self.last_descriptors.lock().unwrap().clone()
    }
}

#[async_trait]
impl Aggregator for StubAggregator {
    async fn fetch(&self, descriptors: &[ServiceDescriptor]) -> Result<Vec<Element>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_descriptors.lock().unwrap() = Some(descriptors.to_vec());
        self.reply.clone()
    }
}

/// Aggregator backed by a table of (service, operation) → elements
///
/// Unknown pairs fail with `InvalidArgument`, like the real Aggregator's 400.
/// Results of several descriptors are concatenated in descriptor order.
#[derive(Debug, Default)]
pub struct CatalogAggregator {
    catalog: HashMap<ServiceDescriptor, Vec<Element>>,
}

impl CatalogAggregator {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the elements an operation exposes
    pub fn with(mut self, service: &str, operation: &str, values: &[&str]) -> Self {
        self.catalog
            .insert(ServiceDescriptor::new(service, operation), elements(values));
        self
    }
}

#[async_trait]
impl Aggregator for CatalogAggregator {
    async fn fetch(&self, descriptors: &[ServiceDescriptor]) -> Result<Vec<Element>> {
        let mut union = Vec::new();
        for descriptor in descriptors {
            let values = self.catalog.get(descriptor).ok_or_else(|| {
                PsiError::invalid_argument(format!(
                    "unknown operation {}/{}",
                    descriptor.service_name, descriptor.operation_name
                ))
            })?;
            union.extend(values.iter().cloned());
        }
        Ok(union)
    }
}

/// Aggregator whose `fetch` never completes
///
/// Records whether the pending future was dropped, which is how cancellation
/// reaches it.
#[derive(Debug, Default, Clone)]
pub struct HangingAggregator {
    started: Arc<AtomicBool>,
    dropped: Arc<AtomicBool>,
}

impl HangingAggregator {
    /// New hanging aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a fetch has started
    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Whether an in-flight fetch was dropped
    pub fn was_cancelled(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Aggregator for HangingAggregator {
    async fn fetch(&self, _descriptors: &[ServiceDescriptor]) -> Result<Vec<Element>> {
        self.started.store(true, Ordering::SeqCst);
        let _flag = DropFlag(self.dropped.clone());
        std::future::pending::<()>().await;
        Ok(Vec::new())
    }
}
