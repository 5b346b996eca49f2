//! Test fixtures

use masque_core::{Element, ServiceDescriptor};

/// Build elements from string literals
pub fn elements(values: &[&str]) -> Vec<Element> {
    values.iter().map(|value| Element::from(*value)).collect()
}

/// Build descriptors from (service, operation) pairs
pub fn descriptors(pairs: &[(&str, &str)]) -> Vec<ServiceDescriptor> {
    pairs
        .iter()
        .map(|(service, operation)| ServiceDescriptor::new(*service, *operation))
        .collect()
}

/// Client set of the reference scenario
pub fn scenario_client_elements() -> Vec<Element> {
    elements(&["Lyle", "Jane", "Jack", "Charles"])
}

/// Aggregator reply of the reference scenario
pub fn scenario_upstream_elements() -> Vec<Element> {
    elements(&["Jane", "Charles", "Mallory"])
}

/// Descriptor list of the reference scenario
pub fn scenario_descriptors() -> Vec<ServiceDescriptor> {
    descriptors(&[("users", "list_names")])
}
