//! Shared application state

use metrics_exporter_prometheus::PrometheusHandle;
use pwstrength_classifiers::StrengthClassifier;
use std::sync::Arc;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Loaded strength classifier
    pub classifier: Arc<dyn StrengthClassifier>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    pub fn new(classifier: Arc<dyn StrengthClassifier>, metrics_handle: PrometheusHandle) -> Self {
        Self {
            classifier,
            metrics_handle,
        }
    }
}
