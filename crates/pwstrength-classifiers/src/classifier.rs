//! Classifier trait and prediction types

use crate::features::FeatureRecord;
use crate::forest::Probabilities;
use pwstrength_core::{Result, StrengthClass};

/// Trait for password strength classifiers
pub trait StrengthClassifier: Send + Sync {
    /// Classify a single password
    fn classify(&self, password: &str) -> Result<Prediction>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Result of classification
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Predicted strength tier
    pub class: StrengthClass,

    /// Probability of the predicted class (0.0-1.0)
    pub confidence: f64,

    /// Probability of every class, indexed by class id
    pub probabilities: Probabilities,

    /// Features the prediction was made from
    pub features: FeatureRecord,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl Prediction {
    /// Confidence as a percentage string, e.g. `"97.00%"`
    pub fn confidence_percent(&self) -> String {
        format!("{:.2}%", self.confidence * 100.0)
    }
}
