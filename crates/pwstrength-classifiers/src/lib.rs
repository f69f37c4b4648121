//! Password strength classifiers
//!
//! Everything between a raw password and a strength prediction:
//! - Feature extraction (the single source of the training columns)
//! - Synthetic data generation and CSV I/O
//! - A seeded random forest with a stratified train/test split
//! - Evaluation metrics and model persistence
//! - Pre-trained asset download from the Hugging Face Hub
//!
//! Prediction is CPU-only and takes microseconds; models are plain JSON.

pub mod artifacts;
pub mod assets;
pub mod classifier;
pub mod dataset;
pub mod features;
pub mod forest;
pub mod metrics;
pub mod split;
pub mod trainer;

pub use artifacts::{load_model_assets, ModelMetadata, StrengthModel};
pub use assets::{download_assets, AssetSource, DownloadReport, HuggingFaceSource};
pub use classifier::{Prediction, StrengthClassifier};
pub use dataset::{build_dataset, generate_raw, Dataset, RawSample, SEED_CORPUS};
pub use features::{validate_feature_names, FeatureExtractor, FeatureRecord, FEATURE_NAMES};
pub use forest::{Probabilities, RandomForest};
pub use metrics::{accuracy, ClassMetrics, ClassificationReport};
pub use split::train_test_split;
pub use trainer::{fit_and_evaluate, prepare_data, train, TrainingOutcome};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::artifacts::{load_model_assets, StrengthModel};
    pub use crate::classifier::{Prediction, StrengthClassifier};
    pub use crate::features::{FeatureExtractor, FeatureRecord};
    pub use crate::forest::RandomForest;
}
