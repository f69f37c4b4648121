//! Error types for the password strength classifier

use std::path::PathBuf;

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type shared by every workspace crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed or inconsistent training data
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Feature names or vector widths that do not line up with the model
    #[error("feature mismatch: {0}")]
    FeatureMismatch(String),

    /// Model fitting or inference errors
    #[error("model error: {0}")]
    Model(String),

    /// A required artifact (dataset, model, feature list) is not on disk
    #[error("required file '{}' not found. {hint}", path.display())]
    MissingArtifact { path: PathBuf, hint: String },

    /// Remote asset download errors
    #[error("download error: {0}")]
    Download(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV read/write errors
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new dataset error
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    /// Create a new feature mismatch error
    pub fn feature_mismatch(msg: impl Into<String>) -> Self {
        Self::FeatureMismatch(msg.into())
    }

    /// Create a new model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a missing artifact error with a hint on how to produce it
    pub fn missing_artifact(path: impl Into<PathBuf>, hint: impl Into<String>) -> Self {
        Self::MissingArtifact {
            path: path.into(),
            hint: hint.into(),
        }
    }

    /// Create a new download error
    pub fn download(msg: impl Into<String>) -> Self {
        Self::Download(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Short machine-readable name of the variant, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Dataset(_) => "dataset",
            Self::FeatureMismatch(_) => "feature_mismatch",
            Self::Model(_) => "model",
            Self::MissingArtifact { .. } => "missing_artifact",
            Self::Download(_) => "download",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Csv(_) => "csv",
            Self::Internal(_) => "internal",
        }
    }
}
