//! Pipeline configuration
//!
//! A single YAML document configures every stage of the pipeline. Each binary
//! loads it with [`AppConfig::load`] and then applies its own CLI overrides.
//!
//! ```yaml
//! paths:
//!   data: password_data.csv
//!   model: password_strength_model.json
//!   features: model_features.json
//! training:
//!   test_size: 0.2
//!   forest:
//!     n_estimators: 100
//! server:
//!   port: 5000
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Artifact locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Synthetic data generation
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Split and model hyperparameters
    #[serde(default)]
    pub training: TrainingConfig,

    /// Prediction service
    #[serde(default)]
    pub server: ServerConfig,

    /// Pre-trained asset download
    #[serde(default)]
    pub assets: AssetsConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file, falling back to defaults when the
    /// file does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = if path.exists() {
            debug!("Reading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            Self::from_yaml(&content)?
        } else {
            debug!("No configuration at {}, using defaults", path.display());
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse configuration: {}", e)))
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        self.generator.validate()?;
        if !(self.training.test_size > 0.0 && self.training.test_size < 1.0) {
            return Err(Error::config(format!(
                "training.test_size must be in (0, 1), got {}",
                self.training.test_size
            )));
        }
        if self.training.forest.n_estimators == 0 {
            return Err(Error::config("training.forest.n_estimators must be at least 1"));
        }
        if self.training.forest.min_samples_split < 2 {
            return Err(Error::config("training.forest.min_samples_split must be at least 2"));
        }
        if let MaxFeatures::Fixed(0) = self.training.forest.max_features {
            return Err(Error::config("training.forest.max_features must be at least 1"));
        }
        Ok(())
    }
}

/// Artifact locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Generated training data (CSV)
    #[serde(default = "default_data_path")]
    pub data: PathBuf,

    /// Persisted model (JSON)
    #[serde(default = "default_model_path")]
    pub model: PathBuf,

    /// Persisted ordered feature names (JSON)
    #[serde(default = "default_features_path")]
    pub features: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data: default_data_path(),
            model: default_model_path(),
            features: default_features_path(),
        }
    }
}

/// Synthetic data generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// How many times the seed corpus is repeated
    #[serde(default = "default_replication")]
    pub replication: usize,

    /// Shuffle seed; unset means a fresh shuffle every run
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            replication: default_replication(),
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Largest accepted `replication`
    pub const MAX_REPLICATION: usize = 100_000;

    pub fn validate(&self) -> Result<()> {
        if self.replication == 0 {
            return Err(Error::config("generator.replication must be at least 1"));
        }
        if self.replication > Self::MAX_REPLICATION {
            return Err(Error::config(format!(
                "generator.replication must be at most {}, got {}",
                Self::MAX_REPLICATION,
                self.replication
            )));
        }
        Ok(())
    }
}

/// Split and model hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation
    #[serde(default = "default_test_size")]
    pub test_size: f64,

    /// Seed for the stratified split
    #[serde(default = "default_seed")]
    pub split_seed: u64,

    /// Random forest hyperparameters
    #[serde(default)]
    pub forest: ForestConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: default_test_size(),
            split_seed: default_seed(),
            forest: ForestConfig::default(),
        }
    }
}

/// Random forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,

    /// Maximum tree depth; unset grows trees until leaves are pure
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Minimum samples a node needs before it may split
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,

    /// Features considered at each split
    #[serde(default)]
    pub max_features: MaxFeatures,

    /// Train each tree on a bootstrap sample
    #[serde(default = "default_true")]
    pub bootstrap: bool,

    /// Seed for bootstrap sampling and feature selection
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: default_n_estimators(),
            max_depth: None,
            min_samples_split: default_min_samples_split(),
            max_features: MaxFeatures::default(),
            bootstrap: true,
            seed: default_seed(),
        }
    }
}

/// Number of candidate features drawn at each split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least 1
    #[default]
    Sqrt,
    /// Every feature
    All,
    /// A fixed count, capped at the number of features
    Fixed(usize),
}

impl MaxFeatures {
    /// Resolve to a concrete count for `n_features` columns
    pub fn resolve(self, n_features: usize) -> usize {
        let n = match self {
            Self::Sqrt => (n_features as f64).sqrt().floor() as usize,
            Self::All => n_features,
            Self::Fixed(n) => n,
        };
        n.clamp(1, n_features.max(1))
    }
}

/// Prediction service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body in bytes
    #[serde(default = "default_body_limit")]
    pub max_body_bytes: usize,

    /// Cross-origin policy
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            max_body_bytes: default_body_limit(),
            cors: CorsConfig::default(),
        }
    }
}

/// Cross-origin policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Accept requests from any origin
    #[serde(default = "default_true")]
    pub allow_any_origin: bool,

    /// Explicit origins, used when `allow_any_origin` is false
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_any_origin: true,
            allowed_origins: Vec::new(),
        }
    }
}

/// Pre-trained asset download
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Hugging Face repository id
    #[serde(default = "default_repo_id")]
    pub repo_id: String,

    /// Repository kind
    #[serde(default)]
    pub repo_type: AssetRepoType,

    /// Branch, tag or commit
    #[serde(default = "default_revision")]
    pub revision: String,

    /// Where downloaded files are placed
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Files to fetch from the repository root
    #[serde(default = "default_asset_files")]
    pub files: Vec<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            repo_id: default_repo_id(),
            repo_type: AssetRepoType::default(),
            revision: default_revision(),
            output_dir: default_output_dir(),
            files: default_asset_files(),
        }
    }
}

/// Hugging Face repository kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetRepoType {
    Model,
    #[default]
    Dataset,
    Space,
}

pub const DEFAULT_DATA_FILE: &str = "password_data.csv";
pub const DEFAULT_MODEL_FILE: &str = "password_strength_model.json";
pub const DEFAULT_FEATURES_FILE: &str = "model_features.json";

fn default_data_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

fn default_model_path() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_FILE)
}

fn default_features_path() -> PathBuf {
    PathBuf::from(DEFAULT_FEATURES_FILE)
}

fn default_replication() -> usize {
    50
}

fn default_test_size() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

fn default_n_estimators() -> usize {
    100
}

fn default_min_samples_split() -> usize {
    2
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_body_limit() -> usize {
    16 * 1024
}

fn default_repo_id() -> String {
    "aT-404/password-analyzer-assets".to_string()
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_asset_files() -> Vec<String> {
    vec![
        DEFAULT_MODEL_FILE.to_string(),
        DEFAULT_FEATURES_FILE.to_string(),
        DEFAULT_DATA_FILE.to_string(),
    ]
}

fn default_true() -> bool {
    true
}
