//! Password strength core
//!
//! Types, configuration and error handling shared by the classifier, the
//! prediction service and the command-line tools.
//!
//! This crate provides:
//! - The three strength classes and their score buckets
//! - A single error type and result alias
//! - YAML configuration for every pipeline stage

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    AppConfig, AssetRepoType, AssetsConfig, CorsConfig, ForestConfig, GeneratorConfig,
    MaxFeatures, PathsConfig, ServerConfig, TrainingConfig,
};
pub use error::{Error, Result};
pub use types::{StrengthClass, NUM_CLASSES};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::error::{Error, Result};
    pub use crate::types::{StrengthClass, NUM_CLASSES};
}
