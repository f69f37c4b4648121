//! Trained model persistence
//!
//! A trained model is stored as two JSON documents: the model itself and the
//! ordered list of feature names it expects. Loading checks that the two agree
//! before anything is served.

use crate::classifier::{Prediction, StrengthClassifier};
use crate::features::{validate_feature_names, FeatureExtractor};
use crate::forest::{argmax, RandomForest};
use chrono::{DateTime, Utc};
use pwstrength_core::{Error, ForestConfig, Result, StrengthClass};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

const MISSING_MODEL_HINT: &str =
    "Run `pwstrength train` first, or `pwstrength download` to fetch pre-trained assets.";

/// Information about how a model was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name/identifier
    pub name: String,

    /// Crate version that trained the model
    pub version: String,

    /// Training timestamp
    pub trained_at: DateTime<Utc>,

    /// Rows used for fitting
    pub training_rows: usize,

    /// Rows held out for evaluation
    pub test_rows: usize,

    /// Accuracy on the held-out rows
    pub test_accuracy: Option<f64>,

    /// Forest hyperparameters
    pub hyperparameters: ForestConfig,
}

impl ModelMetadata {
    pub fn new(hyperparameters: ForestConfig) -> Self {
        Self {
            name: "password-strength-random-forest".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            trained_at: Utc::now(),
            training_rows: 0,
            test_rows: 0,
            test_accuracy: None,
            hyperparameters,
        }
    }
}

/// Random forest together with the feature order it was trained on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrengthModel {
    forest: RandomForest,
    feature_names: Vec<String>,
    metadata: ModelMetadata,
    #[serde(skip)]
    extractor: FeatureExtractor,
}

impl StrengthModel {
    /// Bundle a forest with its feature order
    pub fn new(
        forest: RandomForest,
        feature_names: Vec<String>,
        metadata: ModelMetadata,
    ) -> Result<Self> {
        let model = Self {
            forest,
            feature_names,
            metadata,
            extractor: FeatureExtractor::new()?,
        };
        model.check_features(&model.feature_names)?;
        Ok(model)
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Write the model and its feature list
    pub fn save(&self, model_path: impl AsRef<Path>, features_path: impl AsRef<Path>) -> Result<()> {
        let model_path = model_path.as_ref();
        let features_path = features_path.as_ref();

        write_json(features_path, &self.feature_names)?;
        info!("Saved feature names to {}", features_path.display());

        write_json(model_path, self)?;
        info!("Saved model to {}", model_path.display());
        Ok(())
    }

    /// Feature list must be known names and match the forest's input width
    fn check_features(&self, names: &[String]) -> Result<()> {
        validate_feature_names(names)?;
        if names.len() != self.forest.n_features() {
            return Err(Error::feature_mismatch(format!(
                "feature list has {} names but the model expects {}",
                names.len(),
                self.forest.n_features()
            )));
        }
        Ok(())
    }
}

impl StrengthClassifier for StrengthModel {
    fn classify(&self, password: &str) -> Result<Prediction> {
        let start = Instant::now();

        let features = self.extractor.extract(password);
        let input = features.to_vector(&self.feature_names)?;
        let probabilities = self.forest.predict_proba(&input)?;
        let index = argmax(&probabilities);
        let class = StrengthClass::from_index(index)
            .ok_or_else(|| Error::model(format!("model produced unknown class id {}", index)))?;

        debug!(
            "Classified password: length={} diversity={} -> {}",
            features.length, features.diversity_score, class
        );

        Ok(Prediction {
            class,
            confidence: probabilities[index],
            probabilities,
            features,
            latency_us: start.elapsed().as_micros() as u64,
        })
    }

    fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// Load a persisted model and its feature list
///
/// Fails if either file is missing, if the forest is structurally invalid, or
/// if the feature list disagrees with the model.
pub fn load_model_assets(
    model_path: impl AsRef<Path>,
    features_path: impl AsRef<Path>,
) -> Result<StrengthModel> {
    let model_path = model_path.as_ref();
    let features_path = features_path.as_ref();

    for path in [model_path, features_path] {
        if !path.exists() {
            return Err(Error::missing_artifact(path, MISSING_MODEL_HINT));
        }
    }

    let model: StrengthModel = read_json(model_path)?;
    let feature_names: Vec<String> = read_json(features_path)?;

    model.forest.validate()?;
    model.check_features(&feature_names)?;
    if feature_names != model.feature_names {
        return Err(Error::feature_mismatch(format!(
            "{} lists [{}] but the model was trained on [{}]",
            features_path.display(),
            feature_names.join(", "),
            model.feature_names.join(", ")
        )));
    }

    info!(
        "Loaded model '{}' ({} trees, trained {}) and {} feature names",
        model.metadata.name,
        model.forest.n_trees(),
        model.metadata.trained_at.format("%Y-%m-%d %H:%M:%S UTC"),
        feature_names.len()
    );
    Ok(model)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{build_dataset, generate_raw};
    use crate::features::FEATURE_NAMES;

    fn trained_model() -> StrengthModel {
        let dataset = build_dataset(&generate_raw(10, Some(42)), &FeatureExtractor::default());
        let params = ForestConfig {
            n_estimators: 10,
            ..ForestConfig::default()
        };
        let forest = RandomForest::fit(&dataset, &params).unwrap();
        StrengthModel::new(
            forest,
            dataset.feature_names().to_vec(),
            ModelMetadata::new(params),
        )
        .unwrap()
    }

    #[test]
    fn test_classify_known_passwords() {
        let model = trained_model();

        let weak = model.classify("123456").unwrap();
        assert_eq!(weak.class, StrengthClass::Weak);
        assert_eq!(weak.confidence, weak.probabilities[0]);

        let strong = model.classify("Th3CyB3rS3cur1tyGrind!").unwrap();
        assert_eq!(strong.class, StrengthClass::Strong);
        assert_eq!(strong.features.entropy_heuristic, 88);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("models/password_strength_model.json");
        let features_path = dir.path().join("models/model_features.json");

        let model = trained_model();
        model.save(&model_path, &features_path).unwrap();

        let saved_features: Vec<String> =
            serde_json::from_str(&std::fs::read_to_string(&features_path).unwrap()).unwrap();
        assert_eq!(saved_features, FEATURE_NAMES);

        let loaded = load_model_assets(&model_path, &features_path).unwrap();
        assert_eq!(loaded.forest(), model.forest());
        assert_eq!(loaded.metadata(), model.metadata());
        assert_eq!(
            loaded.classify("MyP@ssw0rd!").unwrap().probabilities,
            model.classify("MyP@ssw0rd!").unwrap().probabilities
        );
    }

    #[test]
    fn test_missing_assets() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_model_assets(dir.path().join("m.json"), dir.path().join("f.json"))
            .unwrap_err();
        assert!(matches!(err, Error::MissingArtifact { .. }));
    }

    #[test]
    fn test_feature_list_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        let features_path = dir.path().join("features.json");
        trained_model().save(&model_path, &features_path).unwrap();

        std::fs::write(&features_path, r#"["length", "has_lower"]"#).unwrap();
        assert!(matches!(
            load_model_assets(&model_path, &features_path),
            Err(Error::FeatureMismatch(_))
        ));

        let mut reordered: Vec<&str> = FEATURE_NAMES.to_vec();
        reordered.swap(0, 1);
        std::fs::write(&features_path, serde_json::to_string(&reordered).unwrap()).unwrap();
        assert!(matches!(
            load_model_assets(&model_path, &features_path),
            Err(Error::FeatureMismatch(_))
        ));
    }

    /// Rewrite every split's feature index in a serialized model
    fn set_split_features(value: &mut serde_json::Value, feature: u64) {
        match value {
            serde_json::Value::Object(map) => {
                if map.get("type").and_then(|t| t.as_str()) == Some("split") {
                    map.insert("feature".to_string(), serde_json::json!(feature));
                }
                for child in map.values_mut() {
                    set_split_features(child, feature);
                }
            }
            serde_json::Value::Array(items) => {
                for child in items {
                    set_split_features(child, feature);
                }
            }
            _ => {}
        }
    }

    fn rewrite_model(path: &Path, edit: impl FnOnce(&mut serde_json::Value)) {
        let mut value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        edit(&mut value);
        std::fs::write(path, serde_json::to_string(&value).unwrap()).unwrap();
    }

    #[test]
    fn test_out_of_range_split_feature_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        let features_path = dir.path().join("features.json");
        trained_model().save(&model_path, &features_path).unwrap();

        rewrite_model(&model_path, |value| set_split_features(value, 99));
        assert!(matches!(
            load_model_assets(&model_path, &features_path),
            Err(Error::Model(_))
        ));
    }

    #[test]
    fn test_model_without_trees_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        let features_path = dir.path().join("features.json");
        trained_model().save(&model_path, &features_path).unwrap();

        rewrite_model(&model_path, |value| {
            value["forest"]["trees"] = serde_json::json!([]);
        });
        assert!(matches!(
            load_model_assets(&model_path, &features_path),
            Err(Error::Model(_))
        ));
    }

    #[test]
    fn test_unknown_feature_name_rejected_at_construction() {
        let model = trained_model();
        let mut names = model.feature_names().to_vec();
        names[0] = "shannon_entropy".to_string();
        let result = StrengthModel::new(model.forest().clone(), names, model.metadata().clone());
        assert!(matches!(result, Err(Error::FeatureMismatch(_))));
    }
}
