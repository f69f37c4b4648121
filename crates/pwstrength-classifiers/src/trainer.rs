//! Data preparation and model training pipeline

use crate::artifacts::{ModelMetadata, StrengthModel};
use crate::dataset::{build_dataset, generate_raw, Dataset};
use crate::features::FeatureExtractor;
use crate::forest::RandomForest;
use crate::metrics::ClassificationReport;
use crate::split::train_test_split;
use pwstrength_core::{GeneratorConfig, PathsConfig, Result, StrengthClass, TrainingConfig};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Everything a training run produced
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Fitted model
    pub model: StrengthModel,

    /// Evaluation on the held-out split
    pub report: ClassificationReport,

    /// Where the model was written
    pub model_path: PathBuf,

    /// Where the feature list was written
    pub features_path: PathBuf,
}

impl TrainingOutcome {
    /// Accuracy on the held-out split
    pub fn accuracy(&self) -> f64 {
        self.report.accuracy
    }
}

/// Generate the synthetic corpus and write it to `paths.data`
pub fn prepare_data(paths: &PathsConfig, generator: &GeneratorConfig) -> Result<Dataset> {
    generator.validate()?;
    let extractor = FeatureExtractor::new()?;
    let raw = generate_raw(generator.replication, generator.seed);
    let dataset = build_dataset(&raw, &extractor);

    let counts = dataset.class_counts();
    info!(
        "Generated {} rows ({}: {}, {}: {}, {}: {})",
        dataset.len(),
        StrengthClass::Weak,
        counts[0],
        StrengthClass::Medium,
        counts[1],
        StrengthClass::Strong,
        counts[2]
    );

    dataset.write_csv(&paths.data)?;
    Ok(dataset)
}

/// Split, fit and evaluate without touching the filesystem
pub fn fit_and_evaluate(
    dataset: &Dataset,
    training: &TrainingConfig,
) -> Result<(StrengthModel, ClassificationReport)> {
    let (train_set, test_set) =
        train_test_split(dataset, training.test_size, training.split_seed)?;

    info!(
        "Training random forest ({} trees) on {} rows",
        training.forest.n_estimators,
        train_set.len()
    );
    let start = Instant::now();
    let forest = RandomForest::fit(&train_set, &training.forest)?;
    info!("Training complete in {}ms", start.elapsed().as_millis());

    let predicted = forest.predict_batch(&test_set)?;
    let report = ClassificationReport::new(test_set.labels(), &predicted);

    let metadata = ModelMetadata {
        training_rows: train_set.len(),
        test_rows: test_set.len(),
        test_accuracy: Some(report.accuracy),
        ..ModelMetadata::new(training.forest.clone())
    };
    let model = StrengthModel::new(forest, dataset.feature_names().to_vec(), metadata)?;

    Ok((model, report))
}

/// Load `paths.data`, train, evaluate, and persist the model and feature list
pub fn train(paths: &PathsConfig, training: &TrainingConfig) -> Result<TrainingOutcome> {
    info!("Loading data from {}", paths.data.display());
    let dataset = Dataset::read_csv(&paths.data)?;

    let (model, report) = fit_and_evaluate(&dataset, training)?;
    info!("Test accuracy: {:.2}%", report.accuracy * 100.0);

    model.save(&paths.model, &paths.features)?;

    Ok(TrainingOutcome {
        model,
        report,
        model_path: paths.model.clone(),
        features_path: paths.features.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::load_model_assets;
    use crate::classifier::StrengthClassifier;
    use pwstrength_core::{Error, ForestConfig};

    fn paths_in(dir: &std::path::Path) -> PathsConfig {
        PathsConfig {
            data: dir.join("password_data.csv"),
            model: dir.join("password_strength_model.json"),
            features: dir.join("model_features.json"),
        }
    }

    fn quick_training() -> TrainingConfig {
        TrainingConfig {
            forest: ForestConfig {
                n_estimators: 20,
                ..ForestConfig::default()
            },
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_full_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        let generator = GeneratorConfig {
            replication: 50,
            seed: Some(42),
        };

        let dataset = prepare_data(&paths, &generator).unwrap();
        assert_eq!(dataset.len(), 1000);
        assert!(paths.data.exists());

        let outcome = train(&paths, &quick_training()).unwrap();
        // Only the Medium/Strong pair with identical features can be confused
        assert!(outcome.accuracy() > 0.85, "accuracy {}", outcome.accuracy());
        assert_eq!(outcome.report.macro_avg.support, 200);
        assert_eq!(outcome.model.metadata().training_rows, 800);
        assert_eq!(outcome.model.metadata().test_accuracy, Some(outcome.accuracy()));

        let model = load_model_assets(&outcome.model_path, &outcome.features_path).unwrap();
        let prediction = model.classify("Cr3@t1v3Pr0bl3mS0lv3r!").unwrap();
        assert_eq!(prediction.class, StrengthClass::Strong);
    }

    #[test]
    fn test_oversized_replication_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        let generator = GeneratorConfig {
            replication: usize::MAX,
            seed: Some(1),
        };

        let err = prepare_data(&paths, &generator).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(!paths.data.exists());
    }

    #[test]
    fn test_train_without_data() {
        let dir = tempfile::tempdir().unwrap();
        let err = train(&paths_in(dir.path()), &quick_training()).unwrap_err();
        assert!(matches!(err, Error::MissingArtifact { .. }));
        assert!(!dir.path().join("password_strength_model.json").exists());
    }
}
