//! Subcommand implementations

use crate::cli::{Cli, Commands};
use anyhow::{bail, Result};
use pwstrength_classifiers::{
    download_assets, load_model_assets, prepare_data, train, HuggingFaceSource,
    StrengthClassifier,
};
use pwstrength_core::AppConfig;
use serde_json::json;
use tracing::info;

/// Load configuration, apply command-line overrides and run the subcommand
pub fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::Generate {
            output,
            replication,
            seed,
        } => {
            if let Some(output) = output {
                config.paths.data = output;
            }
            if let Some(replication) = replication {
                config.generator.replication = replication;
            }
            if seed.is_some() {
                config.generator.seed = seed;
            }
            config.validate()?;

            let dataset = prepare_data(&config.paths, &config.generator)?;
            println!(
                "Generated {} rows into {}",
                dataset.len(),
                config.paths.data.display()
            );
        }

        Commands::Train {
            data,
            model,
            features,
            estimators,
        } => {
            if let Some(data) = data {
                config.paths.data = data;
            }
            if let Some(model) = model {
                config.paths.model = model;
            }
            if let Some(features) = features {
                config.paths.features = features;
            }
            if let Some(estimators) = estimators {
                config.training.forest.n_estimators = estimators;
            }
            config.validate()?;

            let outcome = train(&config.paths, &config.training)?;
            println!("Test Accuracy: {:.2}%", outcome.accuracy() * 100.0);
            println!();
            println!("Classification Report:");
            println!("{}", outcome.report);
            println!("Model saved to {}", outcome.model_path.display());
            println!("Features saved to {}", outcome.features_path.display());
        }

        Commands::Download {
            repo,
            revision,
            output_dir,
        } => {
            if let Some(repo) = repo {
                config.assets.repo_id = repo;
            }
            if let Some(revision) = revision {
                config.assets.revision = revision;
            }
            if let Some(output_dir) = output_dir {
                config.assets.output_dir = output_dir;
            }

            let source = HuggingFaceSource::new(&config.assets)?;
            let report = download_assets(&config.assets, &source)?;

            for path in &report.downloaded {
                println!("Downloaded {}", path.display());
            }
            for name in &report.skipped {
                println!("Skipped {} (repository id not set)", name);
            }
            for (name, reason) in &report.failed {
                println!("Failed {}: {}", name, reason);
            }
            if report.is_complete() {
                println!("All {} assets downloaded", report.downloaded.len());
            } else if report.downloaded.is_empty() && !report.failed.is_empty() {
                bail!("No assets could be downloaded");
            }
        }

        Commands::Predict {
            password,
            model,
            features,
            json,
        } => {
            if let Some(model) = model {
                config.paths.model = model;
            }
            if let Some(features) = features {
                config.paths.features = features;
            }

            let model = load_model_assets(&config.paths.model, &config.paths.features)?;
            let prediction = model.classify(&password)?;
            info!("Prediction took {}us", prediction.latency_us);

            if json {
                let body = json!({
                    "strength": prediction.class.label(),
                    "confidence": prediction.confidence_percent(),
                    "details": {
                        "length": prediction.features.length,
                        "diversity_score": prediction.features.diversity_score,
                        "has_special": prediction.features.has_special,
                        "entropy_heuristic": prediction.features.entropy_heuristic,
                    },
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!(
                    "Strength:   {} ({})",
                    prediction.class,
                    prediction.confidence_percent()
                );
                println!("Length:     {}", prediction.features.length);
                println!("Diversity:  {}/4", prediction.features.diversity_score);
                println!("Special:    {}", prediction.features.has_special);
                println!("Entropy:    {}", prediction.features.entropy_heuristic);
            }
        }
    }

    Ok(())
}
