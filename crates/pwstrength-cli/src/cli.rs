use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pwstrength")]
#[command(author, version, about = "Password strength classifier toolchain")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        default_value = "config.yaml",
        env = "PWSTRENGTH_CONFIG"
    )]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the labelled training corpus as CSV
    Generate {
        /// Output CSV path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Copies of each seed password
        #[arg(short, long)]
        replication: Option<usize>,

        /// Shuffle seed for a reproducible corpus
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Train and evaluate a model from the generated CSV
    Train {
        /// Training data CSV
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Where to write the model
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Where to write the feature list
        #[arg(short, long)]
        features: Option<PathBuf>,

        /// Number of trees
        #[arg(short = 'n', long)]
        estimators: Option<usize>,
    },

    /// Download pre-trained assets from the Hugging Face Hub
    Download {
        /// Repository id, e.g. `owner/name`
        #[arg(short, long)]
        repo: Option<String>,

        /// Branch, tag or commit
        #[arg(long)]
        revision: Option<String>,

        /// Directory to place the files in
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Classify a password with a trained model
    Predict {
        /// Password to classify
        password: String,

        /// Trained model file
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Feature list file
        #[arg(short, long)]
        features: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train_overrides() {
        let cli = Cli::try_parse_from([
            "pwstrength",
            "train",
            "--data",
            "data.csv",
            "-n",
            "25",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("config.yaml"));
        match cli.command {
            Commands::Train {
                data, estimators, ..
            } => {
                assert_eq!(data, Some(PathBuf::from("data.csv")));
                assert_eq!(estimators, Some(25));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_predict_requires_password() {
        assert!(Cli::try_parse_from(["pwstrength", "predict"]).is_err());
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["pwstrength"]).is_err());
    }
}
