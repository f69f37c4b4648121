//! Labeled training data: generation from the seed corpus and CSV I/O

use crate::features::{FeatureExtractor, FEATURE_NAMES};
use pwstrength_core::{Error, Result, StrengthClass, NUM_CLASSES};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;
use tracing::{debug, info};

/// Name of the target column in the CSV layout
pub const TARGET_COLUMN: &str = "strength_class";

/// Hand-scored passwords the synthetic corpus is built from
pub const SEED_CORPUS: [(&str, u8); 20] = [
    // Weak (score 0-3)
    ("123456", 1),
    ("password", 1),
    ("qwerty", 0),
    ("summer2024", 2),
    ("albert5", 2),
    ("Albert1", 3),
    ("iloveyou", 1),
    ("kottayam", 1),
    // Medium (score 4-6)
    ("SecurePwd123", 4),
    ("MyP@ssw0rd!", 5),
    ("Robot_Control_V1", 6),
    ("PyThOnR0cks", 5),
    ("firebaseDB4", 4),
    ("moveit_planner", 6),
    // Strong (score 7-10)
    ("A1bertT0jK#yY@l@", 8),
    ("R0S2_Gazebo_Sim_P1an", 9),
    ("Th3CyB3rS3cur1tyGrind!", 10),
    ("Cr3@t1v3Pr0bl3mS0lv3r!", 9),
    ("AIML_R0b0tic5_2027#", 10),
    ("Complex_puzzl3s_404_!", 8),
];

/// One scored password before feature extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSample {
    pub password: String,
    pub score: u8,
    pub class: StrengthClass,
}

/// Repeat the seed corpus `replication` times and shuffle it
///
/// With `seed` set the shuffle is reproducible; otherwise it is drawn from
/// OS entropy. Callers bound `replication` through
/// [`GeneratorConfig::validate`](pwstrength_core::GeneratorConfig::validate).
pub fn generate_raw(replication: usize, seed: Option<u64>) -> Vec<RawSample> {
    let mut samples: Vec<RawSample> = SEED_CORPUS
        .iter()
        .cycle()
        .take(SEED_CORPUS.len().saturating_mul(replication))
        .map(|(password, score)| RawSample {
            password: (*password).to_string(),
            score: *score,
            class: StrengthClass::from_score(*score),
        })
        .collect();

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    samples.shuffle(&mut rng);

    debug!("Generated {} raw samples (replication {})", samples.len(), replication);
    samples
}

/// Extract features for every raw sample, dropping the password and score
pub fn build_dataset(raw: &[RawSample], extractor: &FeatureExtractor) -> Dataset {
    let rows = raw
        .iter()
        .map(|sample| {
            extractor
                .extract(&sample.password)
                .to_row()
                .iter()
                .map(|v| *v as f64)
                .collect()
        })
        .collect();
    let labels = raw.iter().map(|sample| sample.class.index()).collect();

    Dataset {
        feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        rows,
        labels,
    }
}

/// Feature matrix with class labels
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    feature_names: Vec<String>,
    rows: Vec<Vec<f64>>,
    labels: Vec<usize>,
}

impl Dataset {
    /// Create a dataset, checking that the shapes and labels are consistent
    pub fn new(feature_names: Vec<String>, rows: Vec<Vec<f64>>, labels: Vec<usize>) -> Result<Self> {
        if rows.len() != labels.len() {
            return Err(Error::dataset(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != feature_names.len())
        {
            return Err(Error::dataset(format!(
                "row {} has {} values, expected {}",
                i,
                row.len(),
                feature_names.len()
            )));
        }
        if let Some(label) = labels.iter().find(|label| **label >= NUM_CLASSES) {
            return Err(Error::dataset(format!("label {} out of range", label)));
        }

        Ok(Self {
            feature_names,
            rows,
            labels,
        })
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Rows per class, indexed by class id
    pub fn class_counts(&self) -> [usize; NUM_CLASSES] {
        let mut counts = [0; NUM_CLASSES];
        for label in &self.labels {
            counts[*label] += 1;
        }
        counts
    }

    /// New dataset holding the rows at `indices`, in that order
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            feature_names: self.feature_names.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// Write the dataset as CSV with the target column first
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(path)?;

        let mut header = Vec::with_capacity(self.n_features() + 1);
        header.push(TARGET_COLUMN.to_string());
        header.extend(self.feature_names.iter().cloned());
        writer.write_record(&header)?;

        for (row, label) in self.rows.iter().zip(&self.labels) {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(label.to_string());
            record.extend(row.iter().map(|v| format_value(*v)));
            writer.write_record(&record)?;
        }
        writer.flush()?;

        info!("Wrote {} rows to {}", self.len(), path.display());
        Ok(())
    }

    /// Read a dataset from CSV
    ///
    /// Every column except [`TARGET_COLUMN`] is a feature, kept in header order.
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::missing_artifact(
                path,
                "Run `pwstrength generate` first to create it.",
            ));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let target_idx = headers
            .iter()
            .position(|h| h == TARGET_COLUMN)
            .ok_or_else(|| {
                Error::dataset(format!("{} has no '{}' column", path.display(), TARGET_COLUMN))
            })?;
        let feature_names: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != target_idx)
            .map(|(_, h)| h.to_string())
            .collect();

        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let mut row = Vec::with_capacity(feature_names.len());
            for (i, field) in record.iter().enumerate() {
                if i == target_idx {
                    let label = field.parse::<usize>().map_err(|e| {
                        Error::dataset(format!("line {}: bad label '{}': {}", line + 2, field, e))
                    })?;
                    labels.push(label);
                } else {
                    let value = field.parse::<f64>().map_err(|e| {
                        Error::dataset(format!("line {}: bad value '{}': {}", line + 2, field, e))
                    })?;
                    row.push(value);
                }
            }
            rows.push(row);
        }

        let dataset = Self::new(feature_names, rows, labels)?;
        info!("Loaded {} rows from {}", dataset.len(), path.display());
        Ok(dataset)
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_raw_replicates_and_labels() {
        let raw = generate_raw(50, Some(1));
        assert_eq!(raw.len(), 1000);

        let strong = raw.iter().filter(|s| s.class == StrengthClass::Strong).count();
        assert_eq!(strong, 300);
        assert!(raw
            .iter()
            .all(|s| s.class == StrengthClass::from_score(s.score)));
    }

    #[test]
    fn test_generate_raw_seeded_shuffle_is_reproducible() {
        assert_eq!(generate_raw(3, Some(9)), generate_raw(3, Some(9)));
        let raw = generate_raw(3, Some(9));
        let in_corpus_order: Vec<&str> = SEED_CORPUS
            .iter()
            .cycle()
            .take(60)
            .map(|(p, _)| *p)
            .collect();
        let shuffled: Vec<&str> = raw.iter().map(|s| s.password.as_str()).collect();
        assert_ne!(shuffled, in_corpus_order);
    }

    #[test]
    fn test_class_counts() {
        let extractor = FeatureExtractor::new().unwrap();
        let dataset = build_dataset(&generate_raw(50, Some(42)), &extractor);
        assert_eq!(dataset.class_counts(), [400, 300, 300]);
        assert_eq!(dataset.n_features(), FEATURE_NAMES.len());
    }

    #[test]
    fn test_csv_layout_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("password_data.csv");
        let extractor = FeatureExtractor::new().unwrap();
        let dataset = build_dataset(&generate_raw(2, Some(3)), &extractor);

        dataset.write_csv(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(
            header,
            "strength_class,length,has_lower,has_upper,has_digit,has_special,\
             diversity_score,entropy_heuristic,min_length_ok,min_diversity_ok"
        );
        assert!(!content.contains('.'), "values should be written as integers");

        let reloaded = Dataset::read_csv(&path).unwrap();
        assert_eq!(reloaded, dataset);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dataset::read_csv(dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, Error::MissingArtifact { .. }));
    }

    #[test]
    fn test_read_without_target_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "length,has_lower\n8,1\n").unwrap();
        assert!(matches!(Dataset::read_csv(&path), Err(Error::Dataset(_))));
    }

    #[test]
    fn test_read_target_column_anywhere() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reordered.csv");
        std::fs::write(&path, "length,strength_class,has_digit\n6,0,1\n22,2,1\n").unwrap();

        let dataset = Dataset::read_csv(&path).unwrap();
        assert_eq!(dataset.feature_names(), &["length", "has_digit"]);
        assert_eq!(dataset.labels(), &[0, 2]);
        assert_eq!(dataset.rows()[1], vec![22.0, 1.0]);
    }

    #[test]
    fn test_out_of_range_label_rejected() {
        let result = Dataset::new(vec!["length".into()], vec![vec![1.0]], vec![3]);
        assert!(matches!(result, Err(Error::Dataset(_))));
    }
}
