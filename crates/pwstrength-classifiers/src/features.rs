//! Password feature extraction
//!
//! Every stage (data generation, training, serving) goes through
//! [`FeatureExtractor::extract`], so the columns a model was trained on are the
//! columns it is served with. Models persist their ordered feature names, and
//! [`FeatureRecord::to_vector`] rebuilds the input by name, not by position.

use pwstrength_core::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Number of feature columns
pub const NUM_FEATURES: usize = 9;

/// Canonical feature column order
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "length",
    "has_lower",
    "has_upper",
    "has_digit",
    "has_special",
    "diversity_score",
    "entropy_heuristic",
    "min_length_ok",
    "min_diversity_ok",
];

/// Minimum length for `min_length_ok`
pub const MIN_LENGTH: usize = 8;

/// Fixed-shape attribute set derived from a password
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Number of characters
    pub length: usize,
    pub has_lower: bool,
    pub has_upper: bool,
    pub has_digit: bool,
    /// Anything that is not ASCII alphanumeric or whitespace
    pub has_special: bool,
    /// Count of character classes present (0-4)
    pub diversity_score: u8,
    /// `length * diversity_score`
    pub entropy_heuristic: usize,
    pub min_length_ok: bool,
    /// Upper, lower and digit all present
    pub min_diversity_ok: bool,
}

impl FeatureRecord {
    /// Look up a single feature by column name
    pub fn get(&self, name: &str) -> Option<f64> {
        let value = match name {
            "length" => self.length as f64,
            "has_lower" => flag(self.has_lower),
            "has_upper" => flag(self.has_upper),
            "has_digit" => flag(self.has_digit),
            "has_special" => flag(self.has_special),
            "diversity_score" => self.diversity_score as f64,
            "entropy_heuristic" => self.entropy_heuristic as f64,
            "min_length_ok" => flag(self.min_length_ok),
            "min_diversity_ok" => flag(self.min_diversity_ok),
            _ => return None,
        };
        Some(value)
    }

    /// Build a model input vector in the order of `names`
    pub fn to_vector<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<f64>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.get(name)
                    .ok_or_else(|| Error::feature_mismatch(format!("unknown feature '{}'", name)))
            })
            .collect()
    }

    /// Values in canonical [`FEATURE_NAMES`] order, as integers for CSV output
    pub fn to_row(&self) -> [u64; NUM_FEATURES] {
        [
            self.length as u64,
            self.has_lower as u64,
            self.has_upper as u64,
            self.has_digit as u64,
            self.has_special as u64,
            self.diversity_score as u64,
            self.entropy_heuristic as u64,
            self.min_length_ok as u64,
            self.min_diversity_ok as u64,
        ]
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Fail unless every name is a known feature column
pub fn validate_feature_names<S: AsRef<str>>(names: &[S]) -> Result<()> {
    if names.is_empty() {
        return Err(Error::feature_mismatch("feature list is empty"));
    }
    let unknown: Vec<&str> = names
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| !FEATURE_NAMES.contains(name))
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(Error::feature_mismatch(format!(
            "unknown feature columns: {}",
            unknown.join(", ")
        )))
    }
}

/// Regex-based feature extractor
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    lower: Regex,
    upper: Regex,
    digit: Regex,
    special: Regex,
}

impl FeatureExtractor {
    /// Compile the character-class patterns
    pub fn new() -> Result<Self> {
        Ok(Self {
            lower: compile(r"[a-z]")?,
            upper: compile(r"[A-Z]")?,
            digit: compile(r"\d")?,
            special: compile(r"[^a-zA-Z0-9\s]")?,
        })
    }

    /// Extract the feature record for one password
    pub fn extract(&self, password: &str) -> FeatureRecord {
        let length = password.chars().count();
        let has_lower = self.lower.is_match(password);
        let has_upper = self.upper.is_match(password);
        let has_digit = self.digit.is_match(password);
        let has_special = self.special.is_match(password);

        let diversity_score = [has_lower, has_upper, has_digit, has_special]
            .iter()
            .filter(|present| **present)
            .count() as u8;

        FeatureRecord {
            length,
            has_lower,
            has_upper,
            has_digit,
            has_special,
            diversity_score,
            entropy_heuristic: length * diversity_score as usize,
            min_length_ok: length >= MIN_LENGTH,
            min_diversity_ok: has_upper && has_lower && has_digit,
        }
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new().expect("Failed to compile feature patterns")
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        Error::internal(format!("Failed to compile pattern '{}': {}", pattern, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_password_features() {
        let extractor = FeatureExtractor::new().unwrap();
        let f = extractor.extract("Th3CyB3rS3cur1tyGrind!");

        assert_eq!(f.length, 22);
        assert!(f.has_lower && f.has_upper && f.has_digit && f.has_special);
        assert_eq!(f.diversity_score, 4);
        assert_eq!(f.entropy_heuristic, 88);
        assert!(f.min_length_ok);
        assert!(f.min_diversity_ok);
    }

    #[test]
    fn test_digits_only() {
        let extractor = FeatureExtractor::new().unwrap();
        let f = extractor.extract("123456");

        assert_eq!(f.length, 6);
        assert!(!f.has_lower && !f.has_upper && !f.has_special);
        assert!(f.has_digit);
        assert_eq!(f.diversity_score, 1);
        assert_eq!(f.entropy_heuristic, 6);
        assert!(!f.min_length_ok);
        assert!(!f.min_diversity_ok);
    }

    #[test]
    fn test_whitespace_is_not_special() {
        let extractor = FeatureExtractor::new().unwrap();
        let f = extractor.extract("pass word");
        assert!(!f.has_special);
        assert_eq!(f.length, 9);

        let f = extractor.extract("moveit_planner");
        assert!(f.has_special);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let extractor = FeatureExtractor::new().unwrap();
        let f = extractor.extract("pässwörd");
        assert_eq!(f.length, 8);
        // Non-ASCII letters fall outside [a-zA-Z0-9\s]
        assert!(f.has_special);
    }

    #[test]
    fn test_empty_password() {
        let extractor = FeatureExtractor::new().unwrap();
        assert_eq!(extractor.extract(""), FeatureRecord::default());
    }

    #[test]
    fn test_vector_follows_requested_order() {
        let extractor = FeatureExtractor::new().unwrap();
        let f = extractor.extract("Albert1");

        let canonical = f.to_vector(&FEATURE_NAMES).unwrap();
        assert_eq!(canonical, vec![7.0, 1.0, 1.0, 1.0, 0.0, 3.0, 21.0, 0.0, 1.0]);

        let reordered = f.to_vector(&["entropy_heuristic", "length"]).unwrap();
        assert_eq!(reordered, vec![21.0, 7.0]);
    }

    #[test]
    fn test_unknown_feature_rejected() {
        let f = FeatureRecord::default();
        assert!(matches!(
            f.to_vector(&["length", "shannon_entropy"]),
            Err(Error::FeatureMismatch(_))
        ));
        assert!(validate_feature_names(&["length", "shannon_entropy"]).is_err());
        assert!(validate_feature_names::<&str>(&[]).is_err());
        assert!(validate_feature_names(&FEATURE_NAMES).is_ok());
    }

    #[test]
    fn test_row_matches_canonical_vector() {
        let extractor = FeatureExtractor::new().unwrap();
        let f = extractor.extract("MyP@ssw0rd!");
        let row: Vec<f64> = f.to_row().iter().map(|v| *v as f64).collect();
        assert_eq!(row, f.to_vector(&FEATURE_NAMES).unwrap());
    }
}
