//! Evaluation metrics for the strength classifier

use pwstrength_core::{StrengthClass, NUM_CLASSES};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fraction of predictions that match the truth
pub fn accuracy(truth: &[usize], predicted: &[usize]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / truth.len() as f64
}

/// Precision, recall and F1 for one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class metrics plus macro and weighted averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: [ClassMetrics; NUM_CLASSES],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    /// Build the report; labels outside the class range are ignored
    pub fn new(truth: &[usize], predicted: &[usize]) -> Self {
        // confusion[t][p]
        let mut confusion = [[0usize; NUM_CLASSES]; NUM_CLASSES];
        for (&t, &p) in truth.iter().zip(predicted) {
            if t < NUM_CLASSES && p < NUM_CLASSES {
                confusion[t][p] += 1;
            }
        }

        let classes: [ClassMetrics; NUM_CLASSES] = std::array::from_fn(|c| {
            let tp = confusion[c][c];
            let predicted_c: usize = (0..NUM_CLASSES).map(|t| confusion[t][c]).sum();
            let support: usize = confusion[c].iter().sum();

            let precision = ratio(tp, predicted_c);
            let recall = ratio(tp, support);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassMetrics {
                precision,
                recall,
                f1,
                support,
            }
        });

        let total: usize = classes.iter().map(|m| m.support).sum();
        let n = NUM_CLASSES as f64;
        let macro_avg = ClassMetrics {
            precision: classes.iter().map(|m| m.precision).sum::<f64>() / n,
            recall: classes.iter().map(|m| m.recall).sum::<f64>() / n,
            f1: classes.iter().map(|m| m.f1).sum::<f64>() / n,
            support: total,
        };
        let weighted = |f: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                classes.iter().map(|m| f(m) * m.support as f64).sum::<f64>() / total as f64
            }
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
            support: total,
        };

        Self {
            classes,
            accuracy: accuracy(truth, predicted),
            macro_avg,
            weighted_avg,
        }
    }

    /// Metrics for one class
    pub fn class(&self, class: StrengthClass) -> &ClassMetrics {
        &self.classes[class.index()]
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for class in StrengthClass::ALL {
            let m = self.class(class);
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                class.label(),
                m.precision,
                m.recall,
                m.f1,
                m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[0, 1, 2, 2], &[0, 1, 1, 2]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_report_values() {
        let truth = [0, 0, 1, 1, 2, 2];
        let predicted = [0, 1, 1, 1, 2, 0];
        let report = ClassificationReport::new(&truth, &predicted);

        let weak = report.class(StrengthClass::Weak);
        assert_eq!(weak.precision, 0.5);
        assert_eq!(weak.recall, 0.5);
        assert_eq!(weak.support, 2);

        let medium = report.class(StrengthClass::Medium);
        assert!((medium.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(medium.recall, 1.0);
        assert!((medium.f1 - 0.8).abs() < 1e-12);

        let strong = report.class(StrengthClass::Strong);
        assert_eq!(strong.precision, 1.0);
        assert_eq!(strong.recall, 0.5);

        assert!((report.accuracy - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(report.macro_avg.support, 6);
        // Equal supports make the weighted and macro averages coincide
        assert!((report.weighted_avg.f1 - report.macro_avg.f1).abs() < 1e-12);
    }

    #[test]
    fn test_missing_class_yields_zeros() {
        let report = ClassificationReport::new(&[0, 0], &[0, 0]);
        let strong = report.class(StrengthClass::Strong);
        assert_eq!(strong.precision, 0.0);
        assert_eq!(strong.recall, 0.0);
        assert_eq!(strong.f1, 0.0);
        assert_eq!(strong.support, 0);
    }

    #[test]
    fn test_display_lists_every_class() {
        let report = ClassificationReport::new(&[0, 1, 2], &[0, 1, 2]);
        let text = report.to_string();
        for label in ["Weak", "Medium", "Strong", "accuracy", "macro avg", "weighted avg"] {
            assert!(text.contains(label), "missing {} in\n{}", label, text);
        }
        assert!(text.contains("1.00"));
    }
}
