//! Strength classes shared by the trainer, the model and the service

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of strength classes the model predicts
pub const NUM_CLASSES: usize = 3;

/// Password strength tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrengthClass {
    /// Heuristic score 0-3
    Weak = 0,
    /// Heuristic score 4-6
    Medium = 1,
    /// Heuristic score 7 and above
    Strong = 2,
}

impl StrengthClass {
    /// All classes in class-id order
    pub const ALL: [StrengthClass; NUM_CLASSES] =
        [StrengthClass::Weak, StrengthClass::Medium, StrengthClass::Strong];

    /// Bucket a heuristic strength score into a class
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=3 => Self::Weak,
            4..=6 => Self::Medium,
            _ => Self::Strong,
        }
    }

    /// Class id used as the model target
    pub fn index(self) -> usize {
        self as usize
    }

    /// Class for a model target id
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::Weak => "Weak",
            Self::Medium => "Medium",
            Self::Strong => "Strong",
        }
    }
}

impl fmt::Display for StrengthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
