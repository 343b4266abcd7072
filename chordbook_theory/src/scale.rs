// Scale definitions and scale generation.
//
// A `ScaleDefinition` is a named list of 7 semitone steps between
// consecutive degrees. Walking it from a root yields a `Scale` of 8 note
// names: the root, then one name per step. For octave-spanning definitions
// (steps summing to 12) the last entry names the root again; that closure is
// by name only, since the model has no octave register.

use crate::error::TheoryError;
use crate::pitch::NoteName;
use serde::{Deserialize, Serialize};

/// Steps per scale definition.
pub const SCALE_STEPS: usize = 7;

/// Entries in a generated scale: the root plus one per step.
pub const SCALE_LENGTH: usize = SCALE_STEPS + 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleDefinition {
    pub name: String,
    /// Semitone distance between consecutive degrees.
    pub steps: Vec<i32>,
}

impl ScaleDefinition {
    pub fn new(name: &str, steps: &[i32]) -> Self {
        ScaleDefinition {
            name: name.to_string(),
            steps: steps.to_vec(),
        }
    }

    /// Sum of all steps. 12 for every octave-spanning scale.
    pub fn steps_total(&self) -> i32 {
        self.steps.iter().sum()
    }

    pub fn validate(&self) -> Result<(), TheoryError> {
        if self.steps.len() != SCALE_STEPS {
            return Err(TheoryError::InvalidDefinition {
                name: self.name.clone(),
                reason: format!(
                    "scale needs {SCALE_STEPS} steps, found {}",
                    self.steps.len()
                ),
            });
        }
        Ok(())
    }
}

/// A scale rooted on a specific note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    pub root: NoteName,
    pub scale_type: String,
    /// Root first, then one name per step, in traversal order.
    pub notes: Vec<NoteName>,
}

impl Scale {
    /// Note name at `degree` (0 = root). Panics past the end like slice indexing.
    pub fn degree(&self, degree: usize) -> NoteName {
        self.notes[degree]
    }

    /// Degrees 0..7 without the closing repeat of the root.
    pub fn degrees(&self) -> &[NoteName] {
        &self.notes[..self.notes.len().min(SCALE_STEPS)]
    }
}

/// Walk `definition` upward from `root`.
pub fn generate_scale(root: NoteName, definition: &ScaleDefinition) -> Scale {
    let mut notes = Vec::with_capacity(definition.steps.len() + 1);
    notes.push(root);
    let mut cursor = root.pitch_class();
    for &step in &definition.steps {
        cursor = cursor + step;
        notes.push(cursor.name());
    }
    Scale {
        root,
        scale_type: definition.name.clone(),
        notes,
    }
}
