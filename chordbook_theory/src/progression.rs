// Chord progressions.
//
// A progression definition is a list of 0-based indices into a chord slate
// (normally the seven chords from `chord::degree_slate`). Building one maps
// each index to its chord, keeping pattern order and repeats.

use crate::chord::Chord;
use crate::error::TheoryError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionDefinition {
    pub name: String,
    pub degrees: Vec<usize>,
}

impl ProgressionDefinition {
    pub fn new(name: &str, degrees: &[usize]) -> Self {
        ProgressionDefinition {
            name: name.to_string(),
            degrees: degrees.to_vec(),
        }
    }

    /// Indices that fall outside a slate of `len` chords.
    pub fn out_of_range(&self, len: usize) -> Vec<usize> {
        self.degrees.iter().copied().filter(|&d| d >= len).collect()
    }
}

/// Select chords from `chords` by `pattern`. Fails on the first index past
/// the end of `chords`.
pub fn generate_progression(chords: &[Chord], pattern: &[usize]) -> Result<Vec<Chord>, TheoryError> {
    pattern
        .iter()
        .map(|&index| {
            chords.get(index).cloned().ok_or(TheoryError::IndexOutOfRange {
                index,
                len: chords.len(),
            })
        })
        .collect()
}
