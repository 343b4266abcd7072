// Error taxonomy for the theory engine.
//
// Every variant is a data or programmer error: a name that isn't in the
// registry, or a pattern that indexes past the chord slate. None of them are
// transient, so callers propagate rather than retry or default.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TheoryError {
    #[error("unknown note name: {0:?}")]
    UnknownNoteName(String),

    #[error("unknown scale type: {0:?}")]
    UnknownScaleType(String),

    #[error("unknown chord formula: {0:?}")]
    UnknownChordFormula(String),

    #[error("unknown progression: {0:?}")]
    UnknownProgression(String),

    #[error("pattern index {index} out of range for {len} chords")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid definition {name:?}: {reason}")]
    InvalidDefinition { name: String, reason: String },
}
