// Chord formulas and chord generation.
//
// A chord formula is a list of semitone offsets from the chord root. Each
// offset is reduced modulo 12, so ninths, elevenths and thirteenths fold
// onto the same pitch classes as seconds, fourths and sixths. Folded
// duplicates are kept: a chord always has exactly as many tones as its
// formula has offsets, in formula order.
//
// `degree_slate` builds the seven chords that progressions index into: one
// chord per scale degree, all with the same formula.

use crate::pitch::{NoteName, PitchClass};
use crate::scale::{SCALE_STEPS, Scale};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordFormula {
    pub name: String,
    /// Offsets from the root in semitones. May exceed 12.
    pub offsets: Vec<i32>,
}

impl ChordFormula {
    pub fn new(name: &str, offsets: &[i32]) -> Self {
        ChordFormula {
            name: name.to_string(),
            offsets: offsets.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    pub root: NoteName,
    pub formula: String,
    /// One pitch class per formula offset, in formula order.
    pub tones: Vec<PitchClass>,
}

impl Chord {
    pub fn len(&self) -> usize {
        self.tones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tones.is_empty()
    }

    /// Label chord assets are filed under, e.g. "C_major" or "F#_7b9".
    pub fn label(&self) -> String {
        format!("{}_{}", self.root, self.formula)
    }
}

pub fn generate_chord(root: NoteName, formula: &ChordFormula) -> Chord {
    let base = root.pitch_class();
    Chord {
        root,
        formula: formula.name.clone(),
        tones: formula.offsets.iter().map(|&o| base + o).collect(),
    }
}

/// One chord per scale degree 0..7, each built from `formula`.
pub fn degree_slate(scale: &Scale, formula: &ChordFormula) -> Vec<Chord> {
    scale
        .notes
        .iter()
        .take(SCALE_STEPS)
        .map(|&root| generate_chord(root, formula))
        .collect()
}
