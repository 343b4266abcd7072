// Pitch classes and their canonical note names.
//
// A `PitchClass` is one of the 12 equal-tempered chromatic tones, stored as
// 0..12 with C = 0. All arithmetic wraps modulo 12, so adding an extended
// chord offset like 14 lands on the same class as 2. `NoteName` is the
// sharp-spelled label set ("C", "C#", ... "B") in bijection with pitch
// classes through the fixed `NoteName::ALL` table.
//
// See also: `scale.rs` and `chord.rs`, which walk intervals from a root with
// `PitchClass::transpose`.

use crate::error::TheoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

/// Number of chromatic tones per octave.
pub const SEMITONES: i32 = 12;

/// One of the 12 chromatic pitch classes. Always in `0..12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PitchClass(u8);

impl PitchClass {
    /// Reduce any integer to its pitch class. Negative values wrap upward,
    /// so `-1` is B (11).
    pub fn new(value: i32) -> Self {
        PitchClass(value.rem_euclid(SEMITONES) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// `(self + interval) mod 12`. Total over all integers; also available
    /// as `pc + interval`.
    pub fn transpose(self, interval: i32) -> Self {
        PitchClass::new(self.0 as i32 + interval.rem_euclid(SEMITONES))
    }

    /// Ascending semitone distance from `self` up to `other`, in `0..12`.
    pub fn interval_to(self, other: PitchClass) -> u8 {
        (other.0 + 12 - self.0) % 12
    }

    pub fn name(self) -> NoteName {
        NoteName::ALL[self.0 as usize]
    }
}

impl Add<i32> for PitchClass {
    type Output = PitchClass;

    fn add(self, interval: i32) -> PitchClass {
        self.transpose(interval)
    }
}

impl TryFrom<u8> for PitchClass {
    type Error = TheoryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value < 12 {
            Ok(PitchClass(value))
        } else {
            Err(TheoryError::InvalidDefinition {
                name: value.to_string(),
                reason: "pitch class must be in 0..12".to_string(),
            })
        }
    }
}

impl From<PitchClass> for u8 {
    fn from(pc: PitchClass) -> u8 {
        pc.0
    }
}

impl From<NoteName> for PitchClass {
    fn from(name: NoteName) -> Self {
        name.pitch_class()
    }
}

/// Canonical sharp-spelled note names, in pitch-class order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NoteName {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl NoteName {
    /// All names, indexed by pitch class.
    pub const ALL: [NoteName; 12] = [
        NoteName::C,
        NoteName::CSharp,
        NoteName::D,
        NoteName::DSharp,
        NoteName::E,
        NoteName::F,
        NoteName::FSharp,
        NoteName::G,
        NoteName::GSharp,
        NoteName::A,
        NoteName::ASharp,
        NoteName::B,
    ];

    const LABELS: [&'static str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];

    pub fn pitch_class(self) -> PitchClass {
        PitchClass(self as u8)
    }

    pub fn from_pitch_class(pc: PitchClass) -> Self {
        pc.name()
    }

    /// The canonical label, e.g. "F#".
    pub fn label(self) -> &'static str {
        Self::LABELS[self as usize]
    }

    /// Look up a canonical label. Only the 12 sharp spellings are accepted;
    /// flats and lowercase fail with `UnknownNoteName`.
    pub fn parse(label: &str) -> Result<Self, TheoryError> {
        Self::LABELS
            .iter()
            .position(|&l| l == label)
            .map(|i| Self::ALL[i])
            .ok_or_else(|| TheoryError::UnknownNoteName(label.to_string()))
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NoteName {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NoteName::parse(s)
    }
}

impl TryFrom<String> for NoteName {
    type Error = TheoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        NoteName::parse(&value)
    }
}

impl From<NoteName> for String {
    fn from(name: NoteName) -> String {
        name.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_wraps_modulo_12() {
        assert_eq!(PitchClass::new(11).transpose(1), PitchClass::new(0));
        assert_eq!(PitchClass::new(7).transpose(14).value(), 9);
        assert_eq!((PitchClass::new(0) + 21).value(), 9);
    }

    #[test]
    fn test_add_negative_intervals() {
        assert_eq!(PitchClass::new(0).transpose(-1).value(), 11);
        assert_eq!((PitchClass::new(3) + -15).value(), 0);
        assert_eq!(PitchClass::new(-25).value(), 11);
    }

    #[test]
    fn test_add_extreme_intervals() {
        assert_eq!(PitchClass::new(0).transpose(i32::MAX).value(), 7);
        assert_eq!((PitchClass::new(11) + i32::MAX).value(), 6);
        assert_eq!(PitchClass::new(0).transpose(i32::MIN).value(), 4);
        assert_eq!((PitchClass::new(11) + i32::MIN).value(), 3);
    }

    #[test]
    fn test_add_always_in_range() {
        for base in 0..12 {
            for interval in -40..40 {
                let pc = PitchClass::new(base) + interval;
                assert!(pc.value() < 12, "{base} + {interval} gave {}", pc.value());
            }
        }
    }

    #[test]
    fn test_interval_to() {
        let c = NoteName::C.pitch_class();
        let g = NoteName::G.pitch_class();
        assert_eq!(c.interval_to(g), 7);
        assert_eq!(g.interval_to(c), 5);
        assert_eq!(c.interval_to(c), 0);
    }

    #[test]
    fn test_name_round_trip() {
        for name in NoteName::ALL {
            assert_eq!(NoteName::from_pitch_class(name.pitch_class()), name);
            assert_eq!(NoteName::parse(name.label()), Ok(name));
        }
    }

    #[test]
    fn test_labels_follow_pitch_order() {
        let labels: Vec<&str> = NoteName::ALL.iter().map(|n| n.label()).collect();
        assert_eq!(
            labels,
            ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"]
        );
        assert_eq!(NoteName::GSharp.pitch_class().value(), 8);
    }

    #[test]
    fn test_parse_rejects_non_canonical() {
        for bad in ["Db", "c", "H", "", "C##"] {
            assert_eq!(
                NoteName::parse(bad),
                Err(TheoryError::UnknownNoteName(bad.to_string()))
            );
        }
    }

    #[test]
    fn test_serde_as_label() {
        let json = serde_json::to_string(&NoteName::FSharp).unwrap();
        assert_eq!(json, "\"F#\"");
        let back: NoteName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, NoteName::FSharp);
        assert!(serde_json::from_str::<NoteName>("\"Gb\"").is_err());
    }

    #[test]
    fn test_pitch_class_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<PitchClass>("12").is_err());
        let pc: PitchClass = serde_json::from_str("4").unwrap();
        assert_eq!(pc.value(), 4);
    }
}
