// The registry of scale, chord and progression definitions.
//
// `TheoryTables` is built once at startup, either from the built-in
// definitions (`TheoryTables::default()`) or from a JSON file, and then only
// read. It is passed explicitly to whatever needs it; nothing in the engine
// holds global state.
//
// Each table is an ordered `Vec`. Order decides the enumeration order of the
// batch driver and nothing else: lookups are by name, and the chord slate
// used for progressions is chosen by formula name (see `slate_for`).

use crate::chord::{Chord, ChordFormula, degree_slate, generate_chord};
use crate::error::TheoryError;
use crate::pitch::NoteName;
use crate::progression::{ProgressionDefinition, generate_progression};
use crate::scale::{Scale, ScaleDefinition, generate_scale};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TablesError {
    #[error("failed to read tables: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse tables: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] TheoryError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheoryTables {
    pub scales: Vec<ScaleDefinition>,
    pub chord_formulas: Vec<ChordFormula>,
    pub progressions: Vec<ProgressionDefinition>,
}

impl Default for TheoryTables {
    fn default() -> Self {
        TheoryTables {
            scales: default_scales(),
            chord_formulas: default_chord_formulas(),
            progressions: default_progressions(),
        }
    }
}

impl TheoryTables {
    /// Parse and validate tables from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, TablesError> {
        let tables: TheoryTables = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Load and validate tables from a JSON file.
    pub fn load(path: &Path) -> Result<Self, TablesError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Check every definition is well formed and names are unique per table.
    pub fn validate(&self) -> Result<(), TheoryError> {
        for scale in &self.scales {
            scale.validate()?;
        }
        for formula in &self.chord_formulas {
            if formula.offsets.is_empty() {
                return Err(invalid(&formula.name, "chord formula has no offsets"));
            }
        }
        for progression in &self.progressions {
            if progression.degrees.is_empty() {
                return Err(invalid(&progression.name, "progression has no chords"));
            }
        }
        for name in self
            .scales
            .iter()
            .map(|s| s.name.as_str())
            .chain(self.chord_formulas.iter().map(|f| f.name.as_str()))
            .chain(self.progressions.iter().map(|p| p.name.as_str()))
        {
            file_safe_name(name)?;
        }
        unique_names(self.scales.iter().map(|s| s.name.as_str()), "scale")?;
        unique_names(
            self.chord_formulas.iter().map(|f| f.name.as_str()),
            "chord formula",
        )?;
        unique_names(
            self.progressions.iter().map(|p| p.name.as_str()),
            "progression",
        )?;
        Ok(())
    }

    pub fn scale(&self, name: &str) -> Result<&ScaleDefinition, TheoryError> {
        self.scales
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| TheoryError::UnknownScaleType(name.to_string()))
    }

    pub fn chord_formula(&self, name: &str) -> Result<&ChordFormula, TheoryError> {
        self.chord_formulas
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| TheoryError::UnknownChordFormula(name.to_string()))
    }

    pub fn progression(&self, name: &str) -> Result<&ProgressionDefinition, TheoryError> {
        self.progressions
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| TheoryError::UnknownProgression(name.to_string()))
    }

    /// Generate a scale from a root label and scale type name.
    pub fn generate_scale(&self, root: &str, scale_type: &str) -> Result<Scale, TheoryError> {
        let root = NoteName::parse(root)?;
        Ok(generate_scale(root, self.scale(scale_type)?))
    }

    /// Generate a chord from a root label and formula name.
    pub fn generate_chord(&self, root: &str, formula: &str) -> Result<Chord, TheoryError> {
        let root = NoteName::parse(root)?;
        Ok(generate_chord(root, self.chord_formula(formula)?))
    }

    /// The seven degree chords of `scale`, all built from the formula `formula`.
    pub fn slate_for(&self, scale: &Scale, formula: &str) -> Result<Vec<Chord>, TheoryError> {
        Ok(degree_slate(scale, self.chord_formula(formula)?))
    }

    /// Build the named progression over `slate`.
    pub fn generate_progression(
        &self,
        slate: &[Chord],
        progression: &str,
    ) -> Result<Vec<Chord>, TheoryError> {
        generate_progression(slate, &self.progression(progression)?.degrees)
    }
}

fn invalid(name: &str, reason: &str) -> TheoryError {
    TheoryError::InvalidDefinition {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Names become directory and file names on disk, so they must stay a
/// single plain path component.
fn file_safe_name(name: &str) -> Result<(), TheoryError> {
    if name.is_empty() {
        return Err(invalid(name, "name is empty"));
    }
    if name.contains(['/', '\\']) {
        return Err(invalid(name, "name contains a path separator"));
    }
    if name.contains("..") || name == "." {
        return Err(invalid(name, "name contains a relative path segment"));
    }
    Ok(())
}

fn unique_names<'a>(names: impl Iterator<Item = &'a str>, kind: &str) -> Result<(), TheoryError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(invalid(name, &format!("duplicate {kind} name")));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Built-in definitions
// ---------------------------------------------------------------------------

fn default_scales() -> Vec<ScaleDefinition> {
    [
        ("major", [2, 2, 1, 2, 2, 2, 1]),
        ("natural_minor", [2, 1, 2, 2, 1, 2, 2]),
        ("harmonic_minor", [2, 1, 2, 2, 1, 3, 1]),
        ("melodic_minor", [2, 1, 2, 2, 2, 2, 1]),
        ("dorian", [2, 1, 2, 2, 2, 1, 2]),
        ("phrygian", [1, 2, 2, 2, 1, 2, 2]),
        ("lydian", [2, 2, 2, 1, 2, 2, 1]),
        ("mixolydian", [2, 2, 1, 2, 2, 1, 2]),
        ("locrian", [1, 2, 2, 1, 2, 2, 2]),
    ]
    .iter()
    .map(|(name, steps)| ScaleDefinition::new(name, steps))
    .collect()
}

fn default_chord_formulas() -> Vec<ChordFormula> {
    let formulas: [(&str, &[i32]); 30] = [
        // Major
        ("major", &[0, 4, 7]),
        ("major6", &[0, 4, 7, 9]),
        ("major7", &[0, 4, 7, 11]),
        ("major9", &[0, 4, 7, 11, 14]),
        ("major11", &[0, 4, 7, 11, 14, 17]),
        ("major13", &[0, 4, 7, 11, 14, 17, 21]),
        // Minor
        ("minor", &[0, 3, 7]),
        ("minor6", &[0, 3, 7, 9]),
        ("minor7", &[0, 3, 7, 10]),
        ("minor9", &[0, 3, 7, 10, 14]),
        ("minor11", &[0, 3, 7, 10, 14, 17]),
        ("minor13", &[0, 3, 7, 10, 14, 17, 21]),
        // Dominant
        ("dominant7", &[0, 4, 7, 10]),
        ("dominant9", &[0, 4, 7, 10, 14]),
        ("dominant11", &[0, 4, 7, 10, 14, 17]),
        ("dominant13", &[0, 4, 7, 10, 14, 17, 21]),
        // Augmented
        ("augmented", &[0, 4, 8]),
        ("augmented7", &[0, 4, 8, 10]),
        ("augmented9", &[0, 4, 8, 10, 14]),
        // Diminished
        ("diminished", &[0, 3, 6]),
        ("diminished7", &[0, 3, 6, 9]),
        // Suspended
        ("sus2", &[0, 2, 7]),
        ("sus4", &[0, 5, 7]),
        // Altered
        ("7#5", &[0, 4, 8, 10]),
        ("7b5", &[0, 4, 6, 10]),
        ("7#9", &[0, 4, 7, 10, 15]),
        ("7b9", &[0, 4, 7, 10, 13]),
        // Other
        ("add9", &[0, 4, 7, 14]),
        ("major7#11", &[0, 4, 7, 11, 18]),
        ("minor_major7", &[0, 3, 7, 11]),
    ];
    formulas
        .iter()
        .map(|(name, offsets)| ChordFormula::new(name, offsets))
        .collect()
}

fn default_progressions() -> Vec<ProgressionDefinition> {
    let progressions: [(&str, &[usize]); 24] = [
        ("I-V-ii-IV", &[0, 4, 1, 3]),
        ("12-bar-blues", &[0, 0, 0, 0, 3, 3, 0, 0, 4, 3, 0, 0]),
        ("I-IV-I-V-IV-I", &[0, 3, 0, 4, 3, 0]),
        ("iii-vi-ii-V", &[2, 5, 1, 4]),
        ("I-vi-ii-V", &[0, 5, 1, 4]),
        ("I-vi-ii-V-I", &[0, 5, 1, 4, 0]),
        ("I-V-vi-iii-IV-I-IV-V", &[0, 4, 5, 2, 3, 0, 3, 4]),
        ("I-IV-V", &[0, 3, 4]),
        ("I-bVII-IV", &[0, 10, 3]),
        ("I-V-vi-iii-IV-I-ii-V", &[0, 4, 5, 2, 3, 0, 1, 4]),
        ("ii-V-I", &[1, 4, 0]),
        ("I-ii-IV-V", &[0, 1, 3, 4]),
        ("ii-V-I-vi", &[1, 4, 0, 5]),
        ("i-bVI-bVII", &[0, 8, 10]),
        ("i-bVII-bVI-VII", &[0, 10, 8, 11]),
        ("i-iv-v", &[0, 3, 7]),
        ("I-IV-vi-V", &[0, 3, 5, 4]),
        ("I-V-IV-I", &[0, 4, 3, 0]),
        ("vi-IV-I-V", &[5, 3, 0, 4]),
        ("I-IV-I-V", &[0, 3, 0, 4]),
        ("I-V-IV", &[0, 4, 3]),
        ("I-IV-V-IV", &[0, 3, 4, 3]),
        ("I-IV-V-I", &[0, 3, 4, 0]),
        ("I-vi-IV-V", &[0, 5, 3, 4]),
    ];
    progressions
        .iter()
        .map(|(name, degrees)| ProgressionDefinition::new(name, degrees))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::SCALE_LENGTH;

    #[test]
    fn test_default_table_sizes() {
        let tables = TheoryTables::default();
        assert_eq!(tables.scales.len(), 9);
        assert_eq!(tables.chord_formulas.len(), 30);
        assert_eq!(tables.progressions.len(), 24);
        assert!(tables.validate().is_ok());
    }

    #[test]
    fn test_default_scales_span_an_octave() {
        for scale in &TheoryTables::default().scales {
            assert_eq!(scale.steps_total(), 12, "{}", scale.name);
        }
    }

    #[test]
    fn test_every_scale_closes_on_root() {
        let tables = TheoryTables::default();
        for root in NoteName::ALL {
            for def in &tables.scales {
                let scale = tables.generate_scale(root.label(), &def.name).unwrap();
                assert_eq!(scale.notes.len(), SCALE_LENGTH);
                assert_eq!(scale.notes[0], root);
                assert_eq!(scale.notes[7], root, "{root} {}", def.name);
            }
        }
    }

    #[test]
    fn test_every_chord_matches_formula_length() {
        let tables = TheoryTables::default();
        for root in NoteName::ALL {
            for formula in &tables.chord_formulas {
                let chord = tables.generate_chord(root.label(), &formula.name).unwrap();
                assert_eq!(chord.len(), formula.offsets.len());
                assert!(chord.tones.iter().all(|t| t.value() < 12));
            }
        }
    }

    #[test]
    fn test_unknown_keys() {
        let tables = TheoryTables::default();
        assert_eq!(
            tables.generate_scale("C", "bebop"),
            Err(TheoryError::UnknownScaleType("bebop".to_string()))
        );
        assert_eq!(
            tables.generate_scale("Db", "major"),
            Err(TheoryError::UnknownNoteName("Db".to_string()))
        );
        assert_eq!(
            tables.generate_chord("C", "power"),
            Err(TheoryError::UnknownChordFormula("power".to_string()))
        );
        assert_eq!(
            tables.generate_chord("X", "power"),
            Err(TheoryError::UnknownNoteName("X".to_string()))
        );
        assert_eq!(
            tables.progression("canon").unwrap_err(),
            TheoryError::UnknownProgression("canon".to_string())
        );
    }

    #[test]
    fn test_slate_progressions() {
        let tables = TheoryTables::default();
        let scale = tables.generate_scale("C", "major").unwrap();
        let slate = tables.slate_for(&scale, "minor").unwrap();
        assert_eq!(slate.len(), 7);
        assert!(slate.iter().all(|c| c.formula == "minor"));

        let ii_v_i = tables.generate_progression(&slate, "ii-V-I").unwrap();
        let roots: Vec<NoteName> = ii_v_i.iter().map(|c| c.root).collect();
        assert_eq!(roots, vec![NoteName::D, NoteName::G, NoteName::C]);

        assert_eq!(
            tables.generate_progression(&slate, "I-bVII-IV"),
            Err(TheoryError::IndexOutOfRange { index: 10, len: 7 })
        );
    }

    #[test]
    fn test_builtin_progressions_past_the_slate() {
        let tables = TheoryTables::default();
        let names: Vec<&str> = tables
            .progressions
            .iter()
            .filter(|p| !p.out_of_range(7).is_empty())
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["I-bVII-IV", "i-bVI-bVII", "i-bVII-bVI-VII", "i-iv-v"]
        );
    }

    #[test]
    fn test_json_round_trip_and_validation() {
        let tables = TheoryTables::default();
        let json = serde_json::to_string(&tables).unwrap();
        assert_eq!(TheoryTables::from_json(&json).unwrap(), tables);

        let mut bad = tables.clone();
        bad.scales.push(ScaleDefinition::new("major", &[2, 2, 1, 2, 2, 2, 1]));
        let json = serde_json::to_string(&bad).unwrap();
        assert!(matches!(
            TheoryTables::from_json(&json),
            Err(TablesError::Invalid(TheoryError::InvalidDefinition { .. }))
        ));

        assert!(matches!(
            TheoryTables::from_json("{\"scales\": 3}"),
            Err(TablesError::Json(_))
        ));
    }

    #[test]
    fn test_empty_definitions_rejected() {
        let mut tables = TheoryTables::default();
        tables.chord_formulas.push(ChordFormula::new("silence", &[]));
        assert!(tables.validate().is_err());

        let mut tables = TheoryTables::default();
        tables.progressions.push(ProgressionDefinition::new("nothing", &[]));
        assert!(tables.validate().is_err());
    }

    #[test]
    fn test_extreme_offsets_survive_json() {
        let mut tables = TheoryTables::default();
        tables
            .chord_formulas
            .push(ChordFormula::new("huge", &[0, i32::MAX, i32::MIN]));
        let json = serde_json::to_string(&tables).unwrap();
        let tables = TheoryTables::from_json(&json).unwrap();
        let chord = tables.generate_chord("B", "huge").unwrap();
        let values: Vec<u8> = chord.tones.iter().map(|t| t.value()).collect();
        assert_eq!(values, vec![11, 6, 3]);
    }

    #[test]
    fn test_names_must_be_single_path_components() {
        for bad in ["", ".", "..", "a/b", "a\\b", "../escape", "up..down"] {
            let mut tables = TheoryTables::default();
            tables.chord_formulas.push(ChordFormula::new(bad, &[0, 4, 7]));
            assert!(
                matches!(tables.validate(), Err(TheoryError::InvalidDefinition { .. })),
                "{bad:?} accepted as a formula name"
            );

            let mut tables = TheoryTables::default();
            tables.progressions.push(ProgressionDefinition::new(bad, &[0]));
            assert!(tables.validate().is_err(), "{bad:?} accepted as a progression name");
        }

        let mut tables = TheoryTables::default();
        tables.scales[0].name = "major/../../etc".to_string();
        assert!(tables.validate().is_err());

        let mut tables = TheoryTables::default();
        tables.chord_formulas.push(ChordFormula::new("add9.v2", &[0, 4, 7, 14]));
        assert!(tables.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.json");
        let mut tables = TheoryTables::default();
        tables.scales.truncate(1);
        std::fs::write(&path, serde_json::to_string_pretty(&tables).unwrap()).unwrap();
        assert_eq!(TheoryTables::load(&path).unwrap().scales.len(), 1);

        assert!(matches!(
            TheoryTables::load(&dir.path().join("missing.json")),
            Err(TablesError::Io(_))
        ));
    }
}
