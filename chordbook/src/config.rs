// Data-driven generator configuration.
//
// Every tunable value of a batch run lives in `GeneratorConfig`, loaded from
// JSON when a config file is present and defaulted otherwise. Fields missing
// from the file take their defaults, so a config only needs the values it
// changes. The theory tables can be overridden here too; they default to the
// built-in definitions.
//
// See also: `batch.rs` (reads `output_dir` and `progression_formula`),
// `midi.rs` (reads `MidiSettings`), `render.rs` (reads `ToolSettings`).

use crate::error::ConfigError;
use chordbook_theory::TheoryTables;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name the binary looks for in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "chordbook.json";

/// Highest MIDI key; base key plus the top pitch class must stay below it.
const MAX_MIDI_KEY: u8 = 127;

/// Slowest tempo whose quarter-note length fits in 24 bits of microseconds.
const MIN_TEMPO_BPM: u16 = 4;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiSettings {
    /// Resolution of the MIDI header.
    pub ticks_per_quarter: u16,
    /// Length of every note.
    pub note_ticks: u32,
    pub velocity: u8,
    /// Key that pitch class 0 maps to (60 = middle C).
    pub base_key: u8,
    pub tempo_bpm: u16,
}

impl Default for MidiSettings {
    fn default() -> Self {
        MidiSettings {
            ticks_per_quarter: 480,
            note_ticks: 480,
            velocity: 64,
            base_key: 60,
            tempo_bpm: 120,
        }
    }
}

/// External executables and which rendering stages run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub lilypond: String,
    pub fluidsynth: String,
    pub ffmpeg: String,
    pub soundfont: PathBuf,
    pub sample_rate: u32,
    /// Engraving resolution in DPI.
    pub png_resolution: u32,
    /// One synthesizer pass per format, by file extension.
    pub audio_formats: Vec<String>,
    /// Transcode source extension; must be one of `audio_formats`.
    pub transcode_from: String,
    pub transcode_to: String,
    pub notation: bool,
    pub audio: bool,
    pub transcode: bool,
    /// Keep the intermediate `.ly` file after engraving.
    pub keep_sources: bool,
}

impl Default for ToolSettings {
    fn default() -> Self {
        ToolSettings {
            lilypond: "lilypond".to_string(),
            fluidsynth: "fluidsynth".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            soundfont: PathBuf::from("/usr/share/sounds/sf2/FluidR3_GM.sf2"),
            sample_rate: 44100,
            png_resolution: 150,
            audio_formats: vec!["wav".to_string(), "flac".to_string()],
            transcode_from: "flac".to_string(),
            transcode_to: "mp3".to_string(),
            notation: true,
            audio: true,
            transcode: true,
            keep_sources: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Root of the generated tree.
    pub output_dir: PathBuf,
    /// Formula used for the seven degree chords progressions index into.
    pub progression_formula: String,
    pub midi: MidiSettings,
    pub tools: ToolSettings,
    pub tables: TheoryTables,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            output_dir: PathBuf::from("output"),
            progression_formula: "major".to_string(),
            midi: MidiSettings::default(),
            tools: ToolSettings::default(),
            tables: TheoryTables::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load `path` if it exists, otherwise return the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tables.validate()?;
        self.tables.chord_formula(&self.progression_formula)?;

        let midi = &self.midi;
        if midi.ticks_per_quarter == 0 || midi.ticks_per_quarter > 0x7fff {
            return Err(invalid("midi.ticks_per_quarter", "must be in 1..=32767"));
        }
        if midi.note_ticks == 0 || midi.note_ticks > 0x0fff_ffff {
            return Err(invalid("midi.note_ticks", "must be in 1..=268435455"));
        }
        if midi.velocity > 127 {
            return Err(invalid("midi.velocity", "must be at most 127"));
        }
        if midi.base_key > MAX_MIDI_KEY - 11 {
            return Err(invalid("midi.base_key", "must leave room for 12 keys"));
        }
        if midi.tempo_bpm < MIN_TEMPO_BPM {
            return Err(invalid(
                "midi.tempo_bpm",
                "must be at least 4 to fit a MIDI tempo event",
            ));
        }

        let tools = &self.tools;
        if tools.transcode && !tools.audio_formats.contains(&tools.transcode_from) {
            return Err(invalid(
                "tools.transcode_from",
                "must be one of tools.audio_formats",
            ));
        }
        if tools.transcode && !tools.audio {
            return Err(invalid("tools.transcode", "requires tools.audio"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.midi.base_key, 60);
        assert_eq!(config.midi.velocity, 64);
        assert_eq!(config.midi.note_ticks, 480);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = GeneratorConfig::from_json(
            r#"{ "output_dir": "out", "midi": { "velocity": 90 }, "tools": { "audio": false, "transcode": false } }"#,
        )
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.midi.velocity, 90);
        assert_eq!(config.midi.ticks_per_quarter, 480);
        assert!(!config.tools.audio);
        assert!(config.tools.notation);
        assert_eq!(config.tables.scales.len(), 9);
    }

    #[test]
    fn test_unknown_progression_formula() {
        let result = GeneratorConfig::from_json(r#"{ "progression_formula": "power" }"#);
        assert!(matches!(result, Err(ConfigError::Tables(_))));
    }

    #[test]
    fn test_transcode_needs_source_format() {
        let mut config = GeneratorConfig::default();
        config.tools.audio_formats = vec!["wav".to_string()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "tools.transcode_from", .. })
        ));
        config.tools.transcode = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_key_range() {
        let mut config = GeneratorConfig::default();
        config.midi.base_key = 120;
        assert!(config.validate().is_err());
        config.midi.base_key = 116;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tempo_range() {
        let mut config = GeneratorConfig::default();
        config.midi.tempo_bpm = 3;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "midi.tempo_bpm", .. })
        ));
        config.midi.tempo_bpm = 4;
        assert!(config.validate().is_ok());

        assert!(GeneratorConfig::from_json(r#"{"midi":{"tempo_bpm":2}}"#).is_err());
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        assert_eq!(
            GeneratorConfig::load_or_default(&path).unwrap(),
            GeneratorConfig::default()
        );

        std::fs::write(&path, r#"{ "progression_formula": "minor" }"#).unwrap();
        let config = GeneratorConfig::load_or_default(&path).unwrap();
        assert_eq!(config.progression_formula, "minor");

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            GeneratorConfig::load_or_default(&path),
            Err(ConfigError::Json(_))
        ));
    }
}
