// Output directory layout.
//
// One directory per (root, scale type) pair:
//
//   {output}/{root}_{scaleType}/{root}_{scaleType}.{mid,png,wav,flac,mp3}
//   {output}/{root}_{scaleType}/Chords/{chordRoot}_{chordName}.*
//   {output}/{root}_{scaleType}/Progressions/{progressionName}.*
//
// Paths here are stems without an extension; each renderer appends its own.

use chordbook_theory::pitch::NoteName;
use std::io;
use std::path::{Path, PathBuf};

pub const CHORDS_DIR: &str = "Chords";
pub const PROGRESSIONS_DIR: &str = "Progressions";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleLayout {
    /// `{root}_{scaleType}`, used for both the directory and the scale's own assets.
    pub name: String,
    pub base: PathBuf,
    pub chords: PathBuf,
    pub progressions: PathBuf,
}

impl ScaleLayout {
    pub fn new(output: &Path, root: NoteName, scale_type: &str) -> Self {
        let name = format!("{root}_{scale_type}");
        let base = output.join(&name);
        ScaleLayout {
            chords: base.join(CHORDS_DIR),
            progressions: base.join(PROGRESSIONS_DIR),
            name,
            base,
        }
    }

    pub fn scale_stem(&self) -> PathBuf {
        self.base.join(&self.name)
    }

    pub fn chord_stem(&self, chord_label: &str) -> PathBuf {
        self.chords.join(chord_label)
    }

    pub fn progression_stem(&self, progression: &str) -> PathBuf {
        self.progressions.join(progression)
    }

    /// Create the base, chord and progression directories.
    pub fn create_dirs(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.chords)?;
        std::fs::create_dir_all(&self.progressions)?;
        Ok(())
    }
}

/// `stem` with `.extension` appended. Unlike `Path::with_extension`, a dotted
/// suffix already in the stem is kept.
pub fn with_extension(stem: &Path, extension: &str) -> PathBuf {
    let mut path = stem.as_os_str().to_owned();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}
