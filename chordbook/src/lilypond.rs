// LilyPond scores for note sequences.
//
// Renders the same tone sequence `midi.rs` writes into a single-staff
// LilyPond (.ly) score, which `render.rs` hands to the `lilypond` executable
// to engrave a PNG. Scales get a key signature; chords and progressions are
// written without one.
//
// Durations are tracked in eighth-note beats. LilyPond needs each note value
// as a power-of-two duration (optionally dotted), and notes crossing a
// barline are split into tied segments, so a configured note length that
// isn't a plain quarter still engraves correctly.
//
// Uses absolute pitches (not \relative) and sharp spellings, matching the
// note names of the theory tables.

use crate::config::MidiSettings;
use crate::midi::midi_key;
use chordbook_theory::pitch::{NoteName, PitchClass};
use std::fmt::{self, Write};

/// Eighth-note beats per 4/4 bar.
const BAR_BEATS: usize = 8;

/// MIDI key LilyPond writes as a bare `c` (no octave marks).
const LY_UNMARKED_C: u8 = 48;

fn ly_note_name(name: NoteName) -> &'static str {
    match name {
        NoteName::C => "c",
        NoteName::CSharp => "cis",
        NoteName::D => "d",
        NoteName::DSharp => "dis",
        NoteName::E => "e",
        NoteName::F => "f",
        NoteName::FSharp => "fis",
        NoteName::G => "g",
        NoteName::GSharp => "gis",
        NoteName::A => "a",
        NoteName::ASharp => "ais",
        NoteName::B => "b",
    }
}

/// Absolute LilyPond pitch for a MIDI key: note name plus one `'` per
/// octave above MIDI 48, or one `,` per octave below it.
pub fn ly_pitch(key: u8) -> String {
    let name = PitchClass::new(i32::from(key)).name();
    let octaves = i32::from(key / 12) - i32::from(LY_UNMARKED_C / 12);
    let mark = if octaves < 0 { ',' } else { '\'' };
    let mut pitch = ly_note_name(name).to_string();
    pitch.extend(std::iter::repeat_n(mark, octaves.unsigned_abs() as usize));
    pitch
}

/// An engravable note length: a power-of-two value in eighth-note beats,
/// optionally dotted. Displays as a LilyPond duration (`2.`, `8`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NoteValue {
    base: usize,
    dotted: bool,
}

impl NoteValue {
    /// Longest value that fits in `beats` (at least one) without crossing
    /// into the next bar. Whole notes are never dotted.
    fn longest_within(beats: usize) -> Self {
        let base = 1 << beats.min(BAR_BEATS).ilog2();
        let dotted = base > 1 && base < BAR_BEATS && beats >= base + base / 2;
        NoteValue { base, dotted }
    }

    fn beats(self) -> usize {
        if self.dotted {
            self.base + self.base / 2
        } else {
            self.base
        }
    }
}

impl fmt::Display for NoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", BAR_BEATS / self.base)?;
        if self.dotted {
            f.write_str(".")?;
        }
        Ok(())
    }
}

/// Note values covering `beats`, longest first. Played in sequence and
/// tied they sound as a single note.
fn note_values(mut beats: usize) -> impl Iterator<Item = NoteValue> {
    std::iter::from_fn(move || {
        if beats == 0 {
            return None;
        }
        let value = NoteValue::longest_within(beats);
        beats -= value.beats();
        Some(value)
    })
}

/// Lengths of the pieces of a note starting at `start` and lasting `len`
/// beats, cut wherever it crosses a barline.
fn bar_segments(start: usize, len: usize) -> impl Iterator<Item = usize> {
    let end = start + len;
    let mut pos = start;
    std::iter::from_fn(move || {
        if pos >= end {
            return None;
        }
        let next_bar = (pos / BAR_BEATS + 1) * BAR_BEATS;
        let segment = next_bar.min(end) - pos;
        pos += segment;
        Some(segment)
    })
}

/// Note length in eighth-note beats, rounded to the nearest eighth and never
/// shorter than one.
pub fn note_beats(settings: &MidiSettings) -> usize {
    let ticks_per_eighth = (settings.ticks_per_quarter as u32 / 2).max(1);
    let beats = (settings.note_ticks + ticks_per_eighth / 2) / ticks_per_eighth;
    beats.max(1) as usize
}

/// LilyPond mode keyword for a scale type, if LilyPond has one.
fn ly_mode(scale_type: &str) -> Option<&'static str> {
    match scale_type {
        "major" | "ionian" => Some("major"),
        "natural_minor" | "harmonic_minor" | "melodic_minor" | "aeolian" => Some("minor"),
        "dorian" => Some("dorian"),
        "phrygian" => Some("phrygian"),
        "lydian" => Some("lydian"),
        "mixolydian" => Some("mixolydian"),
        "locrian" => Some("locrian"),
        _ => None,
    }
}

/// `\key` command for a scale, or `None` for scale types without a
/// LilyPond mode.
pub fn scale_key(root: NoteName, scale_type: &str) -> Option<String> {
    let mode = ly_mode(scale_type)?;
    Some(format!("\\key {} \\{mode}", ly_note_name(root)))
}

/// Render the tones as a LilyPond music expression.
fn render_music(tones: &[PitchClass], settings: &MidiSettings) -> String {
    let duration = note_beats(settings);
    let mut tokens: Vec<String> = Vec::with_capacity(tones.len());

    for (index, &tone) in tones.iter().enumerate() {
        let pitch = ly_pitch(midi_key(settings, tone));
        let values: Vec<NoteValue> = bar_segments(index * duration, duration)
            .flat_map(note_values)
            .collect();
        let last = values.len().saturating_sub(1);
        for (i, value) in values.into_iter().enumerate() {
            let tie = if i < last { "~" } else { "" };
            tokens.push(format!("{pitch}{value}{tie}"));
        }
    }

    // Rest out the final bar.
    let filled = tones.len() * duration % BAR_BEATS;
    if filled > 0 {
        tokens.extend(note_values(BAR_BEATS - filled).map(|value| format!("r{value}")));
    }
    tokens.join(" ")
}

/// Generate a complete single-staff LilyPond file.
pub fn tones_to_lilypond(
    tones: &[PitchClass],
    settings: &MidiSettings,
    title: &str,
    key: Option<&str>,
) -> String {
    let mut ly = String::new();
    ly.push_str("\\version \"2.24.0\"\n\n");

    let title = title.replace('"', "\\\"");
    let _ = write!(ly, "\\header {{\n  title = \"{title}\"\n  tagline = ##f\n}}\n\n");

    ly.push_str("\\score {\n  \\new Staff {\n");
    if let Some(key) = key {
        let _ = writeln!(ly, "    {key}");
    }
    let _ = writeln!(ly, "    \\time 4/4 \\tempo 4 = {}", settings.tempo_bpm);
    let _ = writeln!(ly, "    \\absolute {{ {} }}", render_music(tones, settings));
    ly.push_str("  }\n  \\layout { }\n}\n");
    ly
}
