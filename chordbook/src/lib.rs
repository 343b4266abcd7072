// Chordbook batch generator.
//
// Drives the `chordbook_theory` engine over every root note and scale type
// and renders each scale, consonant chord and progression as MIDI, engraved
// notation and audio. Only MIDI is written in-process; notation, synthesis
// and transcoding shell out to `lilypond`, `fluidsynth` and `ffmpeg`.
//
// Architecture:
// - config.rs: GeneratorConfig (JSON-loadable, defaults for every field)
// - layout.rs: output directory tree per (root, scale type)
// - batch.rs: pure batch planning + fault-tolerant execution
// - render.rs: Renderer trait, MIDI-only and full-toolchain renderers
// - midi.rs: tone sequences to Standard MIDI Files
// - lilypond.rs: tone sequences to LilyPond scores
// - tools.rs: PATH resolution and invocation of external executables
// - error.rs: ConfigError, RenderError

pub mod batch;
pub mod config;
pub mod error;
pub mod layout;
pub mod lilypond;
pub mod midi;
pub mod render;
pub mod tools;
