// Chordbook music-theory engine.
//
// Deterministic generation of scales, chords and chord progressions over a
// 12-tone pitch-class model, plus a pairwise consonance filter. Everything
// here is pure computation: no I/O apart from loading definition tables.
//
// Architecture:
// - pitch.rs: PitchClass (mod-12 arithmetic) and canonical NoteName labels
// - scale.rs: scale definitions (7 steps) and 8-note scale generation
// - chord.rs: chord formulas, chord generation, the per-degree chord slate
// - consonance.rs: order-independent pairwise interval filter
// - progression.rs: progression definitions and slate indexing
// - tables.rs: the read-only registry of built-in or JSON-loaded definitions
// - error.rs: TheoryError

pub mod chord;
pub mod consonance;
pub mod error;
pub mod pitch;
pub mod progression;
pub mod scale;
pub mod tables;

pub use error::TheoryError;
pub use tables::{TablesError, TheoryTables};
