// Pairwise consonance test for chords.
//
// A chord is consonant when every pair of its tones forms an interval from
// `CONSONANT_INTERVALS`. The set keeps the literal 12 (octave) even though it
// reduces to the unison already listed.
//
// A pair is judged by its interval class: it passes if the semitone distance
// measured upward from either tone is allowed. A perfect fifth and its
// inversion (a fourth) both pass, so the verdict doesn't depend on the order
// tones are listed in.

use crate::chord::Chord;
use crate::pitch::PitchClass;

/// Allowed pairwise intervals, before reduction modulo 12.
pub const CONSONANT_INTERVALS: [u8; 7] = [0, 3, 4, 7, 8, 9, 12];

fn interval_allowed(semitones: u8) -> bool {
    CONSONANT_INTERVALS.iter().any(|&allowed| allowed % 12 == semitones)
}

/// Whether two tones form a consonant pair in either direction.
pub fn is_consonant_pair(a: PitchClass, b: PitchClass) -> bool {
    interval_allowed(a.interval_to(b)) || interval_allowed(b.interval_to(a))
}

/// Every unordered pair of tones is consonant. Short-circuits on the first
/// failing pair. Chords with fewer than two tones are trivially consonant.
pub fn is_consonant(tones: &[PitchClass]) -> bool {
    for (i, &a) in tones.iter().enumerate() {
        for &b in &tones[i + 1..] {
            if !is_consonant_pair(a, b) {
                return false;
            }
        }
    }
    true
}

pub fn is_consonant_chord(chord: &Chord) -> bool {
    is_consonant(&chord.tones)
}
