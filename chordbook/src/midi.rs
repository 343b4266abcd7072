// MIDI output for note sequences.
//
// Every asset is a flat sequence of pitch classes played one after another:
// a scale walks its degrees, a chord is arpeggiated in formula order, and a
// progression arpeggiates each chord in turn. Each tone becomes a NoteOn at
// delta 0 followed by a NoteOff `note_ticks` later, at key
// `base_key + pitch_class`. Pitch classes carry no octave, so every key lands
// in the same 12-key window.
//
// Uses the `midly` crate for MIDI writing. Output is SMF Format 0 (one track).

use crate::config::MidiSettings;
use crate::error::RenderError;
use chordbook_theory::pitch::PitchClass;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// All notes go out on the first channel.
const CHANNEL: u8 = 0;

/// Largest value a 24-bit tempo meta event can carry.
const MAX_TEMPO_MICROSECONDS: u32 = 0x00ff_ffff;

/// MIDI key for a pitch class under `settings`.
pub fn midi_key(settings: &MidiSettings, tone: PitchClass) -> u8 {
    settings.base_key + tone.value()
}

/// Encode `tones` and write them to `path`.
pub fn write_midi(tones: &[PitchClass], settings: &MidiSettings, path: &Path) -> Result<(), RenderError> {
    let bytes = encode_midi(tones, settings)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Encode `tones` as a Standard MIDI File in memory.
pub fn encode_midi(tones: &[PitchClass], settings: &MidiSettings) -> Result<Vec<u8>, RenderError> {
    let smf = tones_to_smf(tones, settings)?;
    let mut buf = Vec::new();
    smf.write_std(&mut buf)
        .map_err(|e| RenderError::Midi(e.to_string()))?;
    Ok(buf)
}

/// Microseconds per quarter note for `tempo_bpm`, checked against the
/// 24-bit field it is stored in.
fn tempo_microseconds(tempo_bpm: u16) -> Result<u24, RenderError> {
    if tempo_bpm == 0 {
        return Err(RenderError::Midi("tempo must be positive".to_string()));
    }
    let micros = 60_000_000 / u32::from(tempo_bpm);
    if micros > MAX_TEMPO_MICROSECONDS {
        return Err(RenderError::Midi(format!(
            "tempo {tempo_bpm} bpm is too slow for a MIDI tempo event"
        )));
    }
    Ok(u24::new(micros))
}

fn tones_to_smf(tones: &[PitchClass], settings: &MidiSettings) -> Result<Smf<'static>, RenderError> {
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(settings.ticks_per_quarter)),
    ));

    let channel = u4::new(CHANNEL);
    let velocity = u7::new(settings.velocity);
    let mut track: Track<'static> = Vec::with_capacity(tones.len() * 2 + 2);

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(tempo_microseconds(settings.tempo_bpm)?)),
    });

    for &tone in tones {
        let key = u7::new(midi_key(settings, tone));
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn { key, vel: velocity },
            },
        });
        track.push(TrackEvent {
            delta: u28::new(settings.note_ticks),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff { key, vel: velocity },
            },
        });
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    smf.tracks.push(track);
    Ok(smf)
}
