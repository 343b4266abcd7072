// Rendering collaborators.
//
// A `Renderer` turns one `RenderJob` into files next to the job's stem. The
// batch driver only talks to this trait, so the same plan can be rendered
// by the full toolchain, by the MIDI writer alone, or by a test double.
//
// The full toolchain, per job:
//   1. `{stem}.mid` via `midi.rs`
//   2. `{stem}.ly` via `lilypond.rs`, engraved to `{stem}.png` by `lilypond`
//   3. `{stem}.{fmt}` for each audio format via `fluidsynth`
//   4. `{stem}.{transcode_to}` from `{stem}.{transcode_from}` via `ffmpeg`
// Stages 2-4 are toggled by `ToolSettings`. A stage failure fails the job;
// files from earlier stages stay on disk.

use crate::batch::RenderJob;
use crate::config::{GeneratorConfig, MidiSettings, ToolSettings};
use crate::error::RenderError;
use crate::layout::with_extension;
use crate::lilypond::tones_to_lilypond;
use crate::midi::write_midi;
use crate::tools::ExternalTool;
use std::ffi::OsStr;
use std::path::Path;

pub trait Renderer {
    fn render(&mut self, job: &RenderJob) -> Result<(), RenderError>;
}

/// Writes only the `.mid` file of each job.
#[derive(Debug, Clone)]
pub struct MidiOnlyRenderer {
    midi: MidiSettings,
}

impl MidiOnlyRenderer {
    pub fn new(midi: MidiSettings) -> Self {
        MidiOnlyRenderer { midi }
    }
}

impl Renderer for MidiOnlyRenderer {
    fn render(&mut self, job: &RenderJob) -> Result<(), RenderError> {
        write_midi(&job.tones, &self.midi, &with_extension(&job.stem, "mid"))
    }
}

/// MIDI, engraved notation, synthesized audio and a transcoded copy.
#[derive(Debug)]
pub struct ToolchainRenderer {
    midi: MidiSettings,
    tools: ToolSettings,
    lilypond: Option<ExternalTool>,
    fluidsynth: Option<ExternalTool>,
    ffmpeg: Option<ExternalTool>,
}

impl ToolchainRenderer {
    /// Resolve the executables for every enabled stage. Fails on the first
    /// one missing from PATH, or if audio is enabled without a soundfont.
    pub fn new(config: &GeneratorConfig) -> Result<Self, RenderError> {
        let tools = &config.tools;
        let resolve_if = |enabled: bool, name: &str| -> Result<Option<ExternalTool>, RenderError> {
            if enabled {
                ExternalTool::resolve(name).map(Some)
            } else {
                Ok(None)
            }
        };

        let lilypond = resolve_if(tools.notation, &tools.lilypond)?;
        let fluidsynth = resolve_if(tools.audio, &tools.fluidsynth)?;
        let ffmpeg = resolve_if(tools.transcode, &tools.ffmpeg)?;

        if tools.audio && !tools.soundfont.is_file() {
            return Err(RenderError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("soundfont not found: {}", tools.soundfont.display()),
            )));
        }

        Ok(ToolchainRenderer {
            midi: config.midi.clone(),
            tools: tools.clone(),
            lilypond,
            fluidsynth,
            ffmpeg,
        })
    }

    fn engrave(&self, lilypond: &ExternalTool, job: &RenderJob) -> Result<(), RenderError> {
        let ly_path = with_extension(&job.stem, "ly");
        let source = tones_to_lilypond(&job.tones, &self.midi, &job.title, job.key.as_deref());
        std::fs::write(&ly_path, source)?;

        let resolution = format!("-dresolution={}", self.tools.png_resolution);
        let args: [&OsStr; 6] = [
            "--png".as_ref(),
            resolution.as_ref(),
            "-dno-point-and-click".as_ref(),
            "-o".as_ref(),
            job.stem.as_os_str(),
            ly_path.as_os_str(),
        ];
        lilypond.run(args)?;

        if !self.tools.keep_sources {
            std::fs::remove_file(&ly_path)?;
        }
        Ok(())
    }

    fn synthesize(&self, fluidsynth: &ExternalTool, midi_path: &Path, job: &RenderJob) -> Result<(), RenderError> {
        let rate = self.tools.sample_rate.to_string();
        for format in &self.tools.audio_formats {
            let audio_path = with_extension(&job.stem, format);
            let args: [&OsStr; 7] = [
                "-ni".as_ref(),
                "-F".as_ref(),
                audio_path.as_os_str(),
                "-r".as_ref(),
                rate.as_ref(),
                self.tools.soundfont.as_os_str(),
                midi_path.as_os_str(),
            ];
            fluidsynth.run(args)?;
        }
        Ok(())
    }

    fn transcode(&self, ffmpeg: &ExternalTool, job: &RenderJob) -> Result<(), RenderError> {
        let input = with_extension(&job.stem, &self.tools.transcode_from);
        let output = with_extension(&job.stem, &self.tools.transcode_to);
        let args: [&OsStr; 6] = [
            "-y".as_ref(),
            "-loglevel".as_ref(),
            "error".as_ref(),
            "-i".as_ref(),
            input.as_os_str(),
            output.as_os_str(),
        ];
        ffmpeg.run(args)
    }
}

impl Renderer for ToolchainRenderer {
    fn render(&mut self, job: &RenderJob) -> Result<(), RenderError> {
        let midi_path = with_extension(&job.stem, "mid");
        write_midi(&job.tones, &self.midi, &midi_path)?;

        if let Some(lilypond) = &self.lilypond {
            self.engrave(lilypond, job)?;
        }
        if let Some(fluidsynth) = &self.fluidsynth {
            self.synthesize(fluidsynth, &midi_path, job)?;
        }
        if let Some(ffmpeg) = &self.ffmpeg {
            self.transcode(ffmpeg, job)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::AssetKind;
    use chordbook_theory::pitch::PitchClass;

    fn job(stem: &Path) -> RenderJob {
        RenderJob {
            kind: AssetKind::Chord,
            title: "C_major".to_string(),
            stem: stem.to_path_buf(),
            tones: [0, 4, 7].iter().map(|&v| PitchClass::new(v)).collect(),
            key: None,
        }
    }

    #[test]
    fn test_midi_only_renderer_writes_mid() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("C_major");
        let mut renderer = MidiOnlyRenderer::new(MidiSettings::default());
        renderer.render(&job(&stem)).unwrap();
        assert!(dir.path().join("C_major.mid").is_file());
    }

    #[test]
    fn test_midi_only_renderer_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("absent").join("C_major");
        let mut renderer = MidiOnlyRenderer::new(MidiSettings::default());
        assert!(matches!(renderer.render(&job(&stem)), Err(RenderError::Io(_))));
    }

    #[test]
    fn test_toolchain_with_stages_disabled_needs_no_tools() {
        let mut config = GeneratorConfig::default();
        config.tools.notation = false;
        config.tools.audio = false;
        config.tools.transcode = false;
        let mut renderer = ToolchainRenderer::new(&config).unwrap();

        let dir = tempfile::tempdir().unwrap();
        renderer.render(&job(&dir.path().join("C_major"))).unwrap();
        assert!(dir.path().join("C_major.mid").is_file());
        assert!(!dir.path().join("C_major.ly").exists());
    }

    #[test]
    fn test_toolchain_reports_missing_tool() {
        let mut config = GeneratorConfig::default();
        config.tools.lilypond = "chordbook-no-such-lilypond".to_string();
        config.tools.audio = false;
        config.tools.transcode = false;
        assert!(matches!(
            ToolchainRenderer::new(&config),
            Err(RenderError::ToolMissing { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_toolchain_surfaces_tool_failure() {
        // `false` resolves on PATH and always exits non-zero.
        let mut config = GeneratorConfig::default();
        config.tools.lilypond = "false".to_string();
        config.tools.audio = false;
        config.tools.transcode = false;
        config.tools.keep_sources = true;
        let mut renderer = ToolchainRenderer::new(&config).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let result = renderer.render(&job(&dir.path().join("C_major")));
        assert!(matches!(result, Err(RenderError::ToolFailed { .. })));
        assert!(dir.path().join("C_major.mid").is_file());
        assert!(dir.path().join("C_major.ly").is_file());
    }
}
