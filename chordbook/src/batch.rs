// Batch planning and execution.
//
// A run covers every root note × every registered scale type. For each pair
// `plan_batch` produces, without touching the filesystem:
// - one job for the scale itself,
// - one job per consonant chord built on each scale note (degrees 0..=7)
//   with each registered formula; degree 7 repeats the root's name, so its
//   chords collapse onto degree 0's and are planned once,
// - one job per progression, indexed into the degree slate built with
//   `progression_formula`. Progressions with indices past the slate are
//   recorded as skipped.
//
// `run_batch` then creates each scale's directories and hands every job to a
// `Renderer`. A failing job is logged and counted, and the run moves on.

use crate::config::GeneratorConfig;
use crate::layout::ScaleLayout;
use crate::lilypond::scale_key;
use crate::render::Renderer;
use chordbook_theory::chord::{Chord, degree_slate, generate_chord};
use chordbook_theory::consonance::is_consonant_chord;
use chordbook_theory::pitch::{NoteName, PitchClass};
use chordbook_theory::progression::generate_progression;
use chordbook_theory::scale::generate_scale;
use chordbook_theory::{TheoryError, TheoryTables};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Scale,
    Chord,
    Progression,
}

/// One asset to render: a tone sequence and where its files go.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub kind: AssetKind,
    /// Human-readable name, also used as the notation title.
    pub title: String,
    /// Output path without extension.
    pub stem: PathBuf,
    pub tones: Vec<PitchClass>,
    /// LilyPond `\key` command, for scales with a known mode.
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedProgression {
    pub scale: String,
    pub progression: String,
    pub error: TheoryError,
}

/// Everything planned for one (root, scale type) pair.
#[derive(Debug, Clone)]
pub struct ScaleBatch {
    pub layout: ScaleLayout,
    pub jobs: Vec<RenderJob>,
}

#[derive(Debug, Clone, Default)]
pub struct BatchPlan {
    pub scales: Vec<ScaleBatch>,
    /// Candidate chords rejected by the consonance filter.
    pub dissonant_chords: usize,
    /// Consonant chords already planned under the same name.
    pub duplicate_chords: usize,
    pub skipped_progressions: Vec<SkippedProgression>,
}

impl BatchPlan {
    pub fn job_count(&self) -> usize {
        self.scales.iter().map(|s| s.jobs.len()).sum()
    }

    pub fn jobs(&self) -> impl Iterator<Item = &RenderJob> {
        self.scales.iter().flat_map(|s| s.jobs.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSettings {
    pub output_dir: PathBuf,
    pub progression_formula: String,
}

impl From<&GeneratorConfig> for BatchSettings {
    fn from(config: &GeneratorConfig) -> Self {
        BatchSettings {
            output_dir: config.output_dir.clone(),
            progression_formula: config.progression_formula.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub rendered: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Plan the full batch. Fails only if `progression_formula` isn't registered.
pub fn plan_batch(tables: &TheoryTables, settings: &BatchSettings) -> Result<BatchPlan, TheoryError> {
    let slate_formula = tables.chord_formula(&settings.progression_formula)?;
    let mut plan = BatchPlan::default();

    for root in NoteName::ALL {
        for definition in &tables.scales {
            let scale = generate_scale(root, definition);
            let layout = ScaleLayout::new(&settings.output_dir, root, &definition.name);
            let mut jobs = vec![RenderJob {
                kind: AssetKind::Scale,
                title: layout.name.clone(),
                stem: layout.scale_stem(),
                tones: scale.notes.iter().map(|n| n.pitch_class()).collect(),
                key: scale_key(root, &definition.name),
            }];

            let mut chord_labels = BTreeSet::new();
            for &degree_root in &scale.notes {
                for formula in &tables.chord_formulas {
                    let chord = generate_chord(degree_root, formula);
                    if !is_consonant_chord(&chord) {
                        plan.dissonant_chords += 1;
                        continue;
                    }
                    let label = chord.label();
                    if !chord_labels.insert(label.clone()) {
                        plan.duplicate_chords += 1;
                        continue;
                    }
                    jobs.push(RenderJob {
                        kind: AssetKind::Chord,
                        stem: layout.chord_stem(&label),
                        title: label,
                        tones: chord.tones,
                        key: None,
                    });
                }
            }

            let slate = degree_slate(&scale, slate_formula);
            for progression in &tables.progressions {
                match generate_progression(&slate, &progression.degrees) {
                    Ok(chords) => jobs.push(RenderJob {
                        kind: AssetKind::Progression,
                        title: progression.name.clone(),
                        stem: layout.progression_stem(&progression.name),
                        tones: flatten(&chords),
                        key: None,
                    }),
                    Err(error) => plan.skipped_progressions.push(SkippedProgression {
                        scale: layout.name.clone(),
                        progression: progression.name.clone(),
                        error,
                    }),
                }
            }

            plan.scales.push(ScaleBatch { layout, jobs });
        }
    }
    Ok(plan)
}

/// Tones of each chord in order, chord after chord.
fn flatten(chords: &[Chord]) -> Vec<PitchClass> {
    chords.iter().flat_map(|c| c.tones.iter().copied()).collect()
}

/// Render every planned job. Never aborts: directory and render failures are
/// logged and counted.
pub fn run_batch<R: Renderer>(plan: &BatchPlan, renderer: &mut R) -> BatchSummary {
    let mut summary = BatchSummary {
        skipped: plan.skipped_progressions.len(),
        ..BatchSummary::default()
    };

    for skipped in &plan.skipped_progressions {
        warn!(
            "skipping progression {} for {}: {}",
            skipped.progression, skipped.scale, skipped.error
        );
    }

    for batch in &plan.scales {
        info!("generating {} ({} assets)", batch.layout.name, batch.jobs.len());
        if let Err(e) = batch.layout.create_dirs() {
            warn!("cannot create {}: {}", batch.layout.base.display(), e);
            summary.failed += batch.jobs.len();
            continue;
        }

        for job in &batch.jobs {
            debug!("rendering {:?} {}", job.kind, job.stem.display());
            match renderer.render(job) {
                Ok(()) => summary.rendered += 1,
                Err(e) => {
                    warn!("failed to render {}: {}", job.stem.display(), e);
                    summary.failed += 1;
                }
            }
        }
    }
    summary
}
