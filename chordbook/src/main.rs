// Chordbook — CLI entry point.
//
// Generates the full reference tree: every root note × scale type, with the
// scale itself, its consonant chords and its progressions. Runs over the
// whole input space with no arguments; the options below only override the
// config.
//
// Usage:
//   chordbook [--config FILE] [--output DIR] [--midi-only]
//
// Without --config, `chordbook.json` in the working directory is used if it
// exists. Set RUST_LOG=debug for per-asset logging.

use anyhow::{Context, Result};
use chordbook::batch::{BatchSettings, plan_batch, run_batch};
use chordbook::config::{DEFAULT_CONFIG_FILE, GeneratorConfig};
use chordbook::render::{MidiOnlyRenderer, ToolchainRenderer};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    midi_only: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let options = parse_args();

    let mut config = match &options.config {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GeneratorConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE))
            .with_context(|| format!("loading {DEFAULT_CONFIG_FILE}"))?,
    };
    if let Some(output) = options.output {
        config.output_dir = output;
    }

    let plan = plan_batch(&config.tables, &BatchSettings::from(&config))?;
    info!(
        "planned {} assets across {} scales ({} dissonant chords filtered, {} progressions skipped)",
        plan.job_count(),
        plan.scales.len(),
        plan.dissonant_chords,
        plan.skipped_progressions.len()
    );

    let summary = if options.midi_only {
        run_batch(&plan, &mut MidiOnlyRenderer::new(config.midi.clone()))
    } else {
        let mut renderer = ToolchainRenderer::new(&config)
            .context("rendering toolchain unavailable (use --midi-only to write MIDI alone)")?;
        run_batch(&plan, &mut renderer)
    };

    info!(
        "done: {} rendered, {} failed, {} skipped -> {}",
        summary.rendered,
        summary.failed,
        summary.skipped,
        config.output_dir.display()
    );
    if summary.rendered == 0 && summary.failed > 0 {
        anyhow::bail!("every asset failed to render");
    }
    Ok(())
}

/// Parse command-line arguments. Uses simple `std::env::args()` matching.
fn parse_args() -> Options {
    let mut options = Options::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                options.config = Some(args.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--config requires a file path");
                    std::process::exit(1);
                }));
            }
            "--output" => {
                i += 1;
                options.output = Some(args.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--output requires a directory");
                    std::process::exit(1);
                }));
            }
            "--midi-only" => options.midi_only = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    options
}

fn print_usage() {
    println!("Usage: chordbook [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <FILE>   Generator config (default: {DEFAULT_CONFIG_FILE} if present)");
    println!("  --output <DIR>    Output directory (overrides config)");
    println!("  --midi-only       Write MIDI files only; skip notation and audio");
    println!("  --help, -h        Show this help");
}
