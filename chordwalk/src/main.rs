// Chordwalk CLI entry point.
//
// Reads a JSON array of notes, extends it with the Markov walk, and writes
// the generated notes as JSON. Logs go to stderr so stdout stays parseable.
//
// Usage:
//   chordwalk [INPUT.json] [--output OUT.json] [--config CONFIG.json]
//     [--tick S] [--extend S] [--variation P] [--loosen] [--include-new]
//     [--seed N] [--merge]
//
// With no INPUT the notes are read from stdin. Flags override values from
// the config file. Set RUST_LOG=debug to see model statistics.

use anyhow::{Context, Result};
use chordwalk::{ContinuationConfig, Note, continue_notes};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Extend a note sequence using its own chord, duration and velocity statistics.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file with the input notes (stdin when omitted)
    input: Option<PathBuf>,

    /// Write generated notes here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Quantization grain in seconds
    #[arg(long)]
    tick: Option<f64>,

    /// Seconds to extend past the input's end
    #[arg(long)]
    extend: Option<f64>,

    /// Probability of ignoring learned transitions (0-1)
    #[arg(long)]
    variation: Option<f64>,

    /// Count every sub-chord of each chord
    #[arg(long)]
    loosen: bool,

    /// Feed generated symbols back into the model
    #[arg(long)]
    include_new: bool,

    /// RNG seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Emit the input notes followed by the generated ones
    #[arg(long)]
    merge: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    let notes = read_notes(args.input.as_deref())?;

    info!(
        notes = notes.len(),
        tick = config.params.tick,
        extend = config.params.extend_duration,
        variation = config.params.variation,
        loosen = config.params.loosen,
        include_new = config.params.include_new,
        seed = ?config.seed,
        "extending input"
    );

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let continuation = continue_notes(&notes, &config.params, &mut rng)
        .context("generating continuation")?;

    info!(
        segments = continuation.segments.len(),
        generated = continuation.notes.len(),
        input_end = continuation.input_end,
        generated_end = continuation.generated_end(config.params.tick),
        "done"
    );

    let output: Vec<Note> = if args.merge {
        notes.iter().chain(&continuation.notes).copied().collect()
    } else {
        continuation.notes
    };
    write_notes(args.output.as_deref(), &output)
}

/// Config file (or defaults) with command-line overrides applied.
fn build_config(args: &Args) -> Result<ContinuationConfig> {
    let mut config = match &args.config {
        Some(path) => ContinuationConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ContinuationConfig::default(),
    };
    if let Some(tick) = args.tick {
        config.params.tick = tick;
    }
    if let Some(extend) = args.extend {
        config.params.extend_duration = extend;
    }
    if let Some(variation) = args.variation {
        config.params.variation = variation;
    }
    config.params.loosen |= args.loosen;
    config.params.include_new |= args.include_new;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate().context("invalid settings")?;
    Ok(config)
}

fn read_notes(path: Option<&Path>) -> Result<Vec<Note>> {
    let data = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading notes from stdin")?;
            buf
        }
    };
    serde_json::from_str(&data).context("parsing note list")
}

fn write_notes(path: Option<&Path>, notes: &[Note]) -> Result<()> {
    let json = serde_json::to_string_pretty(notes)?;
    match path {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "wrote generated notes");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}
