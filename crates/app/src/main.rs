mod trace;

use std::{
    collections::BTreeMap,
    io::{self, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{Parser, Subcommand};
use cue_sync_core::{ActiveCue, EngineConfig, ManualClock, ShowStateEngine};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::trace::load_trace;

/// Extra time rendered after the last message so running cues can be seen
/// finishing.
const TAIL_SECONDS: f64 = 1.0;

fn main() -> cue_sync_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            trace,
            fps,
            every,
            config,
        } => run_replay(&trace, fps, every, config.as_deref()),
        Commands::Check { trace } => run_check(&trace),
    }
}

fn run_replay(
    trace: &Path,
    fps: u32,
    every: u32,
    config: Option<&Path>,
) -> cue_sync_core::Result<()> {
    let config = match config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    let entries = load_trace(trace)?;
    tracing::info!(?trace, messages = entries.len(), fps, "replaying trace");

    let clock = ManualClock::new();
    let mut engine = ShowStateEngine::with_clock(config, clock.clone());
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let frame_interval = 1.0 / f64::from(fps);
    let end = entries.last().map(|entry| entry.at).unwrap_or(0.0) + TAIL_SECONDS;
    let mut pending = entries.iter().peekable();
    let mut frame: u64 = 0;

    loop {
        let at = frame as f64 * frame_interval;
        if at > end {
            break;
        }

        while let Some(entry) = pending.next_if(|entry| entry.at <= at) {
            clock.set_elapsed(Duration::from_secs_f64(entry.at));
            engine.handle_message(&entry.message);
        }

        clock.set_elapsed(Duration::from_secs_f64(at));
        let projection = engine.tick_now();

        if frame.is_multiple_of(u64::from(every)) {
            let line = FrameOutput {
                at,
                cues: projection.iter().collect(),
            };
            serde_json::to_writer(&mut out, &line)?;
            writeln!(out)?;
        }
        frame += 1;
    }

    out.flush()?;
    Ok(())
}

fn run_check(trace: &Path) -> cue_sync_core::Result<()> {
    let entries = load_trace(trace)?;

    let mut kinds: BTreeMap<String, usize> = BTreeMap::new();
    for entry in &entries {
        *kinds.entry(entry.message.kind().to_string()).or_default() += 1;
    }

    tracing::info!(?trace, messages = entries.len(), "trace decoded");
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (kind, count) in kinds {
        writeln!(out, "{kind}\t{count}")?;
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    at: f64,
    cues: Vec<&'a ActiveCue>,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Replays show-control traces through the cue sync engine",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drive the engine from a recorded trace and print the projected cues.
    Replay {
        /// JSON-lines trace of `{"at": seconds, "message": envelope}` records.
        trace: PathBuf,
        /// Frames rendered per second of trace time.
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
        fps: u32,
        /// Only print every n-th frame.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        every: u32,
        /// Optional engine configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Decode a trace and count its messages by kind.
    Check {
        /// JSON-lines trace to validate.
        trace: PathBuf,
    },
}
