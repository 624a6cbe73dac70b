//! # PIPEWORKS Headless
//!
//! Runs one generation without a window and prints what it built.
//!
//! ```text
//! pipeworks_headless [--config PATH] [--seed N] [--max-frames N] [--realtime]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use pipeworks::{AppConfig, AppError, AppResult, DriverOptions, HeadlessDriver, RunSummary};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Parsed command line.
#[derive(Debug, Default)]
struct Args {
    config: Option<String>,
    seed: Option<u64>,
    max_frames: Option<u64>,
    realtime: bool,
}

fn parse_args() -> AppResult<Args> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = Some(value(&mut it, "--config")?),
            "--seed" => args.seed = Some(number(&mut it, "--seed")?),
            "--max-frames" => args.max_frames = Some(number(&mut it, "--max-frames")?),
            "--realtime" => args.realtime = true,
            other => return Err(AppError::Usage(format!("unknown argument: {other}"))),
        }
    }
    Ok(args)
}

fn value(it: &mut impl Iterator<Item = String>, flag: &str) -> AppResult<String> {
    it.next()
        .ok_or_else(|| AppError::Usage(format!("{flag} needs a value")))
}

fn number(it: &mut impl Iterator<Item = String>, flag: &str) -> AppResult<u64> {
    let raw = value(it, flag)?;
    raw.parse()
        .map_err(|_| AppError::Usage(format!("{flag} expects an unsigned integer, got {raw}")))
}

/// Seed for runs that did not pin one.
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

fn run() -> AppResult<RunSummary> {
    let args = parse_args()?;

    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    config.world.seed = args.seed.or(config.world.seed).or_else(|| Some(clock_seed()));

    let mut options = DriverOptions {
        realtime: args.realtime,
        ..DriverOptions::default()
    };
    if let Some(max_frames) = args.max_frames {
        options.max_frames = max_frames;
    }

    tracing::info!(
        bounds = ?config.world.bounds,
        max_pipes = config.world.max_pipes,
        seed = ?config.world.seed,
        "starting generation"
    );
    HeadlessDriver::new(config, options)?.run()
}

fn main() -> ExitCode {
    init_logging();

    match run() {
        Ok(summary) => {
            println!("═══════════════════════════════════════════════");
            println!("  PIPEWORKS generation {}", if summary.complete { "complete" } else { "incomplete" });
            println!("═══════════════════════════════════════════════");
            println!("  seed:        {}", summary.seed);
            println!("  pipes:       {}", summary.pipes);
            println!(
                "  voxels:      {}/{} ({:.1}%)",
                summary.used_voxels,
                summary.total_voxels,
                summary.fill_ratio * 100.0
            );
            println!("  frames:      {} ({} ticks)", summary.frames, summary.ticks);
            println!("  events:      {}", summary.events);
            println!(
                "  last frame:  {} draws, {} instances, {} triangles",
                summary.draw_calls, summary.instances, summary.triangles
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
