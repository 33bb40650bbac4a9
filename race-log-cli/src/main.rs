//! Race Log CLI Application
//!
//! Command-line front end for the race log engine. It loads the race
//! configuration, replays the event log (from a file, or interactively from
//! stdin until EOF) and prints every event followed by the final report.
//! Ctrl+C stops the replay and still prints the report.

use anyhow::{Context, Result};
use clap::Parser;
use race_log_engine::{spawn_scanner, CancellationToken, RaceMonitor};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

mod config;
mod replay;

/// Race Log - Replay a race event log and report the standings
#[derive(Parser, Debug)]
#[command(name = "race-log")]
#[command(about = "Replay a race event log and report the standings", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the race configuration (.json or .toml)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Path to the event log (default: read stdin until EOF)
    #[arg(value_name = "EVENTS")]
    events: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("Race Log CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using engine library v{}", race_log_engine::VERSION);

    log::info!("Loading configuration from: {:?}", args.config);
    let config = config::load_config(&args.config)?;
    log::debug!("Configuration loaded: {:?}", config);

    let source: Box<dyn BufRead + Send> = match &args.events {
        Some(path) => {
            log::info!("Replaying event log: {:?}", path);
            let file = File::open(path)
                .with_context(|| format!("Failed to open event log: {:?}", path))?;
            Box::new(BufReader::new(file))
        }
        None => {
            log::info!("Reading events from stdin, end with EOF");
            Box::new(BufReader::new(io::stdin()))
        }
    };

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    ctrlc::set_handler(move || on_signal.cancel())
        .context("Failed to install interrupt handler")?;

    let scanner = spawn_scanner(source, cancel.clone()).context("Failed to start event scanner")?;
    let mut monitor = RaceMonitor::new(config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let outcome = replay::run(&mut monitor, &scanner, &cancel, &mut out)?;

    if outcome.interrupted {
        log::warn!("Replay interrupted after {} events", outcome.events);
    } else if scanner.is_finished() {
        if scanner.join().is_err() {
            log::error!("Event scanner thread panicked");
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity level
///
/// Logs go to stderr; stdout only carries event and report lines.
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::{Builder, Target};
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .target(Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
