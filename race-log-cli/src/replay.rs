//! Consumer side of a race replay
//!
//! Pulls events from the scanner thread, feeds them to the monitor and
//! writes the transcript: every digested event, the outgoing event it
//! caused, the disqualifications still queued at the end, and the final
//! report.

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::select;
use race_log_engine::{
    render_competitor, render_event, CancellationToken, Event, RaceError, RaceMonitor,
    ScannerHandle, REPORT_HEADER,
};
use std::io::Write;

/// Summary of a finished replay
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Incoming events digested
    pub events: usize,
    /// Outgoing events written, drained disqualifications included
    pub outgoing: usize,
    /// The run was stopped by the cancellation token
    pub interrupted: bool,
}

/// Replay everything the scanner delivers, then write the report
///
/// Data errors (parse, ordering, structural, semantic) abort the run
/// without a report. Cancellation stops reading but still reports.
pub fn run<W: Write>(
    monitor: &mut RaceMonitor,
    scanner: &ScannerHandle,
    cancel: &CancellationToken,
    out: &mut W,
) -> Result<ReplayOutcome> {
    let mut outcome = ReplayOutcome::default();

    loop {
        select! {
            recv(scanner.events) -> msg => match msg {
                Ok(event) => digest(monitor, &event, out, &mut outcome)?,
                Err(_) => {
                    // events close after the scanner queued its last error
                    if let Ok(e) = scanner.errors.try_recv() {
                        stop_on(e, &mut outcome)?;
                    }
                    break;
                }
            },
            recv(scanner.errors) -> msg => {
                // the scanner has stopped; whatever it sent before is buffered
                for event in scanner.events.try_iter() {
                    digest(monitor, &event, out, &mut outcome)?;
                }
                if let Ok(e) = msg {
                    stop_on(e, &mut outcome)?;
                }
                break;
            }
            recv(cancel.receiver()) -> _ => {
                log::warn!("Interrupted, reporting the race so far");
                outcome.interrupted = true;
                break;
            }
        }
    }

    for event in monitor.drain_pending() {
        writeln!(out, "{}", render_event(&event))?;
        outcome.outgoing += 1;
    }

    writeln!(out, "{}", REPORT_HEADER)?;
    for comp in monitor.report() {
        match render_competitor(comp) {
            Ok(line) => writeln!(out, "{}", line)?,
            Err(e) => log::warn!("Skipping report line: {}", e),
        }
    }
    out.flush()?;

    log::info!(
        "Replayed {} events, {} outgoing",
        outcome.events,
        outcome.outgoing
    );
    Ok(outcome)
}

fn digest<W: Write>(
    monitor: &mut RaceMonitor,
    event: &Event,
    out: &mut W,
    outcome: &mut ReplayOutcome,
) -> Result<()> {
    let outgoing = monitor
        .digest(event)
        .with_context(|| format!("Failed to apply event: {}", render_event(event)))?;
    outcome.events += 1;

    writeln!(out, "{}", render_event(event))?;
    if let Some(outgoing) = outgoing {
        writeln!(out, "{}", render_event(&outgoing))?;
        outcome.outgoing += 1;
    }
    Ok(())
}

/// Turn the scanner's terminal error into the run's result
fn stop_on(error: RaceError, outcome: &mut ReplayOutcome) -> Result<()> {
    if error.is_cancellation() {
        outcome.interrupted = true;
        return Ok(());
    }
    Err(anyhow!(error).context("Error during event scan"))
}
