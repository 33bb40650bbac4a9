//! Event source
//!
//! Reads the race log line by line and turns it into a stream of incoming
//! events. [`EventReader`] is the synchronous iterator; [`spawn_scanner`]
//! runs the same reader on its own thread and hands events over a bounded
//! channel so the consumer can multiplex them with a [`CancellationToken`].
//!
//! The source owns the ordering check: timestamps must never go backwards.

use crate::event::Event;
use crate::parser::parse_event_line;
use crate::types::{format_instant, RaceError, Result, Timestamp};
use crossbeam_channel::{bounded, select, Receiver, Sender};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Iterator over the events of a race log
///
/// Blank lines are skipped. The iterator yields at most one error and ends
/// right after it.
pub struct EventReader<R> {
    lines: Lines<R>,
    line_no: usize,
    last_time: Option<Timestamp>,
    done: bool,
}

impl<R: BufRead> EventReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            last_time: None,
            done: false,
        }
    }

    /// Number of lines consumed so far, blank lines included
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    fn check_order(&mut self, event: Event) -> Result<Event> {
        if let Some(previous) = self.last_time {
            if event.time < previous {
                return Err(RaceError::Ordering {
                    previous: format_instant(previous),
                    current: format_instant(event.time),
                });
            }
        }
        self.last_time = Some(event.time);
        Ok(event)
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            };
            self.line_no += 1;

            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let result = parse_event_line(line)
                .map_err(|e| e.at_line(self.line_no))
                .and_then(|event| self.check_order(event));
            if result.is_err() {
                self.done = true;
            }
            return Some(result);
        }
    }
}

/// Read a whole event log file
pub fn read_events(path: impl AsRef<Path>) -> Result<Vec<Event>> {
    let path = path.as_ref();
    log::info!("Reading event log: {:?}", path);

    let file = File::open(path)?;
    let events = EventReader::new(BufReader::new(file)).collect::<Result<Vec<_>>>()?;

    log::debug!("Read {} events from {:?}", events.len(), path);
    Ok(events)
}

/// Shared cancellation flag
///
/// Cancelling closes an internal channel, so [`CancellationToken::receiver`]
/// becomes ready in every `select!` that waits on it.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

#[derive(Debug)]
struct TokenInner {
    cancelled: AtomicBool,
    trigger: Mutex<Option<Sender<()>>>,
    signal: Receiver<()>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (trigger, signal) = bounded(0);
        Self {
            inner: Arc::new(TokenInner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                signal,
            }),
        }
    }

    /// Request cancellation. Calling it again has no further effect.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        log::debug!("Cancellation requested");
        match self.inner.trigger.lock() {
            Ok(mut trigger) => drop(trigger.take()),
            Err(poisoned) => drop(poisoned.into_inner().take()),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Channel that disconnects once the token is cancelled; only useful
    /// as a `select!` arm.
    pub fn receiver(&self) -> &Receiver<()> {
        &self.inner.signal
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumer side of a running scanner thread
pub struct ScannerHandle {
    /// Parsed events, in log order. Disconnects when the scan stops.
    pub events: Receiver<Event>,
    /// At most one terminal error: parse, ordering, I/O or cancellation
    pub errors: Receiver<RaceError>,
    thread: JoinHandle<()>,
}

impl ScannerHandle {
    /// Wait for the scanner thread to exit
    ///
    /// Blocks for as long as the underlying reader does; do not call this
    /// while stdin might still be waiting for input.
    pub fn join(self) -> std::thread::Result<()> {
        self.thread.join()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

/// Start scanning `reader` on a background thread
///
/// Events are handed over one at a time. The scanner stops at the first
/// error, when the token is cancelled, or when the consumer drops the
/// events receiver.
pub fn spawn_scanner<R>(reader: R, cancel: CancellationToken) -> Result<ScannerHandle>
where
    R: BufRead + Send + 'static,
{
    let (event_tx, events) = bounded(1);
    let (error_tx, errors) = bounded(1);

    let thread = thread::Builder::new()
        .name("event-scanner".to_string())
        .spawn(move || scan(reader, &cancel, &event_tx, &error_tx))?;

    Ok(ScannerHandle {
        events,
        errors,
        thread,
    })
}

fn scan<R: BufRead>(
    reader: R,
    cancel: &CancellationToken,
    events: &Sender<Event>,
    errors: &Sender<RaceError>,
) {
    let mut reader = EventReader::new(reader);
    let mut sent = 0usize;

    while let Some(item) = reader.next() {
        if cancel.is_cancelled() {
            let _ = errors.send(RaceError::Cancelled);
            return;
        }

        let event = match item {
            Ok(event) => event,
            Err(e) => {
                log::debug!("Scanner stopped at line {}: {}", reader.line_no(), e);
                let _ = errors.send(e);
                return;
            }
        };

        select! {
            send(events, event) -> res => {
                if res.is_err() {
                    log::debug!("Event consumer went away after {} events", sent);
                    return;
                }
                sent += 1;
            }
            recv(cancel.receiver()) -> _ => {
                let _ = errors.send(RaceError::Cancelled);
                return;
            }
        }
    }

    log::debug!("Event source exhausted after {} events", sent);
}
