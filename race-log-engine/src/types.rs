//! Core types for the race log engine
//!
//! This module defines the time representation shared by every other module,
//! the error taxonomy, and the fixed-width text forms of instants and
//! durations used in event and report lines.

use chrono::{Duration, NaiveTime, Timelike};

/// Instant of the race day with millisecond resolution.
///
/// All race time is data read from the log; nothing in the engine looks at
/// the wall clock.
pub type Timestamp = NaiveTime;

/// Competitor identifier as it appears in the log (positive).
pub type CompetitorId = u32;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, RaceError>;

/// Errors that can occur while replaying a race log
#[derive(Debug, thiserror::Error)]
pub enum RaceError {
    /// Malformed event: unknown kind, wrong payload shape, bad target number.
    #[error("Structural error: {0}")]
    Structural(String),

    /// Procedural rule violation detected by the race monitor.
    #[error("Semantic error: {0}")]
    Semantic(String),

    /// Timestamps went backwards in the event source.
    #[error("Event order error: {previous} > {current}")]
    Ordering { previous: String, current: String },

    /// A line of the event log could not be parsed.
    #[error("Parse error{}: {message}", .line.map(|n| format!(" at line {}", n)).unwrap_or_default())]
    Parse { line: Option<usize>, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The run was interrupted from outside before the source was exhausted.
    #[error("Event scan cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RaceError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        RaceError::Parse {
            line: None,
            message: message.into(),
        }
    }

    /// Attach a line number to a parse error; other variants pass through.
    pub(crate) fn at_line(self, line_no: usize) -> Self {
        match self {
            RaceError::Parse { line: None, message } => RaceError::Parse {
                line: Some(line_no),
                message,
            },
            other => other,
        }
    }

    /// True for the cancellation unwind, which is not a data error.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, RaceError::Cancelled)
    }
}

/// Parse an instant in the strict `HH:MM:SS.mmm` layout.
///
/// Exactly three fractional digits are required; `09:59:03` and
/// `09:59:03.8` are both rejected.
pub fn parse_instant(s: &str) -> Result<Timestamp> {
    let bytes = s.as_bytes();
    if !s.is_ascii() || bytes.len() != 12 || bytes[2] != b':' || bytes[5] != b':' || bytes[8] != b'.' {
        return Err(RaceError::parse(format!(
            "invalid time '{}', expected HH:MM:SS.mmm",
            s
        )));
    }

    let field = |range: std::ops::Range<usize>| -> Result<u32> {
        let part = &s[range];
        if !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RaceError::parse(format!("invalid time '{}'", s)));
        }
        part.parse::<u32>()
            .map_err(|e| RaceError::parse(format!("invalid time '{}': {}", s, e)))
    };

    let hour = field(0..2)?;
    let minute = field(3..5)?;
    let second = field(6..8)?;
    let milli = field(9..12)?;

    NaiveTime::from_hms_milli_opt(hour, minute, second, milli)
        .ok_or_else(|| RaceError::parse(format!("time out of range: '{}'", s)))
}

/// Render an instant as `HH:MM:SS.mmm`.
pub fn format_instant(t: Timestamp) -> String {
    t.format("%H:%M:%S%.3f").to_string()
}

/// Render a duration as `HH:MM:SS.mmm`.
///
/// Hours are not wrapped at 24; negative durations get a leading `-`.
pub fn format_duration(d: Duration) -> String {
    let total = d.num_milliseconds();
    let sign = if total < 0 { "-" } else { "" };
    let ms = total.unsigned_abs();

    format!(
        "{}{:02}:{:02}:{:02}.{:03}",
        sign,
        ms / 3_600_000,
        (ms / 60_000) % 60,
        (ms / 1_000) % 60,
        ms % 1_000
    )
}

/// `23:59:59.999`, the latest instant a race day can hold.
pub(crate) fn last_instant_of_day() -> Timestamp {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or_default()
}

/// Whole hours, minutes and seconds of a time-of-day shaped value as a span.
pub(crate) fn time_of_day_as_duration(t: NaiveTime) -> Duration {
    Duration::seconds(i64::from(t.num_seconds_from_midnight()))
}
