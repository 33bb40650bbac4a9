//! Race Log Engine Library
//!
//! Replays the event log of a biathlon-style race and reconstructs every
//! competitor's state: start, laps, firing lines and penalty loops.
//!
//! # Architecture
//!
//! - [`source`] reads log lines and enforces timestamp order
//! - [`parser`] and [`validation`] turn a line into a well-formed [`Event`]
//! - [`RaceMonitor`] is the state machine; it owns the
//!   [`CompetitorRegistry`] and emits outgoing events (finish,
//!   disqualification)
//! - [`report`] renders the final standings
//!
//! The library does no I/O on stdout and never looks at the wall clock. The
//! application layer (race-log-cli) wires the pieces together.
//!
//! # Example Usage
//!
//! ```no_run
//! use race_log_engine::{read_events, RaceConfig, RaceMonitor};
//!
//! let config = RaceConfig::new()
//!     .with_laps(2)
//!     .with_lap_len(3651)
//!     .with_penalty_len(50)
//!     .with_firing_lines(1)
//!     .with_start("09:30:00")
//!     .with_start_delta("00:00:30");
//!
//! let mut monitor = RaceMonitor::new(config);
//! for event in read_events("events.log").unwrap() {
//!     println!("{}", event);
//!     if let Some(outgoing) = monitor.digest(&event).unwrap() {
//!         println!("{}", outgoing);
//!     }
//! }
//! for outgoing in monitor.drain_pending() {
//!     println!("{}", outgoing);
//! }
//! ```

pub mod competitor;
pub mod config;
pub mod event;
pub mod monitor;
pub mod parser;
pub mod registry;
pub mod report;
pub mod source;
pub mod types;
pub mod validation;

// Re-export main types for convenience
pub use competitor::{Competitor, CompetitorStatus};
pub use config::{RaceConfig, SHOTS_PER_LINE};
pub use event::{Direction, Event, EventKind, Payload, PayloadShape};
pub use monitor::RaceMonitor;
pub use parser::parse_event_line;
pub use registry::CompetitorRegistry;
pub use report::{render_competitor, render_event, REPORT_HEADER};
pub use source::{read_events, spawn_scanner, CancellationToken, EventReader, ScannerHandle};
pub use types::{
    format_duration, format_instant, parse_instant, CompetitorId, RaceError, Result, Timestamp,
};
pub use validation::validate;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
