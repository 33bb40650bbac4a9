//! Race configuration types
//!
//! This module defines the immutable race parameters consumed by the engine.
//! Loading the record from disk is the application's job; the engine only
//! deserializes, validates and interprets it.

use crate::types::{time_of_day_as_duration, RaceError, Result, Timestamp};
use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

/// Shots fired on one firing line (targets are numbered 1..=5)
pub const SHOTS_PER_LINE: u32 = 5;

/// Race parameters shared read-only by every competitor
///
/// `start` and `start_delta` are kept in their textual form; the monitor
/// resolves them once on the first digested event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceConfig {
    /// Number of main laps
    pub laps: u32,

    /// Length of each main lap in meters
    pub lap_len: u32,

    /// Length of each penalty lap in meters
    pub penalty_len: u32,

    /// Number of firing lines per lap
    #[serde(default)]
    pub firing_lines: u32,

    /// Planned start of the first competitor, "HH:MM:SS" or "HH:MM:SS.mmm"
    pub start: String,

    /// Planned interval between starts, "HH:MM:SS"
    pub start_delta: String,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            laps: 1,
            lap_len: 1,
            penalty_len: 1,
            firing_lines: 0,
            start: "00:00:00".to_string(),
            start_delta: "00:00:00".to_string(),
        }
    }
}

impl RaceConfig {
    /// Create a new race configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the number of main laps
    pub fn with_laps(mut self, laps: u32) -> Self {
        self.laps = laps;
        self
    }

    /// Builder method: set the main lap length in meters
    pub fn with_lap_len(mut self, lap_len: u32) -> Self {
        self.lap_len = lap_len;
        self
    }

    /// Builder method: set the penalty lap length in meters
    pub fn with_penalty_len(mut self, penalty_len: u32) -> Self {
        self.penalty_len = penalty_len;
        self
    }

    /// Builder method: set the number of firing lines
    pub fn with_firing_lines(mut self, firing_lines: u32) -> Self {
        self.firing_lines = firing_lines;
        self
    }

    /// Builder method: set the planned first start
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = start.into();
        self
    }

    /// Builder method: set the interval between starts
    pub fn with_start_delta(mut self, start_delta: impl Into<String>) -> Self {
        self.start_delta = start_delta.into();
        self
    }

    /// Reject parameters no race can be run with
    pub fn validate(&self) -> Result<()> {
        if self.laps == 0 {
            return Err(RaceError::Config("lap count must be positive".to_string()));
        }
        if self.lap_len == 0 {
            return Err(RaceError::Config("lap length must be positive".to_string()));
        }
        if self.penalty_len == 0 {
            return Err(RaceError::Config(
                "penalty lap length must be positive".to_string(),
            ));
        }
        self.start_time()?;
        self.start_interval()?;
        Ok(())
    }

    /// Planned start of the first competitor
    pub fn start_time(&self) -> Result<Timestamp> {
        NaiveTime::parse_from_str(&self.start, "%H:%M:%S%.f").map_err(|e| {
            RaceError::Config(format!("start time '{}' is invalid: {}", self.start, e))
        })
    }

    /// Interval between planned starts (hours + minutes + seconds)
    pub fn start_interval(&self) -> Result<Duration> {
        let t = NaiveTime::parse_from_str(&self.start_delta, "%H:%M:%S").map_err(|e| {
            RaceError::Config(format!(
                "start interval '{}' is invalid: {}",
                self.start_delta, e
            ))
        })?;
        Ok(time_of_day_as_duration(t))
    }
}
