//! Competitor entity
//!
//! One record per registered participant. The record is mutated only by the
//! race monitor; everything else gets shared references.

use crate::config::{RaceConfig, SHOTS_PER_LINE};
use crate::types::{CompetitorId, Timestamp};
use chrono::Duration;
use std::fmt;
use std::sync::Arc;

/// Race status of a competitor
///
/// `NotStarted` is initial, `Started` is transient, `NotFinished` and
/// `Finished` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompetitorStatus {
    #[default]
    NotStarted,
    Started,
    NotFinished,
    Finished,
}

impl CompetitorStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, CompetitorStatus::NotFinished | CompetitorStatus::Finished)
    }
}

impl fmt::Display for CompetitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompetitorStatus::NotStarted => write!(f, "NotStarted"),
            CompetitorStatus::Started => write!(f, "Started"),
            CompetitorStatus::NotFinished => write!(f, "NotFinished"),
            CompetitorStatus::Finished => write!(f, "Finished"),
        }
    }
}

/// Per-competitor race state
#[derive(Debug, Clone)]
pub struct Competitor {
    config: Arc<RaceConfig>,

    pub id: CompetitorId,
    pub status: CompetitorStatus,

    /// Reached the start line
    pub arrived: bool,
    /// Currently inside a firing line
    pub is_firing: bool,
    /// Sticky; a disqualified competitor is never mutated again
    pub disqualified: bool,

    pub planned_start_time: Timestamp,
    pub actual_start_time: Option<Timestamp>,
    /// Clock base of the lap in progress. Set to the planned start on
    /// `Started`, so an early or late departure is charged to lap one.
    pub lap_start_time: Option<Timestamp>,
    /// Entry time of the penalty loop currently being run
    pub penalty_start_time: Option<Timestamp>,

    pub firing_lines_completed: u32,
    /// Successful hits over all firing lines
    pub hits: u32,
    /// Hits on the firing line in progress
    pub line_hits: u32,
    /// Elapsed time of each completed main lap
    pub laps: Vec<Duration>,
    /// Cumulative time over all penalty-loop visits
    pub penalty_laps: Duration,
}

impl Competitor {
    pub fn new(id: CompetitorId, config: Arc<RaceConfig>, planned_start_time: Timestamp) -> Self {
        Self {
            config,
            id,
            status: CompetitorStatus::NotStarted,
            arrived: false,
            is_firing: false,
            disqualified: false,
            planned_start_time,
            actual_start_time: None,
            lap_start_time: None,
            penalty_start_time: None,
            firing_lines_completed: 0,
            hits: 0,
            line_hits: 0,
            laps: Vec::new(),
            penalty_laps: Duration::zero(),
        }
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// `lap_start_time - planned_start_time`; for a finished competitor this
    /// is the total race time including the start offset.
    pub fn time_from_planned_start(&self) -> Option<Duration> {
        self.lap_start_time
            .map(|lap_start| lap_start - self.planned_start_time)
    }

    pub fn total_shots(&self) -> u32 {
        self.firing_lines_completed * SHOTS_PER_LINE
    }

    pub fn misses(&self) -> u32 {
        self.total_shots().saturating_sub(self.hits)
    }

    /// Distance covered in penalty loops: one loop per missed shot
    pub fn penalty_distance(&self) -> u32 {
        self.config.penalty_len * self.misses()
    }

    pub fn has_finished_all_laps(&self) -> bool {
        self.laps.len() >= self.config.laps as usize
    }
}
