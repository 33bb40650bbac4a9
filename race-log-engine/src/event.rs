//! Race event model
//!
//! Every line of the race log becomes an [`Event`]. The kind catalogue is
//! closed: eleven incoming kinds read from the log and two outgoing kinds the
//! monitor synthesizes. The payload shape is a tagged union whose expected
//! variant is fixed by the kind; [`crate::validation::validate`] enforces the
//! pairing.

use crate::types::{format_instant, CompetitorId, Timestamp};
use std::fmt;

/// Where an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Read from the event source
    Incoming,
    /// Produced by the race monitor
    Outgoing,
}

/// Event kind catalogue
///
/// Incoming kinds are numbered 1..=11 as in the log; the outgoing kinds
/// use a separate range (32, 33) so they can never be confused with log
/// input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Register,
    StartTimeSet,
    OnStartLine,
    Started,
    OnRange,
    TargetHit,
    LeftRange,
    EnteredPenalty,
    LeftPenalty,
    LapCompleted,
    CannotContinue,

    Disqualified,
    Finished,

    /// An id outside the catalogue, kept so it can be reported
    Unknown(u32),
}

impl EventKind {
    /// Map a numeric kind id to its catalogue entry
    pub fn from_id(id: u32) -> Self {
        match id {
            1 => EventKind::Register,
            2 => EventKind::StartTimeSet,
            3 => EventKind::OnStartLine,
            4 => EventKind::Started,
            5 => EventKind::OnRange,
            6 => EventKind::TargetHit,
            7 => EventKind::LeftRange,
            8 => EventKind::EnteredPenalty,
            9 => EventKind::LeftPenalty,
            10 => EventKind::LapCompleted,
            11 => EventKind::CannotContinue,
            32 => EventKind::Disqualified,
            33 => EventKind::Finished,
            other => EventKind::Unknown(other),
        }
    }

    /// Numeric id of this kind
    pub fn id(self) -> u32 {
        match self {
            EventKind::Register => 1,
            EventKind::StartTimeSet => 2,
            EventKind::OnStartLine => 3,
            EventKind::Started => 4,
            EventKind::OnRange => 5,
            EventKind::TargetHit => 6,
            EventKind::LeftRange => 7,
            EventKind::EnteredPenalty => 8,
            EventKind::LeftPenalty => 9,
            EventKind::LapCompleted => 10,
            EventKind::CannotContinue => 11,
            EventKind::Disqualified => 32,
            EventKind::Finished => 33,
            EventKind::Unknown(id) => id,
        }
    }

    /// True for the kinds read from the log
    pub fn is_incoming(self) -> bool {
        matches!(self.id(), 1..=11) && !matches!(self, EventKind::Unknown(_))
    }

    /// Payload variant this kind carries
    pub fn expected_payload(self) -> PayloadShape {
        match self {
            EventKind::StartTimeSet => PayloadShape::Instant,
            EventKind::OnRange | EventKind::TargetHit => PayloadShape::Integer,
            EventKind::CannotContinue => PayloadShape::Text,
            _ => PayloadShape::None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Unknown(id) => write!(f, "Unknown({})", id),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Kind-dependent extra parameter of an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    None,
    /// Start time assigned by the draw
    Instant(Timestamp),
    /// Firing line number or target number
    Integer(i64),
    /// Reason a competitor cannot continue
    Text(String),
}

impl Payload {
    pub fn shape(&self) -> PayloadShape {
        match self {
            Payload::None => PayloadShape::None,
            Payload::Instant(_) => PayloadShape::Instant,
            Payload::Integer(_) => PayloadShape::Integer,
            Payload::Text(_) => PayloadShape::Text,
        }
    }
}

/// Variant tag of a [`Payload`], without the value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    None,
    Instant,
    Integer,
    Text,
}

impl fmt::Display for PayloadShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadShape::None => write!(f, "none"),
            PayloadShape::Instant => write!(f, "instant"),
            PayloadShape::Integer => write!(f, "integer"),
            PayloadShape::Text => write!(f, "text"),
        }
    }
}

/// A single race event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub direction: Direction,
    pub kind: EventKind,
    pub competitor: CompetitorId,
    pub time: Timestamp,
    pub payload: Payload,
}

impl Event {
    /// Create an incoming event
    pub fn incoming(
        kind: EventKind,
        competitor: CompetitorId,
        time: Timestamp,
        payload: Payload,
    ) -> Self {
        Self {
            direction: Direction::Incoming,
            kind,
            competitor,
            time,
            payload,
        }
    }

    /// Create a payload-less outgoing event
    pub fn outgoing(kind: EventKind, competitor: CompetitorId, time: Timestamp) -> Self {
        Self {
            direction: Direction::Outgoing,
            kind,
            competitor,
            time,
            payload: Payload::None,
        }
    }

    /// Human-readable message of this event, without the timestamp
    ///
    /// A payload that does not match the kind is rendered by its own value
    /// rather than failing; validated events never hit that path.
    pub fn message(&self) -> String {
        let id = self.competitor;
        match self.kind {
            EventKind::Register => format!("The competitor({}) registered", id),
            EventKind::StartTimeSet => format!(
                "The start time for the competitor({}) was set by a draw to {}",
                id,
                self.payload_text()
            ),
            EventKind::OnStartLine => format!("The competitor({}) is on the start line", id),
            EventKind::Started => format!("The competitor({}) has started", id),
            EventKind::OnRange => format!(
                "The competitor({}) is on the firing range({})",
                id,
                self.payload_text()
            ),
            EventKind::TargetHit => format!(
                "The target({}) has been hit by competitor({})",
                self.payload_text(),
                id
            ),
            EventKind::LeftRange => format!("The competitor({}) left the firing range", id),
            EventKind::EnteredPenalty => {
                format!("The competitor({}) entered the penalty laps", id)
            }
            EventKind::LeftPenalty => format!("The competitor({}) left the penalty laps", id),
            EventKind::LapCompleted => format!("The competitor({}) ended the main lap", id),
            EventKind::CannotContinue => format!(
                "The competitor({}) can't continue: {}",
                id,
                self.payload_text()
            ),
            EventKind::Disqualified => format!("The competitor({}) is disqualified", id),
            EventKind::Finished => format!("The competitor({}) has finished", id),
            EventKind::Unknown(kind) => format!("Unknown event {} for competitor({})", kind, id),
        }
    }

    fn payload_text(&self) -> String {
        match &self.payload {
            Payload::None => String::new(),
            Payload::Instant(t) => format_instant(*t),
            Payload::Integer(n) => n.to_string(),
            Payload::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", format_instant(self.time), self.message())
    }
}
