//! Structural validation of events
//!
//! Pure check of one event against the kind catalogue. Nothing is mutated,
//! so the same event may be validated any number of times.

use crate::config::SHOTS_PER_LINE;
use crate::event::{Event, EventKind, Payload, PayloadShape};
use crate::types::{RaceError, Result};

/// Check that an event is well-formed for its kind
///
/// Returns [`RaceError::Structural`] describing the first violation found.
pub fn validate(event: &Event) -> Result<()> {
    if event.competitor < 1 {
        return Err(RaceError::Structural(format!(
            "invalid competitor ID: {}",
            event.competitor
        )));
    }

    if let EventKind::Unknown(id) = event.kind {
        return Err(RaceError::Structural(format!("unknown event: {}", id)));
    }

    let expected = event.kind.expected_payload();
    let actual = event.payload.shape();
    if expected != actual {
        return Err(match (expected, actual) {
            (PayloadShape::None, _) => RaceError::Structural(format!(
                "unexpected extra params for event {}",
                event.kind.id()
            )),
            (_, PayloadShape::None) => RaceError::Structural(format!(
                "missing extra params for event {}",
                event.kind.id()
            )),
            _ => RaceError::Structural(format!(
                "invalid extra params type for event {}: expected {}, got {}",
                event.kind.id(),
                expected,
                actual
            )),
        });
    }

    if let (EventKind::TargetHit, Payload::Integer(target)) = (event.kind, &event.payload) {
        if !(1..=i64::from(SHOTS_PER_LINE)).contains(target) {
            return Err(RaceError::Structural(format!(
                "target number must be from 1 to {}: {}",
                SHOTS_PER_LINE, target
            )));
        }
    }

    Ok(())
}
