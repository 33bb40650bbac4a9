//! Incoming event line parser
//!
//! Line grammar: `[HH:MM:SS.mmm] <kindId> <competitorId> [<extra>]`
//!
//! The fourth token is required exactly for kind 2 (an instant), kinds 5 and
//! 6 (an integer) and kind 11 (free text, the literal rest of the line). Any
//! other kind must end after the competitor id.

use crate::event::{Event, EventKind, Payload};
use crate::types::{parse_instant, CompetitorId, RaceError, Result};

/// Parse one line of the race log into an incoming event
pub fn parse_event_line(line: &str) -> Result<Event> {
    let mut tokens = line.split_whitespace();

    let stamp = tokens
        .next()
        .ok_or_else(|| RaceError::parse("empty line"))?;
    let time = stamp
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| RaceError::parse(format!("timestamp '{}' is not bracketed", stamp)))
        .and_then(parse_instant)?;

    let kind_token = tokens
        .next()
        .ok_or_else(|| RaceError::parse("missing event id"))?;
    let kind_id: u32 = kind_token
        .parse()
        .map_err(|_| RaceError::parse(format!("invalid event id '{}'", kind_token)))?;

    let competitor_token = tokens
        .next()
        .ok_or_else(|| RaceError::parse("missing competitor id"))?;
    let competitor: CompetitorId = competitor_token.parse().map_err(|_| {
        RaceError::parse(format!("invalid competitor id '{}'", competitor_token))
    })?;

    let kind = EventKind::from_id(kind_id);
    let payload = match kind {
        EventKind::StartTimeSet => {
            let extra = single_extra(&mut tokens, kind)?;
            Payload::Instant(parse_instant(extra)?)
        }
        EventKind::OnRange | EventKind::TargetHit => {
            let extra = single_extra(&mut tokens, kind)?;
            let n = extra
                .parse::<i64>()
                .map_err(|_| RaceError::parse(format!("invalid number '{}'", extra)))?;
            Payload::Integer(n)
        }
        EventKind::CannotContinue => {
            let reason = remainder_after_tokens(line, 3);
            if reason.trim().is_empty() {
                return Err(RaceError::parse("missing reason for event 11"));
            }
            Payload::Text(reason.to_string())
        }
        EventKind::Register
        | EventKind::OnStartLine
        | EventKind::Started
        | EventKind::LeftRange
        | EventKind::EnteredPenalty
        | EventKind::LeftPenalty
        | EventKind::LapCompleted => {
            if let Some(extra) = tokens.next() {
                return Err(RaceError::parse(format!(
                    "unexpected parameter '{}' for event {}",
                    extra, kind_id
                )));
            }
            Payload::None
        }
        EventKind::Disqualified | EventKind::Finished => {
            return Err(RaceError::parse(format!(
                "outgoing event {} can not be parsed",
                kind_id
            )));
        }
        EventKind::Unknown(id) => {
            return Err(RaceError::parse(format!("unknown event type: {}", id)));
        }
    };

    Ok(Event::incoming(kind, competitor, time, payload))
}

fn single_extra<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    kind: EventKind,
) -> Result<&'a str> {
    let extra = tokens
        .next()
        .ok_or_else(|| RaceError::parse(format!("missing parameter for event {}", kind.id())))?;
    if let Some(more) = tokens.next() {
        return Err(RaceError::parse(format!(
            "unexpected parameter '{}' for event {}",
            more,
            kind.id()
        )));
    }
    Ok(extra)
}

/// The literal rest of `line` after its first `count` whitespace-separated
/// tokens, with the separating whitespace removed
fn remainder_after_tokens(line: &str, count: usize) -> &str {
    let mut rest = line.trim_start();
    for _ in 0..count {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = rest[end..].trim_start();
    }
    rest
}
