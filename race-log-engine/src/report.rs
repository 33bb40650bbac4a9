//! Report line rendering
//!
//! Turns a competitor snapshot into its final report line:
//!
//! `[<status>] <id> [{lap}, ...] {penalty} <hits>/<shots>`
//!
//! where each `{...}` slot is `{HH:MM:SS.mmm, speed}` or `{,}` when nothing
//! was recorded. Speeds are meters per second truncated to three decimals.

use crate::competitor::{Competitor, CompetitorStatus};
use crate::event::Event;
use crate::types::{format_duration, RaceError, Result};
use chrono::Duration;

/// Header printed between the event echo and the report lines
pub const REPORT_HEADER: &str = "### Resulting Report ###";

/// Render one competitor as its report line
///
/// Fails for a competitor that is still running; the report is only
/// meaningful once every competitor reached a resting status.
pub fn render_competitor(comp: &Competitor) -> Result<String> {
    let status = match comp.status {
        CompetitorStatus::Finished => {
            format_duration(comp.time_from_planned_start().unwrap_or_else(Duration::zero))
        }
        CompetitorStatus::NotStarted => "NotStarted".to_string(),
        CompetitorStatus::NotFinished => "NotFinished".to_string(),
        CompetitorStatus::Started => {
            return Err(RaceError::Semantic(format!(
                "competitor {} is still running and can not be reported",
                comp.id
            )));
        }
    };

    let config = comp.config();
    let laps: Vec<String> = (0..config.laps as usize)
        .map(|i| match comp.laps.get(i) {
            Some(lap) => lap_slot(config.lap_len, *lap),
            None => EMPTY_SLOT.to_string(),
        })
        .collect();

    Ok(format!(
        "[{}] {} [{}] {} {}/{}",
        status,
        comp.id,
        laps.join(", "),
        lap_slot(comp.penalty_distance(), comp.penalty_laps),
        comp.hits,
        comp.total_shots()
    ))
}

/// Render one event as its output line
pub fn render_event(event: &Event) -> String {
    event.to_string()
}

const EMPTY_SLOT: &str = "{,}";

fn lap_slot(length: u32, elapsed: Duration) -> String {
    match speed_thousandths(length, elapsed) {
        Some(speed) => format!(
            "{{{}, {}.{:03}}}",
            format_duration(elapsed),
            speed / 1000,
            speed % 1000
        ),
        None => EMPTY_SLOT.to_string(),
    }
}

/// Average speed in thousandths of m/s, floored
///
/// `length / seconds * 1000 == length * 1_000_000 / millis`, so integer
/// division gives the truncated value without float rounding.
fn speed_thousandths(length: u32, elapsed: Duration) -> Option<i64> {
    let millis = elapsed.num_milliseconds();
    if millis <= 0 {
        return None;
    }
    Some((i64::from(length) * 1_000_000).div_euclid(millis))
}
