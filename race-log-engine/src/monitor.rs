//! Race monitor: the event-driven state machine
//!
//! The monitor consumes validated incoming events one at a time, advances the
//! addressed competitor, and after every successful transition sweeps all
//! competitors for late starters. At most one outgoing event leaves a single
//! [`RaceMonitor::digest`] call; disqualifications that could not be handed
//! out yet stay queued until a later call or [`RaceMonitor::drain_pending`].
//!
//! Calls must be strictly sequential. Timestamps are trusted to be
//! non-decreasing; the event source enforces that.

use crate::competitor::{Competitor, CompetitorStatus};
use crate::config::{RaceConfig, SHOTS_PER_LINE};
use crate::event::{Direction, Event, EventKind, Payload};
use crate::registry::CompetitorRegistry;
use crate::types::{
    format_instant, last_instant_of_day, CompetitorId, RaceError, Result, Timestamp,
};
use crate::validation::validate;
use chrono::Duration;
use std::sync::Arc;

/// Start schedule resolved from the configuration on first use
#[derive(Debug, Clone, Copy)]
struct StartSchedule {
    first_start: Timestamp,
    interval: Duration,
}

impl StartSchedule {
    /// Planned start of the competitor registered as number `order`
    ///
    /// Clamped to the last instant of the race day instead of wrapping past
    /// midnight.
    fn default_start(&self, id: CompetitorId, order: usize) -> Timestamp {
        let offset = self.interval * i32::try_from(order).unwrap_or(i32::MAX);
        let (planned, days) = self.first_start.overflowing_add_signed(offset);
        if days != 0 {
            log::warn!(
                "Default start of competitor {} falls after midnight, using {}",
                id,
                format_instant(last_instant_of_day())
            );
            return last_instant_of_day();
        }
        planned
    }
}

/// Replays race events and keeps every competitor's state
pub struct RaceMonitor {
    config: Arc<RaceConfig>,
    registry: CompetitorRegistry,
    schedule: Option<StartSchedule>,
    /// Time of the last digested event
    race_clock: Option<Timestamp>,
    /// Disqualified competitors not yet announced; popped newest first
    pending: Vec<CompetitorId>,
}

impl RaceMonitor {
    pub fn new(config: RaceConfig) -> Self {
        Self {
            config: Arc::new(config),
            registry: CompetitorRegistry::new(),
            schedule: None,
            race_clock: None,
            pending: Vec::new(),
        }
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn registry(&self) -> &CompetitorRegistry {
        &self.registry
    }

    /// Time of the most recently digested event
    pub fn race_clock(&self) -> Option<Timestamp> {
        self.race_clock
    }

    /// Apply one incoming event
    ///
    /// Returns the outgoing event produced by this call, if any. A
    /// [`RaceError::Semantic`] means a procedural rule was broken; nothing of
    /// the failing transition is applied, but the run is expected to stop.
    pub fn digest(&mut self, event: &Event) -> Result<Option<Event>> {
        validate(event)?;
        if event.direction == Direction::Outgoing || !event.kind.is_incoming() {
            return Err(RaceError::Structural(format!(
                "outgoing event {} is never re-ingested",
                event.kind.id()
            )));
        }

        let schedule = self.schedule()?;
        self.race_clock = Some(event.time);
        log::debug!("Digesting {}", event);

        let primary = self.apply(event, schedule)?;

        self.sweep_late_starters(event.time, schedule.interval);

        // A finish is announced on the call that caused it; disqualifications
        // found by the same sweep wait for the next call.
        if primary.is_some() {
            return Ok(primary);
        }
        Ok(self.pop_disqualification())
    }

    /// Hand out every queued disqualification, newest first
    ///
    /// Meant to run once after the event stream ended.
    pub fn drain_pending(&mut self) -> Vec<Event> {
        let mut drained = Vec::with_capacity(self.pending.len());
        while let Some(event) = self.pop_disqualification() {
            drained.push(event);
        }
        drained
    }

    /// Competitors ordered by offset from their planned start
    pub fn report(&self) -> Vec<&Competitor> {
        self.registry.snapshot()
    }

    fn schedule(&mut self) -> Result<StartSchedule> {
        if let Some(schedule) = self.schedule {
            return Ok(schedule);
        }
        let schedule = StartSchedule {
            first_start: self.config.start_time()?,
            interval: self.config.start_interval()?,
        };
        log::debug!(
            "Start schedule: first start {}, interval {}s",
            format_instant(schedule.first_start),
            schedule.interval.num_seconds()
        );
        self.schedule = Some(schedule);
        Ok(schedule)
    }

    fn apply(&mut self, event: &Event, schedule: StartSchedule) -> Result<Option<Event>> {
        let id = event.competitor;

        if event.kind == EventKind::Register {
            let order = self.registry.len() - usize::from(self.registry.contains(id));
            let planned = schedule.default_start(id, order);
            self.registry.register(id, Arc::clone(&self.config), planned);
            log::debug!(
                "Competitor {} registered, default start {}",
                id,
                format_instant(planned)
            );
            return Ok(None);
        }

        let laps_total = self.config.laps as usize;
        let comp = self
            .registry
            .get_mut(id)
            .ok_or_else(|| RaceError::Semantic(format!("competitor {} is not registered", id)))?;

        if comp.disqualified && event.kind != EventKind::Started {
            log::warn!("Ignoring {} for disqualified competitor {}", event.kind, id);
            return Ok(None);
        }

        match (event.kind, &event.payload) {
            (EventKind::StartTimeSet, Payload::Instant(planned)) => {
                if comp.status != CompetitorStatus::NotStarted {
                    log::warn!(
                        "Competitor {} already started, draw to {} ignored",
                        id,
                        format_instant(*planned)
                    );
                } else {
                    comp.planned_start_time = *planned;
                }
            }
            (EventKind::OnStartLine, _) => {
                comp.arrived = true;
            }
            (EventKind::Started, _) => {
                if !comp.arrived {
                    return Err(RaceError::Semantic(format!(
                        "competitor {} is not on start line",
                        id
                    )));
                }
                if comp.disqualified {
                    log::warn!("Ignoring start of disqualified competitor {}", id);
                    return Ok(None);
                }
                if comp.status != CompetitorStatus::NotStarted {
                    return Err(RaceError::Semantic(format!(
                        "competitor {} has already started",
                        id
                    )));
                }
                comp.status = CompetitorStatus::Started;
                comp.actual_start_time = Some(event.time);
                comp.lap_start_time = Some(comp.planned_start_time);
            }
            (EventKind::OnRange, Payload::Integer(line)) => {
                let expected = i64::from(comp.firing_lines_completed) + 1;
                if *line != expected {
                    return Err(RaceError::Semantic(format!(
                        "competitor {} is on range {}, not {}",
                        id, line, expected
                    )));
                }
                comp.is_firing = true;
            }
            (EventKind::TargetHit, Payload::Integer(target)) => {
                if !comp.is_firing {
                    return Err(RaceError::Semantic(format!(
                        "competitor {} is not firing",
                        id
                    )));
                }
                if comp.line_hits >= SHOTS_PER_LINE {
                    return Err(RaceError::Semantic(format!(
                        "competitor {} hit target {} after {} hits on one line",
                        id, target, SHOTS_PER_LINE
                    )));
                }
                comp.line_hits += 1;
                comp.hits += 1;
            }
            (EventKind::LeftRange, _) => {
                comp.firing_lines_completed += 1;
                comp.is_firing = false;
                comp.line_hits = 0;
            }
            (EventKind::EnteredPenalty, _) => {
                comp.penalty_start_time = Some(event.time);
            }
            (EventKind::LeftPenalty, _) => {
                let entered = comp.penalty_start_time.take().ok_or_else(|| {
                    RaceError::Semantic(format!(
                        "competitor {} left penalty area without entering it",
                        id
                    ))
                })?;
                comp.penalty_laps = comp.penalty_laps + (event.time - entered);
            }
            (EventKind::LapCompleted, _) => {
                if comp.has_finished_all_laps() {
                    return Err(RaceError::Semantic(format!(
                        "competitor {} has already finished",
                        id
                    )));
                }
                let lap_start = match (comp.status, comp.lap_start_time) {
                    (CompetitorStatus::Started, Some(lap_start)) => lap_start,
                    _ => {
                        return Err(RaceError::Semantic(format!(
                            "competitor {} completed a lap while {}",
                            id, comp.status
                        )));
                    }
                };

                comp.laps.push(event.time - lap_start);
                comp.lap_start_time = Some(event.time);

                if comp.laps.len() == laps_total {
                    comp.status = CompetitorStatus::Finished;
                    log::info!("Competitor {} finished at {}", id, format_instant(event.time));
                    return Ok(Some(Event::outgoing(EventKind::Finished, id, event.time)));
                }
            }
            (EventKind::CannotContinue, Payload::Text(reason)) => {
                if comp.status.is_terminal() {
                    log::warn!("Competitor {} is already {}, '{}' ignored", id, comp.status, reason);
                } else {
                    log::info!("Competitor {} can't continue: {}", id, reason);
                    comp.status = CompetitorStatus::NotFinished;
                }
            }
            (kind, payload) => {
                return Err(RaceError::Structural(format!(
                    "event {} can not carry {:?}",
                    kind, payload
                )));
            }
        }

        Ok(None)
    }

    /// Disqualify every competitor still waiting past its start window
    fn sweep_late_starters(&mut self, clock: Timestamp, interval: Duration) {
        for comp in self.registry.iter_mut() {
            if comp.disqualified || comp.status != CompetitorStatus::NotStarted {
                continue;
            }
            let late_by = clock - comp.planned_start_time;
            if late_by > interval {
                comp.disqualified = true;
                self.pending.push(comp.id);
                log::info!(
                    "Competitor {} disqualified: planned start {}, now {}",
                    comp.id,
                    format_instant(comp.planned_start_time),
                    format_instant(clock)
                );
            } else {
                log::trace!("Competitor {} within start window", comp.id);
            }
        }
    }

    fn pop_disqualification(&mut self) -> Option<Event> {
        let clock = self.race_clock?;
        let id = self.pending.pop()?;
        Some(Event::outgoing(EventKind::Disqualified, id, clock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_event_line;
    use crate::report::render_competitor;
    use crate::types::parse_instant;

    fn config() -> RaceConfig {
        RaceConfig::new()
            .with_laps(2)
            .with_lap_len(3651)
            .with_penalty_len(50)
            .with_firing_lines(1)
            .with_start("09:30:00")
            .with_start_delta("00:00:30")
    }

    fn tm(s: &str) -> Timestamp {
        parse_instant(s).unwrap()
    }

    fn digest_line(monitor: &mut RaceMonitor, line: &str) -> Result<Option<Event>> {
        monitor.digest(&parse_event_line(line).unwrap())
    }

    fn digest_all(monitor: &mut RaceMonitor, lines: &[&str]) -> Vec<Event> {
        lines
            .iter()
            .filter_map(|line| digest_line(monitor, line).unwrap())
            .collect()
    }

    /// Competitor 1 drawn to 09:30:00.000 and started at 09:30:00.500
    fn started_competitor(monitor: &mut RaceMonitor) {
        digest_all(
            monitor,
            &[
                "[09:05:00.000] 1 1",
                "[09:15:00.000] 2 1 09:30:00.000",
                "[09:29:00.000] 3 1",
                "[09:30:00.500] 4 1",
            ],
        );
    }

    #[test]
    fn test_canonical_log() {
        let mut monitor = RaceMonitor::new(config());
        let outgoing = digest_all(
            &mut monitor,
            &[
                "[09:05:59.867] 1 1",
                "[09:15:00.841] 2 1 09:30:00.000",
                "[09:29:45.734] 3 1",
                "[09:30:01.005] 4 1",
                "[09:49:31.659] 5 1 1",
                "[09:49:33.123] 6 1 1",
                "[09:49:34.650] 6 1 2",
                "[09:49:35.937] 6 1 4",
                "[09:49:37.364] 6 1 5",
                "[09:49:38.339] 7 1",
                "[09:49:55.915] 8 1",
                "[09:51:48.391] 9 1",
                "[09:59:03.872] 10 1",
                "[09:59:05.321] 11 1 Lost in the forest",
            ],
        );

        assert!(outgoing.is_empty());
        assert!(monitor.drain_pending().is_empty());

        let report = monitor.report();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].status, CompetitorStatus::NotFinished);
        assert_eq!(
            render_competitor(report[0]).unwrap(),
            "[NotFinished] 1 [{00:29:03.872, 2.093}, {,}] {00:01:52.476, 0.444} 4/5"
        );
    }

    #[test]
    fn test_first_lap_is_charged_from_planned_start() {
        let mut monitor = RaceMonitor::new(config());
        started_competitor(&mut monitor);
        digest_line(&mut monitor, "[10:00:00.000] 10 1").unwrap();

        let comp = monitor.registry().get(1).unwrap();
        assert_eq!(comp.actual_start_time, Some(tm("09:30:00.500")));
        assert_eq!(comp.laps, vec![Duration::minutes(30)]);
    }

    #[test]
    fn test_finish_emits_single_event() {
        let mut monitor = RaceMonitor::new(config());
        started_competitor(&mut monitor);

        assert!(digest_line(&mut monitor, "[10:00:00.000] 10 1").unwrap().is_none());
        let out = digest_line(&mut monitor, "[10:31:00.250] 10 1").unwrap().unwrap();
        assert_eq!(out.to_string(), "[10:31:00.250] The competitor(1) has finished");
        assert_eq!(out.direction, Direction::Outgoing);

        let comp = monitor.registry().get(1).unwrap();
        assert_eq!(comp.status, CompetitorStatus::Finished);
        assert_eq!(comp.laps.len(), 2);
        assert_eq!(
            comp.time_from_planned_start(),
            Some(Duration::milliseconds(61 * 60_000 + 250))
        );

        let err = digest_line(&mut monitor, "[10:40:00.000] 10 1").unwrap_err();
        assert!(err.to_string().contains("already finished"));
        assert_eq!(monitor.registry().get(1).unwrap().laps.len(), 2);
    }

    #[test]
    fn test_start_requires_start_line() {
        let mut monitor = RaceMonitor::new(config());
        digest_line(&mut monitor, "[09:05:00.000] 1 1").unwrap();
        let err = digest_line(&mut monitor, "[09:30:00.000] 4 1").unwrap_err();
        assert!(err.to_string().contains("not on start line"));
    }

    #[test]
    fn test_started_twice_is_rejected() {
        let mut monitor = RaceMonitor::new(config());
        started_competitor(&mut monitor);
        assert!(digest_line(&mut monitor, "[09:31:00.000] 4 1").is_err());
    }

    #[test]
    fn test_firing_rules() {
        let mut monitor = RaceMonitor::new(config());
        started_competitor(&mut monitor);

        assert!(digest_line(&mut monitor, "[09:40:00.000] 6 1 1").is_err());
        assert!(digest_line(&mut monitor, "[09:40:00.000] 5 1 2").is_err());
        digest_line(&mut monitor, "[09:40:00.000] 5 1 1").unwrap();
        for target in 1..=5 {
            let line = format!("[09:40:0{}.000] 6 1 {}", target, target);
            digest_line(&mut monitor, &line).unwrap();
        }
        assert!(digest_line(&mut monitor, "[09:40:06.000] 6 1 3").is_err());
        digest_line(&mut monitor, "[09:40:07.000] 7 1").unwrap();

        let comp = monitor.registry().get(1).unwrap();
        assert_eq!(comp.hits, 5);
        assert_eq!(comp.firing_lines_completed, 1);
        assert!(comp.hits <= comp.total_shots());
        assert!(!comp.is_firing);

        assert!(digest_line(&mut monitor, "[09:41:00.000] 5 1 1").is_err());
        digest_line(&mut monitor, "[09:41:00.000] 5 1 2").unwrap();
    }

    #[test]
    fn test_duplicate_target_hits_are_counted() {
        let mut monitor = RaceMonitor::new(config());
        started_competitor(&mut monitor);
        digest_all(
            &mut monitor,
            &[
                "[09:40:00.000] 5 1 1",
                "[09:40:01.000] 6 1 3",
                "[09:40:02.000] 6 1 3",
                "[09:40:03.000] 7 1",
            ],
        );
        assert_eq!(monitor.registry().get(1).unwrap().hits, 2);
    }

    #[test]
    fn test_penalty_time_accumulates() {
        let mut monitor = RaceMonitor::new(config());
        started_competitor(&mut monitor);

        let err = digest_line(&mut monitor, "[09:45:00.000] 9 1").unwrap_err();
        assert!(err.to_string().contains("without entering"));

        digest_all(
            &mut monitor,
            &[
                "[09:45:00.000] 8 1",
                "[09:46:00.000] 9 1",
                "[09:50:00.000] 8 1",
                "[09:50:30.500] 9 1",
            ],
        );
        let comp = monitor.registry().get(1).unwrap();
        assert_eq!(comp.penalty_laps, Duration::milliseconds(90_500));
        assert_eq!(comp.penalty_start_time, None);
    }

    #[test]
    fn test_unregistered_competitor() {
        let mut monitor = RaceMonitor::new(config());
        let err = digest_line(&mut monitor, "[09:00:00.000] 3 9").unwrap_err();
        assert!(err.to_string().contains("not registered"));
    }

    #[test]
    fn test_late_starter_is_disqualified_by_other_competitor_event() {
        let mut monitor = RaceMonitor::new(config());
        digest_all(
            &mut monitor,
            &[
                "[09:05:00.000] 1 1",
                "[09:06:00.000] 1 2",
                "[09:15:00.000] 2 1 09:30:00.000",
                "[09:15:01.000] 2 2 09:31:00.000",
                "[09:29:00.000] 3 1",
                "[09:29:30.000] 3 2",
                "[09:30:00.000] 4 1",
            ],
        );

        // exactly at the window edge is not late yet
        assert!(digest_line(&mut monitor, "[09:31:30.000] 8 1").unwrap().is_none());
        let out = digest_line(&mut monitor, "[09:31:30.001] 9 1").unwrap().unwrap();
        assert_eq!(out.kind, EventKind::Disqualified);
        assert_eq!(out.competitor, 2);
        assert_eq!(out.time, tm("09:31:30.001"));
        assert!(monitor.registry().get(2).unwrap().disqualified);

        // sticky: never queued again, later events change nothing
        assert!(digest_line(&mut monitor, "[09:40:00.000] 4 2").unwrap().is_none());
        assert!(digest_line(&mut monitor, "[09:40:01.000] 8 2").unwrap().is_none());
        let comp = monitor.registry().get(2).unwrap();
        assert_eq!(comp.status, CompetitorStatus::NotStarted);
        assert_eq!(comp.actual_start_time, None);
        assert_eq!(comp.penalty_start_time, None);
        assert!(monitor.drain_pending().is_empty());
    }

    #[test]
    fn test_start_without_arrival_fails_even_when_disqualified() {
        let mut monitor = RaceMonitor::new(config());
        digest_line(&mut monitor, "[09:05:00.000] 1 1").unwrap();
        let out = digest_line(&mut monitor, "[09:31:00.000] 1 2").unwrap().unwrap();
        assert_eq!(out.competitor, 1);
        assert!(digest_line(&mut monitor, "[09:31:01.000] 4 1").is_err());
    }

    #[test]
    fn test_default_planned_start_follows_registration_order() {
        let mut monitor = RaceMonitor::new(config());
        digest_all(
            &mut monitor,
            &["[09:00:00.000] 1 5", "[09:00:01.000] 1 2", "[09:00:02.000] 1 9"],
        );
        let planned = |id| monitor.registry().get(id).unwrap().planned_start_time;
        assert_eq!(planned(5), tm("09:30:00.000"));
        assert_eq!(planned(2), tm("09:30:30.000"));
        assert_eq!(planned(9), tm("09:31:00.000"));
    }

    #[test]
    fn test_default_start_past_midnight_is_clamped() {
        let mut monitor = RaceMonitor::new(config().with_start_delta("01:00:00"));
        for id in 1..=16 {
            let line = format!("[09:00:{:02}.000] 1 {}", id, id);
            assert!(digest_line(&mut monitor, &line).unwrap().is_none(), "{}", line);
        }

        let planned = |id| monitor.registry().get(id).unwrap().planned_start_time;
        assert_eq!(planned(15), tm("23:30:00.000"));
        assert_eq!(planned(16), tm("23:59:59.999"));
        assert!(!monitor.registry().get(16).unwrap().disqualified);
        assert!(monitor.drain_pending().is_empty());
    }

    #[test]
    fn test_draw_after_start_is_ignored() {
        let mut monitor = RaceMonitor::new(config());
        started_competitor(&mut monitor);
        assert!(digest_line(&mut monitor, "[09:31:00.000] 2 1 09:45:00.000")
            .unwrap()
            .is_none());

        let comp = monitor.registry().get(1).unwrap();
        assert_eq!(comp.planned_start_time, tm("09:30:00.000"));
        assert_eq!(comp.time_from_planned_start(), Some(Duration::zero()));
    }

    #[test]
    fn test_duplicate_targets_cannot_exceed_line_capacity() {
        let mut monitor = RaceMonitor::new(config());
        started_competitor(&mut monitor);
        digest_all(
            &mut monitor,
            &[
                "[09:40:00.000] 5 1 1",
                "[09:40:01.000] 6 1 1",
                "[09:40:02.000] 6 1 2",
                "[09:40:03.000] 6 1 3",
                "[09:40:04.000] 6 1 3",
                "[09:40:05.000] 6 1 4",
            ],
        );

        let err = digest_line(&mut monitor, "[09:40:06.000] 6 1 5").unwrap_err();
        assert!(matches!(err, RaceError::Semantic(_)));
        assert_eq!(monitor.registry().get(1).unwrap().hits, 5);
    }

    #[test]
    fn test_drain_returns_every_queued_disqualification() {
        let mut monitor = RaceMonitor::new(config());
        digest_all(
            &mut monitor,
            &[
                "[09:00:00.000] 1 1",
                "[09:00:01.000] 1 2",
                "[09:00:02.000] 1 3",
                "[09:00:03.000] 1 4",
            ],
        );

        let first = digest_line(&mut monitor, "[11:00:00.000] 3 4").unwrap().unwrap();
        assert_eq!(first.kind, EventKind::Disqualified);

        let drained = monitor.drain_pending();
        assert_eq!(drained.len(), 3);
        let mut ids: Vec<CompetitorId> = drained
            .iter()
            .inspect(|e| {
                assert_eq!(e.kind, EventKind::Disqualified);
                assert_eq!(e.time, tm("11:00:00.000"));
            })
            .map(|e| e.competitor)
            .collect();
        ids.push(first.competitor);
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(monitor.drain_pending().is_empty());
    }

    #[test]
    fn test_finish_wins_over_same_call_disqualification() {
        let mut monitor = RaceMonitor::new(config().with_laps(1));
        digest_all(
            &mut monitor,
            &[
                "[09:00:00.000] 1 1",
                "[09:00:01.000] 1 2",
                "[09:15:00.000] 2 1 09:30:00.000",
                "[09:15:01.000] 2 2 10:04:50.000",
                "[09:29:00.000] 3 1",
                "[09:30:00.500] 4 1",
            ],
        );

        let out = digest_line(&mut monitor, "[10:05:30.000] 10 1").unwrap().unwrap();
        assert_eq!(out.kind, EventKind::Finished);
        assert!(monitor.registry().get(2).unwrap().disqualified);

        let drained = monitor.drain_pending();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].competitor, 2);
        assert_eq!(drained[0].time, tm("10:05:30.000"));
    }

    #[test]
    fn test_terminal_statuses_are_absorbing() {
        let mut monitor = RaceMonitor::new(config().with_laps(1));
        digest_all(
            &mut monitor,
            &[
                "[09:00:00.000] 1 1",
                "[09:00:01.000] 1 2",
                "[09:15:00.000] 2 1 09:30:00.000",
                "[09:15:01.000] 2 2 09:30:30.000",
                "[09:29:00.000] 3 1",
                "[09:29:01.000] 3 2",
                "[09:30:00.500] 4 1",
                "[09:30:30.500] 4 2",
                "[10:00:00.000] 10 1",
                "[10:00:01.000] 11 1 too late to quit",
                "[10:00:02.000] 11 2 broken ski",
            ],
        );

        assert_eq!(monitor.registry().get(1).unwrap().status, CompetitorStatus::Finished);
        assert_eq!(monitor.registry().get(2).unwrap().status, CompetitorStatus::NotFinished);
        assert!(digest_line(&mut monitor, "[10:00:02.500] 11 2 still broken")
            .unwrap()
            .is_none());
        assert_eq!(monitor.registry().get(2).unwrap().status, CompetitorStatus::NotFinished);
        assert!(digest_line(&mut monitor, "[10:00:03.000] 10 2").is_err());
        assert!(digest_line(&mut monitor, "[10:00:04.000] 4 2").is_err());
    }

    #[test]
    fn test_rejects_malformed_and_outgoing_events() {
        let mut monitor = RaceMonitor::new(config());
        let bad_target = Event::incoming(
            EventKind::TargetHit,
            1,
            tm("09:00:00.000"),
            Payload::Integer(6),
        );
        assert!(matches!(monitor.digest(&bad_target), Err(RaceError::Structural(_))));

        let outgoing = Event::outgoing(EventKind::Finished, 1, tm("09:00:00.000"));
        assert!(matches!(monitor.digest(&outgoing), Err(RaceError::Structural(_))));
        assert_eq!(monitor.race_clock(), None);
    }

    #[test]
    fn test_invalid_config_surfaces_on_first_digest() {
        let mut monitor = RaceMonitor::new(config().with_start_delta("soon"));
        let err = digest_line(&mut monitor, "[09:00:00.000] 1 1").unwrap_err();
        assert!(matches!(err, RaceError::Config(_)));
    }

    #[test]
    fn test_report_order() {
        let mut monitor = RaceMonitor::new(config().with_laps(1));
        digest_all(
            &mut monitor,
            &[
                "[09:00:00.000] 1 1",
                "[09:00:01.000] 1 2",
                "[09:00:02.000] 1 3",
                "[09:10:00.000] 2 1 09:30:00.000",
                "[09:10:01.000] 2 2 09:30:30.000",
                "[09:29:00.000] 3 1",
                "[09:29:01.000] 3 2",
                "[09:30:00.100] 4 1",
                "[09:30:30.200] 4 2",
                "[10:10:00.000] 10 2",
                "[10:20:00.000] 10 1",
            ],
        );

        let order: Vec<CompetitorId> = monitor.report().iter().map(|c| c.id).collect();
        assert_eq!(order, vec![3, 2, 1]);
        assert!(monitor.registry().get(3).unwrap().disqualified);
    }
}
