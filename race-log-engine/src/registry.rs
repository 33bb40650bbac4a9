//! Competitor registry
//!
//! Owns every competitor record, keyed by competitor id. Records are only
//! reachable through the accessor methods below.

use crate::competitor::Competitor;
use crate::config::RaceConfig;
use crate::types::{CompetitorId, Timestamp};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Id-keyed store of competitor records
#[derive(Debug, Default)]
pub struct CompetitorRegistry {
    competitors: BTreeMap<CompetitorId, Competitor>,
}

impl CompetitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the competitor, replacing any earlier record with the same id
    pub fn register(
        &mut self,
        id: CompetitorId,
        config: Arc<RaceConfig>,
        planned_start_time: Timestamp,
    ) -> &mut Competitor {
        let competitor = Competitor::new(id, config, planned_start_time);
        match self.competitors.entry(id) {
            Entry::Occupied(mut entry) => {
                log::warn!("Competitor {} registered again, previous state discarded", id);
                entry.insert(competitor);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(competitor),
        }
    }

    /// Look up a competitor; never creates one
    pub fn get(&self, id: CompetitorId) -> Option<&Competitor> {
        self.competitors.get(&id)
    }

    pub fn get_mut(&mut self, id: CompetitorId) -> Option<&mut Competitor> {
        self.competitors.get_mut(&id)
    }

    /// Remove a competitor, returning its record if it existed
    pub fn delete(&mut self, id: CompetitorId) -> Option<Competitor> {
        self.competitors.remove(&id)
    }

    pub fn contains(&self, id: CompetitorId) -> bool {
        self.competitors.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }

    /// All competitors in ascending id order
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Competitor> {
        self.competitors.values_mut()
    }

    /// All competitors ordered by their offset from the planned start
    ///
    /// Competitors without a lap clock (never started) come first; ties keep
    /// ascending id order.
    pub fn snapshot(&self) -> Vec<&Competitor> {
        let mut competitors: Vec<&Competitor> = self.competitors.values().collect();
        competitors.sort_by_key(|c| c.time_from_planned_start());
        competitors
    }
}
