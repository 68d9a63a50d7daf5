use chrono::{DateTime, Utc};
use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::*;

/// How many records each mine-count bucket keeps by default.
pub const DEFAULT_SCORE_LIMIT: usize = 10;

/// Emitted by a won game for the score keeper.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub size: Coord2,
    pub mines: CellCount,
    pub elapsed: Duration,
    pub finished_at: DateTime<Utc>,
}

/// Fastest completions, ranked per mine count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    limit: usize,
    buckets: BTreeMap<CellCount, Vec<Completion>>,
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self::new(DEFAULT_SCORE_LIMIT)
    }
}

impl ScoreBoard {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            buckets: BTreeMap::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Records a completion, returning its 1-based rank if it made the list.
    ///
    /// Equal times keep the earlier record ahead.
    pub fn submit(&mut self, completion: Completion) -> Option<usize> {
        let bucket = self.buckets.entry(completion.mines).or_default();
        let position = bucket.partition_point(|record| record.elapsed <= completion.elapsed);
        if position >= self.limit {
            return None;
        }

        log::debug!(
            "New record #{} for {} mines: {:?}",
            position + 1,
            completion.mines,
            completion.elapsed
        );
        bucket.insert(position, completion);
        bucket.truncate(self.limit);
        Some(position + 1)
    }

    pub fn top(&self, mines: CellCount) -> &[Completion] {
        self.buckets.get(&mines).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn best(&self, mines: CellCount) -> Option<&Completion> {
        self.top(mines).first()
    }

    pub fn mine_counts(&self) -> impl Iterator<Item = CellCount> + '_ {
        self.buckets
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(&mines, _)| mines)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Persistence for a [`ScoreBoard`]; the storage format belongs to the implementor.
pub trait ScoreStore {
    type Error;

    fn load(&mut self) -> core::result::Result<ScoreBoard, Self::Error>;
    fn save(&mut self, board: &ScoreBoard) -> core::result::Result<(), Self::Error>;
}
