//! Character stats touched by the schedule minigame.

use crate::round::StatSink;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub sentience: i32,
    pub dependency: i32,
}

impl Stats {
    /// Apply both deltas. Neither stat drops below zero.
    pub fn modify(&mut self, sentience_delta: i32, dependency_delta: i32) {
        self.sentience = self.sentience.saturating_add(sentience_delta).max(0);
        self.dependency = self.dependency.saturating_add(dependency_delta).max(0);
    }
}

/// Round penalties land on dependency.
impl StatSink for Stats {
    fn apply_stat_delta(&mut self, delta: i32) {
        self.modify(0, delta);
    }
}
