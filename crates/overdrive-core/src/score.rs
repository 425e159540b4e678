//! Score and kill tracking, and the kill-to-ability-point conversion.

use tracing::debug;

use crate::config::ScoreConfig;
use crate::events::{EventBus, GameEvent};

/// Score, kill count and unspent ability points for one playthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBoard {
    score: u32,
    kills: u32,
    ability_points: u32,
    kills_per_point: u32,
}

impl ScoreBoard {
    /// Creates an empty board that grants a point every `kills_per_point`
    /// kills (at least 1).
    #[must_use]
    pub fn new(config: &ScoreConfig) -> Self {
        Self {
            score: 0,
            kills: 0,
            ability_points: 0,
            kills_per_point: config.kills_per_point.max(1),
        }
    }

    /// Records one kill.
    ///
    /// Adds one to the score and, on every `kills_per_point`-th kill, grants
    /// exactly one ability point.
    pub fn add_kill(&mut self, events: &mut EventBus) {
        self.kills += 1;
        self.add_score(1, events);

        if self.kills % self.kills_per_point == 0 {
            self.ability_points += 1;
            debug!(
                kills = self.kills,
                points = self.ability_points,
                "ability point granted"
            );
            events.emit(GameEvent::AbilityPointsChanged {
                points: self.ability_points,
            });
        }
    }

    /// Adds `amount` to the score without counting a kill.
    pub fn add_score(&mut self, amount: u32, events: &mut EventBus) {
        if amount == 0 {
            return;
        }
        self.score = self.score.saturating_add(amount);
        events.emit(GameEvent::ScoreChanged { score: self.score });
    }

    /// Spends one ability point.
    ///
    /// Returns `false`, changing nothing, when no point is available.
    pub fn consume_point(&mut self, events: &mut EventBus) -> bool {
        if self.ability_points == 0 {
            return false;
        }
        self.ability_points -= 1;
        events.emit(GameEvent::AbilityPointsChanged {
            points: self.ability_points,
        });
        true
    }

    /// Current score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Kills this playthrough.
    #[must_use]
    pub const fn kills(&self) -> u32 {
        self.kills
    }

    /// Unspent ability points.
    #[must_use]
    pub const fn ability_points(&self) -> u32 {
        self.ability_points
    }
}
