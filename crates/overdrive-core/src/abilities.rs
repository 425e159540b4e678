//! Ability point spending: permanent upgrades and the timed enemy freeze.
//!
//! Every action spends exactly one point from the [`ScoreBoard`] or fails
//! with no side effects. Preconditions (available point, existing target)
//! are checked before the point is taken, so an `Err` always means nothing
//! changed.
//!
//! # Freeze
//!
//! [`FreezeEffect`] runs on real time. While it is active it scans the
//! arena's enemies every `freeze_scan_interval` seconds and captures each
//! enemy it has not seen yet this episode: AI and weapon are switched off
//! and the body leaves the physics simulation. When the effect ends (or is
//! replaced by a new freeze) every captured enemy that still exists gets the
//! values recorded at capture time back. Enemies removed in the meantime are
//! skipped.
//!
//! [`AbilityEconomy::reset`] drops an active freeze without restoring
//! anything; it runs on player death, when the scene is being torn down.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::arena::Arena;
use crate::config::AbilityConfig;
use crate::effect::{EffectSlot, TimedEffect, Timer};
use crate::entity::components::{EnemyComponents, Subsystems};
use crate::entity::{Entity, EntityId, EntityTag};
use crate::error::AbilityError;
use crate::events::{EventBus, GameEvent};
use crate::score::ScoreBoard;

// =============================================================================
// Upgrade levels
// =============================================================================

/// Purchased upgrade levels. Every level starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeLevels {
    /// Bullet damage level.
    pub damage: u32,
    /// Bullet speed level.
    pub bullet_speed: u32,
    /// Ship speed level.
    pub ship_speed: u32,
}

impl Default for UpgradeLevels {
    fn default() -> Self {
        Self {
            damage: 1,
            bullet_speed: 1,
            ship_speed: 1,
        }
    }
}

/// An action that costs one ability point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Permanent bullet damage bonus.
    UpgradeDamage,
    /// Permanent bullet speed bonus.
    UpgradeBulletSpeed,
    /// Permanent ship speed bonus.
    UpgradeShipSpeed,
    /// Timed freeze of every live enemy.
    FreezeEnemies,
}

impl AbilityKind {
    /// All abilities, in hotkey order.
    pub const ALL: [Self; 4] = [
        Self::UpgradeDamage,
        Self::UpgradeBulletSpeed,
        Self::UpgradeShipSpeed,
        Self::FreezeEnemies,
    ];
}

impl fmt::Display for AbilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UpgradeDamage => "upgrade_damage",
            Self::UpgradeBulletSpeed => "upgrade_bullet_speed",
            Self::UpgradeShipSpeed => "upgrade_ship_speed",
            Self::FreezeEnemies => "freeze_enemies",
        };
        f.write_str(name)
    }
}

/// Stat raised by an upgrade.
#[derive(Debug, Clone, Copy)]
enum Stat {
    Damage,
    BulletSpeed,
    ShipSpeed,
}

// =============================================================================
// Freeze effect
// =============================================================================

/// What a captured enemy looked like before the freeze touched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrozenState {
    /// AI subsystem was enabled.
    pub ai: bool,
    /// Weapon subsystem was enabled.
    pub weapon: bool,
    /// Body took part in physics.
    pub simulated: bool,
}

impl FrozenState {
    fn capture(enemy: &EnemyComponents) -> Self {
        Self {
            ai: enemy.subsystems.contains(Subsystems::AI),
            weapon: enemy.subsystems.contains(Subsystems::WEAPON),
            simulated: enemy.physics.simulated,
        }
    }

    fn restore(self, enemy: &mut EnemyComponents) {
        enemy.subsystems.set(Subsystems::AI, self.ai);
        enemy.subsystems.set(Subsystems::WEAPON, self.weapon);
        enemy.physics.simulated = self.simulated;
    }
}

/// Timed freeze over every enemy in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct FreezeEffect {
    timer: Timer,
    scan_interval: f32,
    until_scan: f32,
    captured: BTreeMap<EntityId, FrozenState>,
}

impl FreezeEffect {
    /// Creates a freeze lasting `duration` seconds that scans every
    /// `scan_interval` seconds.
    #[must_use]
    pub fn new(duration: f32, scan_interval: f32) -> Self {
        Self {
            timer: Timer::new(duration),
            scan_interval: scan_interval.max(0.01),
            until_scan: 0.0,
            captured: BTreeMap::new(),
        }
    }

    /// Number of enemies captured so far.
    #[must_use]
    pub fn captured_count(&self) -> usize {
        self.captured.len()
    }

    /// Pre-freeze state recorded for `id`, if it was captured.
    #[must_use]
    pub fn captured(&self, id: EntityId) -> Option<FrozenState> {
        self.captured.get(&id).copied()
    }

    /// Seconds left before the freeze ends.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.timer.remaining()
    }

    fn scan(&mut self, arena: &mut Arena) {
        let mut newly_captured = 0;
        for id in arena.ids_with_tag(EntityTag::Enemy) {
            if self.captured.contains_key(&id) {
                continue;
            }
            let Some(enemy) = arena.get_mut(id).and_then(Entity::as_enemy_mut) else {
                continue;
            };
            if enemy.health.is_dead() {
                continue;
            }
            self.captured.insert(id, FrozenState::capture(enemy));
            enemy.subsystems.remove(Subsystems::AI | Subsystems::WEAPON);
            enemy.physics.simulated = false;
            newly_captured += 1;
        }
        if newly_captured > 0 {
            debug!(
                newly_captured,
                total = self.captured.len(),
                "freeze captured enemies"
            );
        }
    }

    fn restore_all(self, arena: &mut Arena) {
        let mut restored = 0;
        for (id, state) in self.captured {
            if let Some(enemy) = arena.get_mut(id).and_then(Entity::as_enemy_mut) {
                state.restore(enemy);
                restored += 1;
            }
        }
        debug!(restored, "freeze released enemies");
    }
}

impl TimedEffect for FreezeEffect {
    type Target = Arena;

    fn timer_mut(&mut self) -> &mut Timer {
        &mut self.timer
    }

    fn on_start(&mut self, arena: &mut Arena) {
        self.scan(arena);
        self.until_scan = self.scan_interval;
    }

    fn on_tick(&mut self, arena: &mut Arena, dt: f32) {
        self.until_scan -= dt;
        if self.until_scan <= 0.0 {
            self.scan(arena);
            self.until_scan = self.scan_interval;
        }
    }

    fn on_complete(self, arena: &mut Arena) {
        self.restore_all(arena);
    }

    fn on_cancel(self, arena: &mut Arena) {
        self.restore_all(arena);
    }
}

// =============================================================================
// AbilityEconomy
// =============================================================================

/// Spends ability points on upgrades and the freeze.
#[derive(Debug, Clone)]
pub struct AbilityEconomy {
    config: AbilityConfig,
    levels: UpgradeLevels,
    freeze: EffectSlot<FreezeEffect>,
    freezes_used: u32,
}

impl AbilityEconomy {
    /// Creates an economy with every level at 1 and no freeze running.
    #[must_use]
    pub fn new(config: &AbilityConfig) -> Self {
        Self {
            config: config.clone(),
            levels: UpgradeLevels::default(),
            freeze: EffectSlot::new(),
            freezes_used: 0,
        }
    }

    /// Performs `kind`, spending one point from `score`.
    ///
    /// Upgrades act on the player identified by `player`.
    ///
    /// # Errors
    ///
    /// - [`AbilityError::NoAbilityPoints`] if `score` has no points.
    /// - [`AbilityError::MissingTarget`] if an upgrade has no player to act on.
    ///
    /// In both cases no point is spent and nothing changes.
    pub fn perform(
        &mut self,
        kind: AbilityKind,
        arena: &mut Arena,
        player: Option<EntityId>,
        score: &mut ScoreBoard,
        events: &mut EventBus,
    ) -> Result<(), AbilityError> {
        let stat = match kind {
            AbilityKind::FreezeEnemies => return self.freeze_enemies(arena, score, events),
            AbilityKind::UpgradeDamage => Stat::Damage,
            AbilityKind::UpgradeBulletSpeed => Stat::BulletSpeed,
            AbilityKind::UpgradeShipSpeed => Stat::ShipSpeed,
        };
        self.upgrade(stat, arena, player, score, events)
    }

    fn upgrade(
        &mut self,
        stat: Stat,
        arena: &mut Arena,
        player: Option<EntityId>,
        score: &mut ScoreBoard,
        events: &mut EventBus,
    ) -> Result<(), AbilityError> {
        if score.ability_points() == 0 {
            return Err(AbilityError::NoAbilityPoints);
        }
        let target = player
            .and_then(|id| arena.get_mut(id))
            .and_then(Entity::as_player_mut)
            .ok_or(AbilityError::MissingTarget("player"))?;
        if !score.consume_point(events) {
            return Err(AbilityError::NoAbilityPoints);
        }

        let level = match stat {
            Stat::Damage => {
                target.weapon.add_damage_bonus(self.config.damage_per_point);
                self.levels.damage += 1;
                self.levels.damage
            }
            Stat::BulletSpeed => {
                target
                    .weapon
                    .add_bullet_speed_bonus(self.config.bullet_speed_per_point);
                self.levels.bullet_speed += 1;
                self.levels.bullet_speed
            }
            Stat::ShipSpeed => {
                target
                    .motion
                    .add_speed_bonus(self.config.ship_speed_per_point);
                self.levels.ship_speed += 1;
                self.levels.ship_speed
            }
        };

        info!(?stat, level, "upgrade purchased");
        events.emit(GameEvent::LevelsChanged(self.levels));
        Ok(())
    }

    fn freeze_enemies(
        &mut self,
        arena: &mut Arena,
        score: &mut ScoreBoard,
        events: &mut EventBus,
    ) -> Result<(), AbilityError> {
        if !score.consume_point(events) {
            return Err(AbilityError::NoAbilityPoints);
        }

        let duration = self.config.freeze_duration;
        self.freeze.start(
            FreezeEffect::new(duration, self.config.freeze_scan_interval),
            arena,
        );
        self.freezes_used += 1;
        info!(duration, activation = self.freezes_used, "enemy freeze started");
        events.emit(GameEvent::FreezeStarted { duration });
        Ok(())
    }

    /// Advances the freeze by `real_dt` unscaled seconds.
    pub fn advance(&mut self, real_dt: f32, arena: &mut Arena, events: &mut EventBus) {
        if self.freeze.advance(real_dt, arena) {
            info!("enemy freeze ended");
            events.emit(GameEvent::FreezeEnded);
        }
    }

    /// Resets levels, clears the player's upgrade bonuses and drops any
    /// running freeze without restoring the enemies it captured.
    pub fn reset(&mut self, arena: &mut Arena, player: Option<EntityId>, events: &mut EventBus) {
        self.levels = UpgradeLevels::default();
        if let Some(p) = player
            .and_then(|id| arena.get_mut(id))
            .and_then(Entity::as_player_mut)
        {
            p.weapon.reset_upgrade_bonuses();
            p.motion.reset_upgrade_bonuses();
        }
        if self.freeze.abort().is_some() {
            debug!("running freeze dropped by reset");
        }
        events.emit(GameEvent::LevelsChanged(self.levels));
    }

    /// Current upgrade levels.
    #[must_use]
    pub fn levels(&self) -> UpgradeLevels {
        self.levels
    }

    /// Returns `true` while a freeze is running.
    #[must_use]
    pub fn is_freeze_active(&self) -> bool {
        self.freeze.is_active()
    }

    /// The running freeze, if any.
    #[must_use]
    pub fn active_freeze(&self) -> Option<&FreezeEffect> {
        self.freeze.get()
    }

    /// Freezes activated this playthrough.
    #[must_use]
    pub fn freezes_used(&self) -> u32 {
        self.freezes_used
    }
}
