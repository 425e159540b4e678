//! Player and enemy weapons.
//!
//! The weapons only decide *whether* and *where* to fire; they return a
//! [`Shot`] (player) or a direction (enemy) and the
//! [`Simulation`](crate::simulation::Simulation) spawns the bullet.
//!
//! # Player weapon
//!
//! A shot is fired when all of the following hold:
//! - fire is requested (held with auto-fire, pressed otherwise)
//! - the weapon is not overheated (after this frame's cooling)
//! - `now >= next_fire_time`
//!
//! Each shot adds heat and pushes `next_fire_time` to `now + 1 / fire_rate`.
//! Heat cools whenever fire is not requested, and always while overheated.
//!
//! # Enemy weapon
//!
//! No heat. Fires every `fire_interval` seconds while the target is within
//! `range`, regardless of what lies in between.

use glam::Vec2;

use crate::config::{AimMode, EnemyWeaponConfig, ForwardAxis, PlayerWeaponConfig, MIN_FIRE_RATE};
use crate::entity::components::TransformState;
use crate::events::EventBus;
use crate::flow::Stoppable;
use crate::systems::direction_or_none;
use crate::systems::heat::HeatState;

/// Aim offsets shorter than this (squared) fall back to the local axis.
const MIN_AIM_LENGTH_SQ: f32 = 0.0001;

// =============================================================================
// Player Weapon
// =============================================================================

/// A bullet the player weapon wants spawned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    /// Unit firing direction.
    pub direction: Vec2,
    /// Damage dealt on hit.
    pub damage: i32,
    /// Bullet speed.
    pub speed: f32,
}

/// Heat-limited player weapon with upgrade bonuses.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerWeapon {
    fire_rate: f32,
    auto_fire: bool,
    base_speed: f32,
    base_damage: i32,
    aim: AimMode,
    heat: HeatState,
    next_fire_time: f64,
    last_shot_time: Option<f64>,
    damage_bonus: f32,
    bullet_speed_bonus: f32,
}

impl PlayerWeapon {
    /// Creates a cold, ready weapon.
    #[must_use]
    pub fn new(config: &PlayerWeaponConfig) -> Self {
        Self {
            fire_rate: config.fire_rate.max(MIN_FIRE_RATE),
            auto_fire: config.auto_fire,
            base_speed: config.bullet_speed,
            base_damage: config.base_damage,
            aim: config.aim,
            heat: HeatState::new(&config.heat),
            next_fire_time: 0.0,
            last_shot_time: None,
            damage_bonus: 0.0,
            bullet_speed_bonus: 0.0,
        }
    }

    /// Whether the trigger state counts as a fire request this frame.
    #[must_use]
    pub fn wants_to_fire(&self, held: bool, pressed: bool) -> bool {
        if self.auto_fire {
            held
        } else {
            pressed
        }
    }

    /// Firing direction for a weapon mounted on `transform`.
    ///
    /// In pointer mode, aims at `aim_target` unless it is (almost) on top of
    /// the ship; otherwise uses the configured local axis.
    #[must_use]
    pub fn aim_direction(&self, transform: &TransformState, aim_target: Option<Vec2>) -> Vec2 {
        let axis = match self.aim {
            AimMode::Pointer(axis) => {
                let towards = aim_target
                    .and_then(|t| direction_or_none(t - transform.position, MIN_AIM_LENGTH_SQ));
                if let Some(dir) = towards {
                    return dir;
                }
                axis
            }
            AimMode::Axis(axis) => axis,
        };

        let forward = transform.forward();
        match axis {
            ForwardAxis::Right => forward,
            ForwardAxis::Up => forward.perp(),
        }
    }

    /// Runs one frame of the weapon.
    ///
    /// # Arguments
    ///
    /// * `now` - Current simulation time
    /// * `dt` - Scaled frame time, used for cooling
    /// * `fire_requested` - Result of [`wants_to_fire`](Self::wants_to_fire)
    /// * `direction` - Unit firing direction for a shot this frame
    /// * `events` - Receives heat notifications
    ///
    /// # Returns
    ///
    /// The shot to spawn, if the weapon fired.
    pub fn update(
        &mut self,
        now: f64,
        dt: f32,
        fire_requested: bool,
        direction: Vec2,
        events: &mut EventBus,
    ) -> Option<Shot> {
        if (!fire_requested || self.heat.is_overheated()) && self.heat.cool(dt) {
            events.emit(self.heat.changed_event());
        }

        if self.heat.is_overheated() || !fire_requested || now < self.next_fire_time {
            return None;
        }

        self.heat.add_shot();
        events.emit(self.heat.changed_event());
        self.next_fire_time = now + 1.0 / f64::from(self.fire_rate);
        self.last_shot_time = Some(now);

        Some(Shot {
            direction,
            damage: self.damage(),
            speed: self.bullet_speed(),
        })
    }

    /// Damage of the next shot: `max(1, base + round(bonus))`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn damage(&self) -> i32 {
        (self.base_damage + self.damage_bonus.round() as i32).max(1)
    }

    /// Speed of the next shot: `max(0, base + bonus)`.
    #[must_use]
    pub fn bullet_speed(&self) -> f32 {
        (self.base_speed + self.bullet_speed_bonus).max(0.0)
    }

    /// Adds to the damage bonus. Negative amounts are ignored.
    pub fn add_damage_bonus(&mut self, amount: f32) {
        self.damage_bonus += amount.max(0.0);
    }

    /// Adds to the bullet speed bonus. Negative amounts are ignored.
    pub fn add_bullet_speed_bonus(&mut self, amount: f32) {
        self.bullet_speed_bonus += amount.max(0.0);
    }

    /// Clears both bonuses.
    pub fn reset_upgrade_bonuses(&mut self) {
        self.damage_bonus = 0.0;
        self.bullet_speed_bonus = 0.0;
    }

    /// Heat state.
    #[must_use]
    pub fn heat(&self) -> &HeatState {
        &self.heat
    }

    /// Simulation time of the most recent shot.
    #[must_use]
    pub fn last_shot_time(&self) -> Option<f64> {
        self.last_shot_time
    }
}

// =============================================================================
// Enemy Weapon
// =============================================================================

/// Range-triggered enemy weapon.
///
/// Registered with the [`GameFlow`](crate::flow::GameFlow) while its enemy
/// lives; once stopped it never fires again.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnemyWeapon {
    next_fire_time: f64,
    stopped: bool,
}

impl EnemyWeapon {
    /// Fires at `target` if it is in range and the interval has elapsed.
    ///
    /// Returns the unit firing direction. The interval restarts whenever
    /// the weapon triggers, even if `target` sits exactly on `from` and no
    /// bullet is produced.
    pub fn try_fire(
        &mut self,
        config: &EnemyWeaponConfig,
        now: f64,
        from: Vec2,
        target: Vec2,
    ) -> Option<Vec2> {
        if self.stopped || from.distance(target) > config.range || now < self.next_fire_time {
            return None;
        }
        self.next_fire_time = now + f64::from(config.fire_interval);
        direction_or_none(target - from, MIN_AIM_LENGTH_SQ)
    }
}

impl Stoppable for EnemyWeapon {
    fn stop_on_game_over(&mut self) {
        self.stopped = true;
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }
}
