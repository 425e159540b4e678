//! Damage model and hit reactions.
//!
//! # Absorption
//!
//! Damage is taken by the shield first; only the remainder reaches health:
//!
//! ```
//! use overdrive_core::combat::absorb;
//!
//! // shield 2, health 10, hit for 5 -> shield 0, health 7
//! assert_eq!(absorb(2, 10, 5), (0, 7));
//! ```
//!
//! Health clamps at zero, and reaching zero sets the death latch in the same
//! call. Once dead, every damage and shield operation is a no-op, so two
//! lethal hits in one tick can never kill (or score) twice.
//!
//! # Hit reactions
//!
//! Every accepted enemy hit, lethal or not, (re)starts a [`Knockback`] and a
//! [`HitFlash`] before the death check. Both are [`TimedEffect`]s; starting
//! one while another is running cancels the old one first, which restores
//! the saved damping or color before the new one saves it again.

use glam::Vec2;
use rand::Rng;
use tracing::{debug, info};

use crate::config::{EnemyConfig, FlashConfig, KnockbackConfig, ShieldConfig};
use crate::effect::{TimedEffect, Timer};
use crate::entity::EntityId;
use crate::entity::components::{
    Appearance, Color, EnemyComponents, HealthState, PhysicsState, PlayerComponents, Subsystems,
};
use crate::events::{EventBus, GameEvent};
use crate::systems::random_unit;

/// Result of a damage application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Nothing happened: non-positive amount or target already dead.
    Ignored,
    /// Damage applied, target survived.
    Damaged,
    /// This hit killed the target.
    Killed,
}

/// Splits `amount` between shield and health.
///
/// Returns the new `(shield, health)`. Health never drops below zero.
#[must_use]
pub fn absorb(shield: i32, health: i32, amount: i32) -> (i32, i32) {
    let amount = amount.max(0);
    let absorbed = shield.max(0).min(amount);
    let remaining = amount - absorbed;
    (shield - absorbed, (health - remaining).max(0))
}

/// Lowers `health` by `amount` and sets the death latch at zero.
///
/// Returns `true` if this call killed.
fn apply_to_health(health: &mut HealthState, amount: i32) -> bool {
    health.current = (health.current - amount).max(0);
    if health.current == 0 && !health.dead {
        health.dead = true;
        return true;
    }
    false
}

// =============================================================================
// Knockback
// =============================================================================

/// Brief impulse pushing a hit body away from the hit, with extra drag.
#[derive(Debug, Clone, PartialEq)]
pub struct Knockback {
    timer: Timer,
    impulse: Vec2,
    drag: f32,
    saved_damping: f32,
}

impl Knockback {
    /// Creates a knockback along the unit vector `direction`.
    #[must_use]
    pub fn new(direction: Vec2, config: &KnockbackConfig) -> Self {
        Self {
            timer: Timer::new(config.duration),
            impulse: direction * config.force,
            drag: config.drag,
            saved_damping: 0.0,
        }
    }

    /// Unit direction from `source` to `position`, or a random one when they
    /// coincide.
    pub fn direction<R: Rng + ?Sized>(position: Vec2, source: Vec2, rng: &mut R) -> Vec2 {
        let away = position - source;
        if away.length_squared() < 1e-6 {
            random_unit(rng)
        } else {
            away.normalize()
        }
    }
}

impl TimedEffect for Knockback {
    type Target = PhysicsState;

    fn timer_mut(&mut self) -> &mut Timer {
        &mut self.timer
    }

    fn on_start(&mut self, body: &mut PhysicsState) {
        self.saved_damping = body.linear_damping;
        body.velocity = Vec2::ZERO;
        body.linear_damping = self.drag;
        body.apply_impulse(self.impulse);
    }

    fn on_complete(self, body: &mut PhysicsState) {
        body.linear_damping = self.saved_damping;
    }

    fn on_cancel(self, body: &mut PhysicsState) {
        body.linear_damping = self.saved_damping;
    }
}

// =============================================================================
// HitFlash
// =============================================================================

/// Brief color override on a hit.
#[derive(Debug, Clone, PartialEq)]
pub struct HitFlash {
    timer: Timer,
    color: Color,
    saved: Color,
}

impl HitFlash {
    /// Creates a flash from the configured duration and color.
    #[must_use]
    pub fn new(config: &FlashConfig) -> Self {
        Self {
            timer: Timer::new(config.duration),
            color: config.color,
            saved: config.color,
        }
    }
}

impl TimedEffect for HitFlash {
    type Target = Appearance;

    fn timer_mut(&mut self) -> &mut Timer {
        &mut self.timer
    }

    fn on_start(&mut self, appearance: &mut Appearance) {
        self.saved = appearance.color;
        appearance.color = self.color;
    }

    fn on_complete(self, appearance: &mut Appearance) {
        appearance.color = self.saved;
    }

    fn on_cancel(self, appearance: &mut Appearance) {
        appearance.color = self.saved;
    }
}

// =============================================================================
// Player
// =============================================================================

impl PlayerComponents {
    /// Applies `amount` damage at simulation time `now`.
    ///
    /// The shield absorbs first. Reaching zero health kills the player:
    /// movement and weapon are disabled and [`GameEvent::PlayerDied`] is
    /// emitted, all before this call returns.
    pub fn take_damage(
        &mut self,
        id: EntityId,
        amount: i32,
        now: f64,
        events: &mut EventBus,
    ) -> DamageOutcome {
        if amount <= 0 || self.health.dead {
            return DamageOutcome::Ignored;
        }

        self.shield.last_damage_time = now;
        let (shield, health) = absorb(self.shield.current, self.health.current, amount);

        if shield != self.shield.current {
            self.shield.current = shield;
            #[allow(clippy::cast_precision_loss)]
            let accumulator = shield as f32;
            self.shield.accumulator = accumulator;
            events.emit(GameEvent::ShieldChanged {
                current: self.shield.current,
                max: self.shield.max,
            });
        }

        if health == self.health.current {
            return DamageOutcome::Damaged;
        }

        let lost = self.health.current - health;
        let killed = apply_to_health(&mut self.health, lost);
        events.emit(GameEvent::HealthChanged {
            entity: id,
            current: self.health.current,
            max: self.health.max,
        });

        if !killed {
            return DamageOutcome::Damaged;
        }

        self.subsystems.remove(Subsystems::MOVEMENT | Subsystems::WEAPON);
        self.motion.halt();
        info!(entity = %id, "player died");
        events.emit(GameEvent::PlayerDied { entity: id });
        DamageOutcome::Killed
    }

    /// Adds up to `amount` shield.
    ///
    /// Returns `false`, changing nothing, when the player is dead, has no
    /// shield capacity, `amount <= 0`, or the shield is already full.
    pub fn try_add_shield(&mut self, amount: i32, events: &mut EventBus) -> bool {
        if self.health.dead || self.shield.max <= 0 || amount <= 0 {
            return false;
        }
        if self.shield.current >= self.shield.max {
            return false;
        }

        self.shield.current = (self.shield.current + amount).min(self.shield.max);
        #[allow(clippy::cast_precision_loss)]
        let accumulator = self.shield.current as f32;
        self.shield.accumulator = accumulator;
        events.emit(GameEvent::ShieldChanged {
            current: self.shield.current,
            max: self.shield.max,
        });
        true
    }

    /// Regenerates the shield for one frame.
    ///
    /// Regeneration waits `regen_delay_after_damage` seconds after the last
    /// hit and `regen_delay_after_shot` seconds after the last shot. The
    /// integer shield follows `floor(accumulator)` and is only notified when
    /// it changes.
    pub fn regenerate_shield(
        &mut self,
        config: &ShieldConfig,
        now: f64,
        dt: f32,
        events: &mut EventBus,
    ) {
        if self.health.dead || self.shield.max <= 0 || self.shield.current >= self.shield.max {
            return;
        }
        if now - self.shield.last_damage_time < f64::from(config.regen_delay_after_damage) {
            return;
        }
        if let Some(last_shot) = self.weapon.last_shot_time() {
            if now - last_shot < f64::from(config.regen_delay_after_shot) {
                return;
            }
        }

        self.shield.accumulator += config.regen_per_second * dt;
        #[allow(clippy::cast_possible_truncation)]
        let whole = (self.shield.accumulator.floor() as i32).clamp(0, self.shield.max);
        if whole != self.shield.current {
            self.shield.current = whole;
            events.emit(GameEvent::ShieldChanged {
                current: self.shield.current,
                max: self.shield.max,
            });
        }
    }
}

// =============================================================================
// Enemy
// =============================================================================

impl EnemyComponents {
    /// Applies a hit of `amount` damage coming from `source`.
    ///
    /// Knockback and hit-flash are (re)started first, then health drops.
    /// On a lethal hit the enemy's AI and weapon are disabled and
    /// [`GameEvent::EnemyKilled`] is emitted; scoring and removal are up to
    /// the caller and must follow immediately.
    pub fn take_hit<R: Rng + ?Sized>(
        &mut self,
        id: EntityId,
        config: &EnemyConfig,
        amount: i32,
        source: Vec2,
        rng: &mut R,
        events: &mut EventBus,
    ) -> DamageOutcome {
        if amount <= 0 || self.health.dead {
            return DamageOutcome::Ignored;
        }

        let direction = Knockback::direction(self.transform.position, source, rng);
        self.knockback
            .start(Knockback::new(direction, &config.knockback), &mut self.physics);
        self.flash
            .start(HitFlash::new(&config.flash), &mut self.appearance);

        let killed = apply_to_health(&mut self.health, amount);
        events.emit(GameEvent::HealthChanged {
            entity: id,
            current: self.health.current,
            max: self.health.max,
        });

        if !killed {
            return DamageOutcome::Damaged;
        }

        self.subsystems.remove(Subsystems::AI | Subsystems::WEAPON);
        debug!(entity = %id, "enemy destroyed");
        events.emit(GameEvent::EnemyKilled { entity: id });
        DamageOutcome::Killed
    }
}
