//! Component structs for each entity type.
//!
//! Component structs hold all state for a particular entity type. Shared
//! building blocks (transform, physics body, health, appearance) are defined
//! here; the behaviour-bearing states (heat, steering, weapons, timed effects)
//! live next to the systems that drive them and are composed in here.

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::combat::{HitFlash, Knockback};
use crate::config::SimConfig;
use crate::effect::EffectSlot;
use crate::entity::EntityId;
use crate::systems::enemy_ai::EnemyAi;
use crate::systems::player::PlayerMotion;
use crate::systems::weapon::{EnemyWeapon, PlayerWeapon};

// =============================================================================
// Color
// =============================================================================

/// Linear RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// Red, blue, green, purple and pink enemy tints.
    pub const SPAWN_PALETTE: [Self; 5] = [
        Self::rgb(1.0, 0.2, 0.2),
        Self::rgb(0.2, 0.45, 1.0),
        Self::rgb(0.2, 1.0, 0.4),
        Self::rgb(0.7, 0.3, 1.0),
        Self::rgb(1.0, 0.35, 0.75),
    ];

    /// Creates an opaque color.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

// =============================================================================
// Shared building blocks
// =============================================================================

/// Position and orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    /// World position.
    pub position: Vec2,
    /// Facing angle in radians, counter-clockwise from +X.
    pub heading: f32,
}

impl TransformState {
    /// Creates a transform at `position` facing `heading`.
    #[must_use]
    pub fn new(position: Vec2, heading: f32) -> Self {
        Self { position, heading }
    }

    /// Turns to face `point`. Does nothing if `point` is (almost) the
    /// current position.
    pub fn face_towards(&mut self, point: Vec2) {
        let dir = point - self.position;
        if dir.length_squared() < 1e-8 {
            return;
        }
        self.heading = dir.y.atan2(dir.x);
    }

    /// Unit vector along the current heading.
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }
}

/// Rigid body participating in physics integration and collisions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsState {
    /// Linear velocity.
    pub velocity: Vec2,
    /// Velocity damping coefficient per second.
    pub linear_damping: f32,
    /// Whether the body is integrated and can collide.
    pub simulated: bool,
    /// Collision radius.
    pub radius: f32,
}

impl PhysicsState {
    /// Creates a resting, simulated body.
    #[must_use]
    pub fn with_radius(radius: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            linear_damping: 0.0,
            simulated: true,
            radius,
        }
    }

    /// Applies an instantaneous velocity change (unit mass).
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.velocity += impulse;
    }
}

impl Default for PhysicsState {
    fn default() -> Self {
        Self::with_radius(0.5)
    }
}

bitflags! {
    /// Autonomous subsystems an entity is currently allowed to run.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Subsystems: u8 {
        /// Input-driven movement (player).
        const MOVEMENT = 0b0000_0001;
        /// Steering AI (enemies).
        const AI = 0b0000_0010;
        /// Weapon firing.
        const WEAPON = 0b0000_0100;
    }
}

/// Current render color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    /// Color currently shown.
    pub color: Color,
}

/// Health pool shared by players and enemies.
///
/// `dead` is set once and never cleared. Health reaching zero sets it in the
/// same damage application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthState {
    /// Current health, in `[0, max]`.
    pub current: i32,
    /// Maximum health.
    pub max: i32,
    /// Death latch.
    pub dead: bool,
}

impl HealthState {
    /// Creates a full health pool. `max` is raised to at least 1.
    #[must_use]
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self {
            current: max,
            max,
            dead: false,
        }
    }

    /// Returns `true` once the death transition has happened.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.dead
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Regenerating damage buffer consumed before health.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShieldState {
    /// Current shield, in `[0, max]`.
    pub current: i32,
    /// Maximum shield.
    pub max: i32,
    /// Fractional regeneration accumulator; `current == floor(accumulator)`
    /// while regenerating.
    pub accumulator: f32,
    /// Simulation time of the last hit.
    pub last_damage_time: f64,
}

impl ShieldState {
    /// Creates a full shield. Negative capacities become zero.
    #[must_use]
    pub fn new(max: i32) -> Self {
        let max = max.max(0);
        #[allow(clippy::cast_precision_loss)]
        let accumulator = max as f32;
        Self {
            current: max,
            max,
            accumulator,
            last_damage_time: 0.0,
        }
    }
}

// =============================================================================
// Per-type component bundles
// =============================================================================

/// Components for the player ship.
#[derive(Debug, Clone)]
pub struct PlayerComponents {
    /// Position and facing.
    pub transform: TransformState,
    /// Body.
    pub physics: PhysicsState,
    /// Health pool.
    pub health: HealthState,
    /// Shield buffer.
    pub shield: ShieldState,
    /// Input-driven movement.
    pub motion: PlayerMotion,
    /// Heat-limited weapon.
    pub weapon: PlayerWeapon,
    /// Enabled subsystems.
    pub subsystems: Subsystems,
}

impl PlayerComponents {
    /// Creates a player at `position` using `config`.
    #[must_use]
    pub fn new(position: Vec2, config: &SimConfig) -> Self {
        Self {
            transform: TransformState::new(position, 0.0),
            physics: PhysicsState::with_radius(config.player.radius),
            health: HealthState::new(config.player.max_health),
            shield: ShieldState::new(config.player.shield.max_shield),
            motion: PlayerMotion::default(),
            weapon: PlayerWeapon::new(&config.player.weapon),
            subsystems: Subsystems::MOVEMENT | Subsystems::WEAPON,
        }
    }
}

/// Components for an enemy ship.
#[derive(Debug, Clone)]
pub struct EnemyComponents {
    /// Position and facing.
    pub transform: TransformState,
    /// Body.
    pub physics: PhysicsState,
    /// Health pool (enemies have no shield).
    pub health: HealthState,
    /// Render color.
    pub appearance: Appearance,
    /// Chase/orbit steering.
    pub ai: EnemyAi,
    /// Range-triggered weapon.
    pub weapon: EnemyWeapon,
    /// Enabled subsystems.
    pub subsystems: Subsystems,
    /// Running knockback, if any.
    pub knockback: EffectSlot<Knockback>,
    /// Running hit-flash, if any.
    pub flash: EffectSlot<HitFlash>,
    /// Whether the enemy spawner counts this enemy toward its cap.
    pub spawner_owned: bool,
}

impl EnemyComponents {
    /// Creates an enemy at `position` with the given tint.
    #[must_use]
    pub fn new(position: Vec2, tint: Color, config: &SimConfig) -> Self {
        Self {
            transform: TransformState::new(position, 0.0),
            physics: PhysicsState::with_radius(config.enemy.radius),
            health: HealthState::new(config.enemy.max_health),
            appearance: Appearance { color: tint },
            ai: EnemyAi::default(),
            weapon: EnemyWeapon::default(),
            subsystems: Subsystems::AI | Subsystems::WEAPON,
            knockback: EffectSlot::new(),
            flash: EffectSlot::new(),
            spawner_owned: false,
        }
    }

    /// Returns `true` while a knockback episode is running.
    #[must_use]
    pub fn is_in_knockback(&self) -> bool {
        self.knockback.is_active()
    }

    /// Advances knockback and hit-flash by `dt` seconds of scaled time.
    pub fn advance_effects(&mut self, dt: f32) {
        self.knockback.advance(dt, &mut self.physics);
        self.flash.advance(dt, &mut self.appearance);
    }
}

/// Who fired a bullet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BulletOwner {
    /// Fired by the player; damages enemies.
    Player,
    /// Fired by an enemy; damages the player.
    Enemy,
}

/// Components for a bullet in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulletComponents {
    /// Position and facing.
    pub transform: TransformState,
    /// Body.
    pub physics: PhysicsState,
    /// Side that fired the bullet.
    pub owner: BulletOwner,
    /// Entity that fired the bullet; never hit by it.
    pub shooter: Option<EntityId>,
    /// Damage dealt on hit.
    pub damage: i32,
    /// Seconds left before the bullet despawns.
    pub remaining_life: f32,
}

/// Components for a shield pickup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickupComponents {
    /// Position.
    pub transform: TransformState,
    /// Collision radius.
    pub radius: f32,
    /// Shield restored when consumed.
    pub shield_value: i32,
    /// Seconds left before despawn; `None` never expires.
    pub remaining_life: Option<f32>,
    /// Whether the pickup spawner counts this pickup toward its cap.
    pub spawner_owned: bool,
}
