//! Chase/orbit steering for enemies.
//!
//! # State machine
//!
//! ```text
//!            distance <= enter_orbit_distance
//!   Chase ─────────────────────────────────────▶ Orbit
//!     ▲                                            │
//!     └────────────────────────────────────────────┘
//!            distance >= exit_orbit_distance
//! ```
//!
//! The band between the two distances keeps an enemy hovering near the
//! boundary from flipping modes every tick. [`SimConfig::sanitized`]
//! guarantees `exit > enter`.
//!
//! # Steering
//!
//! - **Chase**: full speed straight at the target.
//! - **Orbit**: tangential speed around the target plus a proportional
//!   correction toward `orbit_radius`, clamped to `max_speed`. Inside
//!   `min_separation` the enemy is pushed straight out instead.
//!
//! The actual velocity approaches the desired one at `acceleration` per
//! second, so direction changes are smooth arcs.
//!
//! [`SimConfig::sanitized`]: crate::config::SimConfig::sanitized

use glam::Vec2;
use rand::Rng;
use tracing::debug;

use crate::arena::Arena;
use crate::config::OrbitConfig;
use crate::entity::EntityTag;
use crate::entity::components::Subsystems;
use crate::systems::{move_towards, random_unit};

/// Squared distances at or below this count as "on top of" the target.
const DEGENERATE_SQ: f32 = 1e-6;

/// Steering mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AiMode {
    /// Head straight for the target.
    #[default]
    Chase,
    /// Circle the target.
    Orbit,
}

/// Steering state of one enemy.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnemyAi {
    mode: AiMode,
    velocity: Vec2,
}

impl EnemyAi {
    /// Applies the hysteresis rule for the current distance to the target.
    ///
    /// Returns the (possibly new) mode.
    pub fn update_mode(&mut self, config: &OrbitConfig, distance: f32) -> AiMode {
        let next = match self.mode {
            AiMode::Chase if distance <= config.enter_orbit_distance => AiMode::Orbit,
            AiMode::Orbit if distance >= config.exit_orbit_distance => AiMode::Chase,
            mode => mode,
        };
        if next != self.mode {
            debug!(from = ?self.mode, to = ?next, distance, "enemy steering mode changed");
            self.mode = next;
        }
        next
    }

    /// Velocity the current mode wants, before acceleration limiting.
    pub fn desired_velocity<R: Rng + ?Sized>(
        &self,
        config: &OrbitConfig,
        position: Vec2,
        target: Vec2,
        rng: &mut R,
    ) -> Vec2 {
        match self.mode {
            AiMode::Chase => {
                let to_target = target - position;
                if to_target.length_squared() > DEGENERATE_SQ {
                    to_target.normalize() * config.max_speed
                } else {
                    Vec2::ZERO
                }
            }
            AiMode::Orbit => orbit_velocity(config, position - target, rng),
        }
    }

    /// Runs one fixed step: mode update, desired velocity, acceleration.
    ///
    /// Returns the new steering velocity.
    pub fn steer<R: Rng + ?Sized>(
        &mut self,
        config: &OrbitConfig,
        position: Vec2,
        target: Vec2,
        dt: f32,
        rng: &mut R,
    ) -> Vec2 {
        self.update_mode(config, position.distance(target));
        let desired = self.desired_velocity(config, position, target, rng);
        self.velocity = move_towards(self.velocity, desired, config.acceleration * dt);
        self.velocity
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> AiMode {
        self.mode
    }

    /// Current steering velocity.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }
}

/// Orbit branch of the steering, with `r` pointing from target to enemy.
fn orbit_velocity<R: Rng + ?Sized>(config: &OrbitConfig, r: Vec2, rng: &mut R) -> Vec2 {
    let r_len = r.length();

    if r_len < config.min_separation {
        let out = if r.length_squared() > DEGENERATE_SQ {
            r.normalize()
        } else {
            random_unit(rng)
        };
        return out * config.orbit_speed;
    }

    let radial = r / r_len.max(1e-6);
    let tangent = if config.clockwise {
        Vec2::new(radial.y, -radial.x)
    } else {
        Vec2::new(-radial.y, radial.x)
    };
    let radial_error = r_len - config.orbit_radius;

    let desired = tangent * config.orbit_speed - radial * (config.radial_tightness * radial_error);
    desired.clamp_length_max(config.max_speed)
}

/// Steers every enemy toward `target` for one fixed step.
///
/// Enemies with the AI subsystem disabled are skipped. With
/// `respect_knockback`, so are enemies in knockback; their body keeps
/// drifting under the knockback impulse.
pub fn step_enemies<R: Rng + ?Sized>(
    arena: &mut Arena,
    config: &OrbitConfig,
    target: Vec2,
    dt: f32,
    rng: &mut R,
) {
    for id in arena.ids_with_tag(EntityTag::Enemy) {
        let Some(enemy) = arena.get_mut(id).and_then(|e| e.as_enemy_mut()) else {
            continue;
        };
        if !enemy.subsystems.contains(Subsystems::AI) {
            continue;
        }
        if config.respect_knockback && enemy.is_in_knockback() {
            continue;
        }

        let velocity = enemy.ai.steer(config, enemy.transform.position, target, dt, rng);
        enemy.physics.velocity = velocity;
        enemy.transform.face_towards(target);
    }
}
