//! Tuning parameters for one playthrough.
//!
//! [`SimConfig`] groups per-concern structs. Every struct carries the game's
//! stock tuning in its `Default` impl and is `#[serde(default)]`, so an
//! override document only needs the fields it changes:
//!
//! ```
//! use overdrive_core::config::SimConfig;
//!
//! let config = SimConfig::from_json(r#"{ "score": { "kills_per_point": 3 } }"#).unwrap();
//! assert_eq!(config.score.kills_per_point, 3);
//! assert_eq!(config.player.max_health, 10);
//! ```
//!
//! # Sanitizing
//!
//! Invalid values are clamped, never rejected. [`SimConfig::sanitized`] runs
//! automatically in [`SimConfig::from_json`] and when a
//! [`Simulation`](crate::simulation::Simulation) is built.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entity::components::Color;
use crate::error::ConfigError;

/// Smallest gap kept between the orbit enter and exit distances.
pub const MIN_ORBIT_BAND: f32 = 0.5;

/// Smallest fire rate (shots per second) accepted for the player weapon.
pub const MIN_FIRE_RATE: f32 = 0.0001;

// =============================================================================
// Player
// =============================================================================

/// Player ship movement, health and death timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Top speed before upgrades.
    pub max_speed: f32,
    /// Velocity gained per second while steering.
    pub acceleration: f32,
    /// Velocity lost per second with no steering input.
    pub deceleration: f32,
    /// Starting (and maximum) health.
    pub max_health: i32,
    /// Collision radius.
    pub radius: f32,
    /// Damage taken from one enemy bullet.
    pub enemy_bullet_damage: i32,
    /// Real-time seconds between death and the global time freeze.
    pub freeze_after_death_seconds: f32,
    /// Shield buffer settings.
    pub shield: ShieldConfig,
    /// Weapon settings.
    pub weapon: PlayerWeaponConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_speed: 8.0,
            acceleration: 18.0,
            deceleration: 10.0,
            max_health: 10,
            radius: 0.5,
            enemy_bullet_damage: 1,
            freeze_after_death_seconds: 3.0,
            shield: ShieldConfig::default(),
            weapon: PlayerWeaponConfig::default(),
        }
    }
}

/// Regenerating shield on the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldConfig {
    /// Shield capacity. Zero disables the shield.
    pub max_shield: i32,
    /// Seconds after taking damage before regeneration resumes.
    pub regen_delay_after_damage: f32,
    /// Seconds after firing before regeneration resumes.
    pub regen_delay_after_shot: f32,
    /// Shield points regenerated per second.
    pub regen_per_second: f32,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            max_shield: 5,
            regen_delay_after_damage: 1.5,
            regen_delay_after_shot: 0.75,
            regen_per_second: 1.0,
        }
    }
}

/// Local axis used as the firing direction when no aim target applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForwardAxis {
    /// The ship's facing direction.
    Right,
    /// Ninety degrees counter-clockwise from the facing direction.
    Up,
}

/// How the player weapon picks its firing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AimMode {
    /// Toward the input source's aim target, falling back to the axis.
    Pointer(ForwardAxis),
    /// Always along the local axis.
    Axis(ForwardAxis),
}

/// Player weapon fire rate, projectile and heat settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerWeaponConfig {
    /// Shots per second.
    pub fire_rate: f32,
    /// Fire while the trigger is held (`true`) or once per press (`false`).
    pub auto_fire: bool,
    /// Bullet speed before upgrades.
    pub bullet_speed: f32,
    /// Bullet damage before upgrades.
    pub base_damage: i32,
    /// Direction policy.
    pub aim: AimMode,
    /// Heat economy.
    pub heat: HeatConfig,
}

impl Default for PlayerWeaponConfig {
    fn default() -> Self {
        Self {
            fire_rate: 6.0,
            auto_fire: true,
            bullet_speed: 14.0,
            base_damage: 1,
            aim: AimMode::Pointer(ForwardAxis::Right),
            heat: HeatConfig::default(),
        }
    }
}

/// Weapon heat accumulation and overheat lockout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatConfig {
    /// Heat at which the weapon overheats.
    pub max_heat: f32,
    /// Heat added by each shot.
    pub heat_per_shot: f32,
    /// Heat removed per second while not firing.
    pub cool_per_second: f32,
    /// Fraction of `max_heat` heat must fall to before firing resumes.
    pub resume_fraction: f32,
}

impl Default for HeatConfig {
    fn default() -> Self {
        Self {
            max_heat: 100.0,
            heat_per_shot: 12.0,
            cool_per_second: 25.0,
            resume_fraction: 0.35,
        }
    }
}

// =============================================================================
// Enemies
// =============================================================================

/// Enemy health, appearance, steering and weapon settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Starting health.
    pub max_health: i32,
    /// Collision radius.
    pub radius: f32,
    /// Pick a random palette color on spawn.
    pub randomize_tint: bool,
    /// Colors available for the spawn tint.
    pub palette: Vec<Color>,
    /// Steering.
    pub ai: OrbitConfig,
    /// Weapon.
    pub weapon: EnemyWeaponConfig,
    /// Hit reaction impulse.
    pub knockback: KnockbackConfig,
    /// Hit reaction color override.
    pub flash: FlashConfig,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            max_health: 3,
            radius: 0.5,
            randomize_tint: true,
            palette: Color::SPAWN_PALETTE.to_vec(),
            ai: OrbitConfig::default(),
            weapon: EnemyWeaponConfig::default(),
            knockback: KnockbackConfig::default(),
            flash: FlashConfig::default(),
        }
    }
}

/// Chase/orbit steering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Speed cap for the steering velocity.
    pub max_speed: f32,
    /// Maximum change of the steering velocity per second.
    pub acceleration: f32,
    /// Radius of the orbit around the target.
    pub orbit_radius: f32,
    /// Tangential speed while orbiting.
    pub orbit_speed: f32,
    /// Gain of the radial correction pulling the enemy onto the orbit.
    pub radial_tightness: f32,
    /// Orbit direction.
    pub clockwise: bool,
    /// Distance at or below which chasing switches to orbiting.
    pub enter_orbit_distance: f32,
    /// Distance at or above which orbiting switches back to chasing.
    pub exit_orbit_distance: f32,
    /// Below this distance from the target the enemy is pushed straight out.
    pub min_separation: f32,
    /// Suspend steering while knocked back.
    pub respect_knockback: bool,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            max_speed: 7.0,
            acceleration: 20.0,
            orbit_radius: 4.0,
            orbit_speed: 5.0,
            radial_tightness: 4.0,
            clockwise: false,
            enter_orbit_distance: 5.0,
            exit_orbit_distance: 6.0,
            min_separation: 0.3,
            respect_knockback: true,
        }
    }
}

/// Heat-free enemy weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyWeaponConfig {
    /// Seconds between shots.
    pub fire_interval: f32,
    /// Bullet speed.
    pub bullet_speed: f32,
    /// Maximum distance to the player at which the enemy fires.
    pub range: f32,
}

impl Default for EnemyWeaponConfig {
    fn default() -> Self {
        Self {
            fire_interval: 1.5,
            bullet_speed: 14.0,
            range: 12.0,
        }
    }
}

/// Knockback impulse applied on every hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnockbackConfig {
    /// Impulse magnitude (unit mass).
    pub force: f32,
    /// Seconds the knockback lasts.
    pub duration: f32,
    /// Linear damping while knocked back.
    pub drag: f32,
}

impl Default for KnockbackConfig {
    fn default() -> Self {
        Self {
            force: 2.0,
            duration: 0.20,
            drag: 4.0,
        }
    }
}

/// Hit-flash color override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashConfig {
    /// Seconds the flash lasts.
    pub duration: f32,
    /// Override color.
    pub color: Color,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            duration: 0.08,
            color: Color::WHITE,
        }
    }
}

// =============================================================================
// Projectiles
// =============================================================================

/// Bullet lifetime and size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    /// Seconds before a bullet despawns.
    pub lifetime: f32,
    /// Collision radius.
    pub radius: f32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            lifetime: 2.0,
            radius: 0.15,
        }
    }
}

// =============================================================================
// Economy
// =============================================================================

/// Ability point spending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityConfig {
    /// Bullet damage added per damage upgrade.
    pub damage_per_point: f32,
    /// Bullet speed added per bullet speed upgrade.
    pub bullet_speed_per_point: f32,
    /// Ship speed added per ship speed upgrade.
    pub ship_speed_per_point: f32,
    /// Real-time seconds the freeze ability lasts.
    pub freeze_duration: f32,
    /// Real-time seconds between scans for enemies to freeze.
    pub freeze_scan_interval: f32,
}

impl Default for AbilityConfig {
    fn default() -> Self {
        Self {
            damage_per_point: 1.0,
            bullet_speed_per_point: 2.0,
            ship_speed_per_point: 0.5,
            freeze_duration: 5.0,
            freeze_scan_interval: 0.10,
        }
    }
}

/// Kill to ability point conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    /// Kills required for each ability point.
    pub kills_per_point: u32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self { kills_per_point: 5 }
    }
}

// =============================================================================
// Spawning
// =============================================================================

/// Enemy spawner placement and pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySpawnerConfig {
    /// Closest spawn distance from the player.
    pub min_distance: f32,
    /// Farthest spawn distance from the player.
    pub max_distance: f32,
    /// Seconds between spawn point relocations.
    pub reposition_every: f32,
    /// Spawn interval at the start of a playthrough.
    pub initial_interval: f32,
    /// Spawn interval once the ramp has finished.
    pub min_interval: f32,
    /// Seconds over which the interval ramps down.
    pub ramp_duration: f32,
    /// Cap on live spawned enemies. Zero means unlimited.
    pub max_active: u32,
    /// Lower bound of the random delay before the first spawn.
    pub initial_delay_min: f32,
    /// Upper bound of the random delay before the first spawn.
    pub initial_delay_max: f32,
}

impl Default for EnemySpawnerConfig {
    fn default() -> Self {
        Self {
            min_distance: 25.0,
            max_distance: 60.0,
            reposition_every: 5.0,
            initial_interval: 4.0,
            min_interval: 0.75,
            ramp_duration: 300.0,
            max_active: 0,
            initial_delay_min: 1.0,
            initial_delay_max: 2.0,
        }
    }
}

/// Shield pickup spawner and pickup settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupSpawnerConfig {
    /// Seconds between spawn attempts.
    pub interval: f32,
    /// Cap on live spawned pickups. Zero means unlimited.
    pub max_active: u32,
    /// Closest spawn distance from the player.
    pub min_distance: f32,
    /// Farthest spawn distance from the player.
    pub max_distance: f32,
    /// Shield restored by one pickup.
    pub shield_value: i32,
    /// Seconds before an untouched pickup despawns. Zero keeps it forever.
    pub lifetime: f32,
    /// Collision radius.
    pub radius: f32,
}

impl Default for PickupSpawnerConfig {
    fn default() -> Self {
        Self {
            interval: 6.0,
            max_active: 3,
            min_distance: 6.0,
            max_distance: 16.0,
            shield_value: 1,
            lifetime: 20.0,
            radius: 0.4,
        }
    }
}

/// Game-over orchestration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Overrides [`PlayerConfig::freeze_after_death_seconds`] when set to a
    /// non-negative value.
    pub freeze_after_death_override: Option<f32>,
}

// =============================================================================
// SimConfig
// =============================================================================

/// Complete tuning for a simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Player ship.
    pub player: PlayerConfig,
    /// Enemy ships.
    pub enemy: EnemyConfig,
    /// Bullets.
    pub bullet: BulletConfig,
    /// Ability economy.
    pub abilities: AbilityConfig,
    /// Score board.
    pub score: ScoreConfig,
    /// Enemy spawner.
    pub enemy_spawner: EnemySpawnerConfig,
    /// Shield pickup spawner.
    pub pickup_spawner: PickupSpawnerConfig,
    /// Game-over flow.
    pub flow: FlowConfig,
}

impl SimConfig {
    /// Parses a (possibly partial) JSON document and sanitizes the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is not valid JSON or a
    /// field has the wrong type.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config.sanitized())
    }

    /// Clamps every value into its valid range.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let p = &mut self.player;
        p.max_speed = non_negative(p.max_speed);
        p.acceleration = non_negative(p.acceleration);
        p.deceleration = non_negative(p.deceleration);
        p.max_health = p.max_health.max(1);
        p.radius = non_negative(p.radius);
        p.enemy_bullet_damage = p.enemy_bullet_damage.max(0);
        p.freeze_after_death_seconds = non_negative(p.freeze_after_death_seconds);

        let s = &mut p.shield;
        s.max_shield = s.max_shield.max(0);
        s.regen_delay_after_damage = non_negative(s.regen_delay_after_damage);
        s.regen_delay_after_shot = non_negative(s.regen_delay_after_shot);
        s.regen_per_second = non_negative(s.regen_per_second);

        let w = &mut p.weapon;
        w.fire_rate = w.fire_rate.max(MIN_FIRE_RATE);
        w.bullet_speed = non_negative(w.bullet_speed);
        w.base_damage = w.base_damage.max(1);

        let h = &mut w.heat;
        h.max_heat = h.max_heat.max(1.0);
        h.heat_per_shot = non_negative(h.heat_per_shot);
        h.cool_per_second = non_negative(h.cool_per_second);
        h.resume_fraction = h.resume_fraction.clamp(0.0, 1.0);

        let e = &mut self.enemy;
        e.max_health = e.max_health.max(1);
        e.radius = non_negative(e.radius);
        e.knockback.force = non_negative(e.knockback.force);
        e.knockback.duration = non_negative(e.knockback.duration);
        e.knockback.drag = non_negative(e.knockback.drag);
        e.flash.duration = non_negative(e.flash.duration);
        e.weapon.fire_interval = non_negative(e.weapon.fire_interval);
        e.weapon.bullet_speed = non_negative(e.weapon.bullet_speed);
        e.weapon.range = non_negative(e.weapon.range);

        let ai = &mut e.ai;
        ai.max_speed = non_negative(ai.max_speed);
        ai.acceleration = non_negative(ai.acceleration);
        ai.orbit_radius = non_negative(ai.orbit_radius);
        ai.orbit_speed = non_negative(ai.orbit_speed);
        ai.radial_tightness = non_negative(ai.radial_tightness);
        ai.min_separation = non_negative(ai.min_separation);
        ai.enter_orbit_distance = non_negative(ai.enter_orbit_distance);
        if ai.exit_orbit_distance < ai.enter_orbit_distance + MIN_ORBIT_BAND {
            let repaired = ai.enter_orbit_distance + MIN_ORBIT_BAND;
            warn!(
                enter = ai.enter_orbit_distance,
                exit = ai.exit_orbit_distance,
                repaired,
                "orbit exit distance must exceed enter distance, widening band"
            );
            ai.exit_orbit_distance = repaired;
        }

        let b = &mut self.bullet;
        b.lifetime = non_negative(b.lifetime);
        b.radius = non_negative(b.radius);

        let a = &mut self.abilities;
        a.damage_per_point = non_negative(a.damage_per_point);
        a.bullet_speed_per_point = non_negative(a.bullet_speed_per_point);
        a.ship_speed_per_point = non_negative(a.ship_speed_per_point);
        a.freeze_duration = non_negative(a.freeze_duration);
        a.freeze_scan_interval = a.freeze_scan_interval.max(0.01);

        self.score.kills_per_point = self.score.kills_per_point.max(1);

        let es = &mut self.enemy_spawner;
        es.min_distance = non_negative(es.min_distance);
        es.max_distance = non_negative(es.max_distance);
        es.reposition_every = es.reposition_every.max(0.1);
        es.initial_interval = es.initial_interval.max(0.05);
        es.min_interval = es.min_interval.max(0.05);
        es.ramp_duration = es.ramp_duration.max(0.0001);
        es.initial_delay_min = non_negative(es.initial_delay_min);
        es.initial_delay_max = non_negative(es.initial_delay_max);

        let ps = &mut self.pickup_spawner;
        ps.interval = ps.interval.max(0.05);
        ps.min_distance = non_negative(ps.min_distance);
        ps.max_distance = non_negative(ps.max_distance);
        ps.lifetime = non_negative(ps.lifetime);
        ps.radius = non_negative(ps.radius);

        self
    }

    /// Seconds between player death and the global time freeze.
    #[must_use]
    pub fn freeze_after_death_seconds(&self) -> f32 {
        match self.flow.freeze_after_death_override {
            Some(delay) if delay >= 0.0 => delay,
            _ => self.player.freeze_after_death_seconds,
        }
    }
}

/// Clamps to zero, mapping NaN to zero as well.
fn non_negative(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}
