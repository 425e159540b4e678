//! Enemy and shield pickup spawners.
//!
//! Spawners decide *when* and *where*; the
//! [`Simulation`](crate::simulation::Simulation) creates the entity and
//! reports its destruction back through `on_despawned` so population caps
//! stay accurate. Both spawners stop for good on game over.

use glam::Vec2;
use rand::Rng;
use tracing::debug;

use crate::config::{EnemySpawnerConfig, PickupSpawnerConfig};
use crate::flow::Stoppable;

/// Closest an enemy spawn point may be to the player.
const ENEMY_SAFE_DISTANCE: f32 = 3.0;

/// Random point around `center` at a distance in `[min, max)`.
///
/// A band with `max <= min` is widened to `min + 1`.
pub fn polar_offset<R: Rng + ?Sized>(center: Vec2, min: f32, max: f32, rng: &mut R) -> Vec2 {
    let max = if max <= min { min + 1.0 } else { max };
    center + Vec2::from_angle(rng.gen_range(0.0..std::f32::consts::TAU)) * sample(min, max, rng)
}

fn sample<R: Rng + ?Sized>(lo: f32, hi: f32, rng: &mut R) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

// =============================================================================
// Enemy Spawner
// =============================================================================

/// Spawns enemies from a spawn point that jumps around the player.
///
/// The first spawn happens after a random delay; afterwards the interval
/// shrinks linearly from `initial_interval` to `min_interval` over
/// `ramp_duration` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemySpawner {
    config: EnemySpawnerConfig,
    elapsed: f32,
    until_spawn: f32,
    until_reposition: f32,
    spawn_point: Option<Vec2>,
    active: u32,
    stopped: bool,
}

impl EnemySpawner {
    /// Creates a spawner whose first spawn is delayed by a random amount in
    /// the configured range.
    pub fn new<R: Rng + ?Sized>(config: &EnemySpawnerConfig, rng: &mut R) -> Self {
        let lo = config.initial_delay_min.min(config.initial_delay_max);
        let hi = config.initial_delay_min.max(config.initial_delay_max);
        Self {
            config: config.clone(),
            elapsed: 0.0,
            until_spawn: rng.gen_range(lo..=hi),
            until_reposition: 0.0,
            spawn_point: None,
            active: 0,
            stopped: false,
        }
    }

    /// Spawn interval at the current point of the ramp.
    #[must_use]
    pub fn current_interval(&self) -> f32 {
        let t = (self.elapsed / self.config.ramp_duration.max(0.0001)).clamp(0.0, 1.0);
        self.config.initial_interval + (self.config.min_interval - self.config.initial_interval) * t
    }

    /// Advances by `dt` seconds of scaled time.
    ///
    /// Returns where to spawn an enemy, if one is due.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        player: Option<Vec2>,
        rng: &mut R,
    ) -> Option<Vec2> {
        if self.stopped {
            return None;
        }
        self.elapsed += dt;

        self.until_reposition -= dt;
        if self.until_reposition <= 0.0 {
            if let Some(center) = player {
                let min = self.config.min_distance.max(ENEMY_SAFE_DISTANCE);
                let max = if self.config.max_distance <= self.config.min_distance {
                    self.config.min_distance + 1.0
                } else {
                    self.config.max_distance
                };
                let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                self.spawn_point = Some(center + Vec2::from_angle(angle) * sample(min, max, rng));
            }
            self.until_reposition = self.config.reposition_every;
        }

        self.until_spawn -= dt;
        if self.until_spawn > 0.0 {
            return None;
        }
        self.until_spawn = self.current_interval();

        let under_cap = self.config.max_active == 0 || self.active < self.config.max_active;
        let point = self.spawn_point.filter(|_| under_cap)?;
        self.active += 1;
        debug!(x = point.x, y = point.y, active = self.active, "enemy spawn due");
        Some(point)
    }

    /// Reports that one of this spawner's enemies is gone.
    pub fn on_despawned(&mut self) {
        self.active = self.active.saturating_sub(1);
    }

    /// Live enemies spawned by this spawner.
    #[must_use]
    pub fn active(&self) -> u32 {
        self.active
    }

    /// Current spawn point, once the player has been seen.
    #[must_use]
    pub fn spawn_point(&self) -> Option<Vec2> {
        self.spawn_point
    }
}

impl Stoppable for EnemySpawner {
    fn stop_on_game_over(&mut self) {
        self.stopped = true;
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }
}

// =============================================================================
// Pickup Spawner
// =============================================================================

/// Spawns shield pickups around the player at a fixed interval.
#[derive(Debug, Clone, PartialEq)]
pub struct PickupSpawner {
    config: PickupSpawnerConfig,
    until_spawn: f32,
    active: u32,
    stopped: bool,
}

impl PickupSpawner {
    /// Creates a spawner whose first attempt is immediate.
    #[must_use]
    pub fn new(config: &PickupSpawnerConfig) -> Self {
        Self {
            config: config.clone(),
            until_spawn: 0.0,
            active: 0,
            stopped: false,
        }
    }

    /// Advances by `dt` seconds of scaled time.
    ///
    /// Returns where to spawn a pickup, if one is due. An attempt blocked by
    /// the cap still waits a full interval before the next one.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        player: Option<Vec2>,
        rng: &mut R,
    ) -> Option<Vec2> {
        if self.stopped {
            return None;
        }
        self.until_spawn -= dt;
        let center = player?;
        if self.until_spawn > 0.0 {
            return None;
        }
        self.until_spawn = self.config.interval;

        if self.config.max_active > 0 && self.active >= self.config.max_active {
            return None;
        }
        self.active += 1;
        Some(polar_offset(
            center,
            self.config.min_distance,
            self.config.max_distance,
            rng,
        ))
    }

    /// Reports that one of this spawner's pickups is gone.
    pub fn on_despawned(&mut self) {
        self.active = self.active.saturating_sub(1);
    }

    /// Live pickups spawned by this spawner.
    #[must_use]
    pub fn active(&self) -> u32 {
        self.active
    }
}

impl Stoppable for PickupSpawner {
    fn stop_on_game_over(&mut self) {
        self.stopped = true;
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }
}
