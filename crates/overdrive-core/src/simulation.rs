//! The top-level simulation driver.
//!
//! [`Simulation`] owns every piece of playthrough state (arena, clock, score
//! board, ability economy, game flow, spawners, event bus) and advances it
//! one frame at a time. Nothing is global; collaborators are passed in at
//! construction.
//!
//! # Frame order
//!
//! [`Simulation::frame`] runs, for one frame of `real_dt` seconds:
//!
//! 1. **Clock**: clamp `real_dt` to the stepper's frame budget, then scale it
//!    by the time multiplier.
//! 2. **Fixed steps** (1/60 s each, zero or more): enemy steering, physics
//!    integration, then collision contacts resolved one at a time. A damage
//!    application, including any death it causes, completes before the next
//!    contact is looked at.
//! 3. **Abilities** requested this frame, in order (only while the player
//!    lives).
//! 4. **Player**: movement, shield regeneration, weapon.
//! 5. **Enemy weapons**, **enemy hit reactions**, **lifetimes**,
//!    **spawners**.
//! 6. **Real-time effects**: the freeze ability and the delayed time freeze
//!    after death, which keep running when the multiplier is zero.
//!
//! Steps 2-5 only run while scaled time advances.
//!
//! # Determinism
//!
//! All randomness comes from one `ChaCha8Rng` seeded at construction, and
//! entities are visited in id order, so equal seeds and equal inputs give
//! equal playthroughs.
//!
//! # Example
//!
//! ```
//! use overdrive_core::config::SimConfig;
//! use overdrive_core::input::InputState;
//! use overdrive_core::simulation::Simulation;
//! use glam::Vec2;
//!
//! let mut sim = Simulation::new(SimConfig::default(), 42);
//! let enemy = sim.spawn_enemy(Vec2::new(4.0, 0.0));
//!
//! for _ in 0..3 {
//!     sim.apply_damage(enemy, 1, Vec2::ZERO);
//! }
//! assert!(!sim.arena().contains(enemy));
//! assert_eq!(sim.score().kills(), 1);
//!
//! sim.frame(1.0 / 60.0, &InputState::idle());
//! assert!(sim.is_player_alive());
//! ```

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::abilities::{AbilityEconomy, AbilityKind};
use crate::arena::Arena;
use crate::clock::SimClock;
use crate::combat::DamageOutcome;
use crate::config::SimConfig;
use crate::entity::components::{
    BulletComponents, BulletOwner, Color, EnemyComponents, PhysicsState, PickupComponents,
    PlayerComponents, Subsystems, TransformState,
};
use crate::entity::{Entity, EntityId, EntityInner, EntityTag};
use crate::error::AbilityError;
use crate::events::{EventBus, GameEvent};
use crate::flow::{GameFlow, Stoppable, StoppableId};
use crate::input::InputState;
use crate::persistence::{MemoryScoreStore, ScoreStore};
use crate::score::ScoreBoard;
use crate::systems::collision::{self, Contact};
use crate::systems::enemy_ai::step_enemies;
use crate::systems::physics::{self, FixedStepper};
use crate::systems::spawner::{EnemySpawner, PickupSpawner};

// =============================================================================
// Simulation
// =============================================================================

/// One game session: the current playthrough plus the last-score store.
pub struct Simulation {
    config: SimConfig,
    seed: u64,
    rng: ChaCha8Rng,
    clock: SimClock,
    stepper: FixedStepper,
    arena: Arena,
    player: Option<EntityId>,
    score: ScoreBoard,
    abilities: AbilityEconomy,
    flow: GameFlow,
    enemy_spawner: EnemySpawner,
    pickup_spawner: PickupSpawner,
    events: EventBus,
    store: Box<dyn ScoreStore>,
    last_score: Option<u32>,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("seed", &self.seed)
            .field("clock", &self.clock)
            .field("arena", &self.arena)
            .field("player", &self.player)
            .field("score", &self.score)
            .field("abilities", &self.abilities)
            .field("flow", &self.flow)
            .field("enemy_spawner", &self.enemy_spawner)
            .field("pickup_spawner", &self.pickup_spawner)
            .field("events", &self.events)
            .field("last_score", &self.last_score)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates a simulation with an in-memory score store.
    ///
    /// `config` is sanitized first. The player spawns at the origin.
    #[must_use]
    pub fn new(config: SimConfig, seed: u64) -> Self {
        Self::with_store(config, seed, Box::new(MemoryScoreStore::new()))
    }

    /// Creates a simulation that reads and writes the last score through
    /// `store`.
    ///
    /// A store that cannot be read is logged and treated as empty.
    #[must_use]
    pub fn with_store(config: SimConfig, seed: u64, store: Box<dyn ScoreStore>) -> Self {
        let config = config.sanitized();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let last_score = store.load_last_score().unwrap_or_else(|error| {
            warn!(%error, "could not read last score");
            None
        });
        let enemy_spawner = EnemySpawner::new(&config.enemy_spawner, &mut rng);

        let mut sim = Self {
            clock: SimClock::new(),
            stepper: FixedStepper::default(),
            arena: Arena::new(),
            player: None,
            score: ScoreBoard::new(&config.score),
            abilities: AbilityEconomy::new(&config.abilities),
            flow: GameFlow::new(),
            enemy_spawner,
            pickup_spawner: PickupSpawner::new(&config.pickup_spawner),
            events: EventBus::new(),
            store,
            last_score,
            config,
            seed,
            rng,
        };
        sim.begin_playthrough();
        sim
    }

    /// Replaces every per-playthrough system with a fresh one, then begins.
    fn reset_playthrough(&mut self) {
        self.clock = SimClock::new();
        self.stepper = FixedStepper::default();
        self.arena = Arena::new();
        self.score = ScoreBoard::new(&self.config.score);
        self.abilities = AbilityEconomy::new(&self.config.abilities);
        self.flow = GameFlow::new();
        self.enemy_spawner = EnemySpawner::new(&self.config.enemy_spawner, &mut self.rng);
        self.pickup_spawner = PickupSpawner::new(&self.config.pickup_spawner);
        self.begin_playthrough();
    }

    /// Registers the spawners with the game flow and spawns the player.
    ///
    /// Expects freshly built per-playthrough systems.
    fn begin_playthrough(&mut self) {
        self.flow.register(StoppableId::EnemySpawner);
        self.flow.register(StoppableId::PickupSpawner);

        let player = PlayerComponents::new(Vec2::ZERO, &self.config);
        let id = self.arena.spawn(EntityInner::Player(player));
        self.player = Some(id);
        self.publish_initial_state(id);
    }

    fn publish_initial_state(&mut self, player: EntityId) {
        if let Some(p) = self.arena.get(player).and_then(Entity::as_player) {
            self.events.emit(GameEvent::HealthChanged {
                entity: player,
                current: p.health.current,
                max: p.health.max,
            });
            self.events.emit(GameEvent::ShieldChanged {
                current: p.shield.current,
                max: p.shield.max,
            });
            self.events.emit(p.weapon.heat().changed_event());
        }
        self.events.emit(GameEvent::ScoreChanged {
            score: self.score.score(),
        });
        self.events.emit(GameEvent::AbilityPointsChanged {
            points: self.score.ability_points(),
        });
        self.events
            .emit(GameEvent::LevelsChanged(self.abilities.levels()));
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Advances the simulation by `real_dt` seconds of wall-clock time.
    ///
    /// Frames longer than [`FixedStepper::max_frame`] are clamped once, up
    /// front, so fixed-step motion and the per-frame timers (lifetimes,
    /// weapon heat, spawners, real-time effects) all see the same span.
    pub fn frame(&mut self, real_dt: f32, input: &InputState) {
        let real_dt = self.stepper.clamp_frame(real_dt);
        let dt = self.clock.advance(real_dt);

        if dt > 0.0 {
            let steps = self.stepper.advance(dt);
            let step = self.stepper.step();
            for _ in 0..steps {
                self.fixed_step(step);
            }

            if self.is_player_alive() {
                for &kind in &input.abilities {
                    if let Err(error) = self.perform_ability(kind) {
                        debug!(ability = %kind, %error, "ability refused");
                    }
                }
            }

            let now = self.clock.sim_time();
            self.update_player(input, dt, now);
            self.update_enemy_weapons(now);
            self.update_enemy_effects(dt);
            self.update_lifetimes(dt);
            self.update_spawners(dt);
        }

        self.abilities
            .advance(real_dt, &mut self.arena, &mut self.events);
        self.flow
            .advance(real_dt, &mut self.clock, &mut self.events);
    }

    fn fixed_step(&mut self, step: f32) {
        if let Some(target) = self.player_position() {
            step_enemies(
                &mut self.arena,
                &self.config.enemy.ai,
                target,
                step,
                &mut self.rng,
            );
        }
        physics::integrate(&mut self.arena, step);

        for contact in collision::detect(&self.arena) {
            self.resolve_contact(contact);
        }
        self.arena.advance_tick();
    }

    fn resolve_contact(&mut self, contact: Contact) {
        match contact {
            Contact::BulletHitEnemy {
                bullet,
                enemy,
                damage,
                source,
            } => {
                if self.arena.contains(bullet) && self.arena.contains(enemy) {
                    self.despawn(bullet);
                    self.apply_damage(enemy, damage, source);
                }
            }
            Contact::BulletHitPlayer {
                bullet,
                player,
                damage,
            } => {
                let Some(source) = self.arena.get(bullet).map(Entity::position) else {
                    return;
                };
                if self.arena.contains(player) {
                    self.despawn(bullet);
                    self.apply_damage(player, damage, source);
                }
            }
            Contact::BulletAbsorbed { bullet } => {
                self.despawn(bullet);
            }
            Contact::PlayerTouchedPickup { player, pickup } => {
                let Some(value) = self
                    .arena
                    .get(pickup)
                    .and_then(Entity::as_pickup)
                    .map(|p| p.shield_value)
                else {
                    return;
                };
                let consumed = self
                    .arena
                    .get_mut(player)
                    .and_then(Entity::as_player_mut)
                    .is_some_and(|p| p.try_add_shield(value, &mut self.events));
                if consumed {
                    self.despawn(pickup);
                }
            }
        }
    }

    fn update_player(&mut self, input: &InputState, dt: f32, now: f64) {
        let Some(id) = self.player else {
            return;
        };
        let Some(p) = self.arena.get_mut(id).and_then(Entity::as_player_mut) else {
            return;
        };

        if p.subsystems.contains(Subsystems::MOVEMENT) {
            p.motion.step(
                &self.config.player,
                input.movement,
                input.aim_target,
                dt,
                &mut p.transform,
            );
        }

        p.regenerate_shield(&self.config.player.shield, now, dt, &mut self.events);

        if !p.subsystems.contains(Subsystems::WEAPON) {
            return;
        }
        let requested = p.weapon.wants_to_fire(input.fire_held, input.fire_pressed);
        let direction = p.weapon.aim_direction(&p.transform, input.aim_target);
        let origin = p.transform.position;
        let shot = p
            .weapon
            .update(now, dt, requested, direction, &mut self.events);
        if let Some(shot) = shot {
            self.spawn_bullet(
                origin,
                shot.direction * shot.speed,
                shot.damage,
                BulletOwner::Player,
                Some(id),
            );
        }
    }

    fn update_enemy_weapons(&mut self, now: f64) {
        let Some(target) = self.player_position() else {
            return;
        };
        let config = &self.config.enemy.weapon;

        let mut shots = Vec::new();
        for id in self.arena.ids_with_tag(EntityTag::Enemy) {
            let Some(enemy) = self.arena.get_mut(id).and_then(Entity::as_enemy_mut) else {
                continue;
            };
            if !enemy.subsystems.contains(Subsystems::WEAPON) {
                continue;
            }
            let from = enemy.transform.position;
            if let Some(direction) = enemy.weapon.try_fire(config, now, from, target) {
                shots.push((id, from, direction));
            }
        }

        let speed = self.config.enemy.weapon.bullet_speed;
        let damage = self.config.player.enemy_bullet_damage;
        for (shooter, from, direction) in shots {
            self.spawn_bullet(
                from,
                direction * speed,
                damage,
                BulletOwner::Enemy,
                Some(shooter),
            );
        }
    }

    fn update_enemy_effects(&mut self, dt: f32) {
        for id in self.arena.ids_with_tag(EntityTag::Enemy) {
            if let Some(enemy) = self.arena.get_mut(id).and_then(Entity::as_enemy_mut) {
                enemy.advance_effects(dt);
            }
        }
    }

    fn update_lifetimes(&mut self, dt: f32) {
        let mut expired = Vec::new();
        for entity in self.arena.entities_sorted_mut() {
            let remaining = match entity.inner_mut() {
                EntityInner::Bullet(b) => Some(&mut b.remaining_life),
                EntityInner::Pickup(p) => p.remaining_life.as_mut(),
                EntityInner::Player(_) | EntityInner::Enemy(_) => None,
            };
            if let Some(life) = remaining {
                *life -= dt;
                if *life <= 0.0 {
                    expired.push(entity.id());
                }
            }
        }
        for id in expired {
            self.despawn(id);
        }
    }

    fn update_spawners(&mut self, dt: f32) {
        let around = self.player_position();
        if let Some(at) = self.enemy_spawner.update(dt, around, &mut self.rng) {
            self.spawn_enemy_owned(at, true);
        }
        if let Some(at) = self.pickup_spawner.update(dt, around, &mut self.rng) {
            self.spawn_pickup_owned(at, true);
        }
    }

    // =========================================================================
    // Damage and death
    // =========================================================================

    /// Applies `amount` damage to `target`, coming from `source`.
    ///
    /// Any death this causes is fully handled before returning: an enemy is
    /// scored and removed, a player's death starts the game-over flow.
    /// Unknown targets, bullets and pickups are ignored.
    pub fn apply_damage(&mut self, target: EntityId, amount: i32, source: Vec2) -> DamageOutcome {
        let now = self.clock.sim_time();
        let Some(entity) = self.arena.get_mut(target) else {
            return DamageOutcome::Ignored;
        };
        let tag = entity.tag();

        let outcome = match entity.inner_mut() {
            EntityInner::Player(p) => p.take_damage(target, amount, now, &mut self.events),
            EntityInner::Enemy(e) => e.take_hit(
                target,
                &self.config.enemy,
                amount,
                source,
                &mut self.rng,
                &mut self.events,
            ),
            EntityInner::Bullet(_) | EntityInner::Pickup(_) => return DamageOutcome::Ignored,
        };

        if outcome == DamageOutcome::Killed {
            match tag {
                EntityTag::Player => self.on_player_died(target),
                EntityTag::Enemy => {
                    self.score.add_kill(&mut self.events);
                    self.despawn(target);
                }
                EntityTag::Bullet | EntityTag::Pickup => {}
            }
        }
        outcome
    }

    fn on_player_died(&mut self, player: EntityId) {
        let at = self
            .arena
            .get(player)
            .map_or(Vec2::ZERO, Entity::position);
        self.abilities
            .reset(&mut self.arena, Some(player), &mut self.events);

        let delay = self.config.freeze_after_death_seconds();
        let Self {
            flow,
            clock,
            events,
            arena,
            enemy_spawner,
            pickup_spawner,
            ..
        } = self;
        flow.handle_player_death(delay, at, clock, events, |id| match id {
            StoppableId::EnemySpawner => enemy_spawner.stop_on_game_over(),
            StoppableId::PickupSpawner => pickup_spawner.stop_on_game_over(),
            StoppableId::EnemyWeapon(enemy) => {
                if let Some(e) = arena.get_mut(enemy).and_then(Entity::as_enemy_mut) {
                    e.weapon.stop_on_game_over();
                }
            }
        });
    }

    // =========================================================================
    // Abilities
    // =========================================================================

    /// Performs an ability for the current player.
    ///
    /// # Errors
    ///
    /// See [`AbilityEconomy::perform`]. On error nothing changed.
    pub fn perform_ability(&mut self, kind: AbilityKind) -> Result<(), AbilityError> {
        self.abilities.perform(
            kind,
            &mut self.arena,
            self.player,
            &mut self.score,
            &mut self.events,
        )
    }

    // =========================================================================
    // Spawning
    // =========================================================================

    /// Spawns an enemy at `position` outside the spawner's population cap.
    pub fn spawn_enemy(&mut self, position: Vec2) -> EntityId {
        self.spawn_enemy_owned(position, false)
    }

    fn spawn_enemy_owned(&mut self, position: Vec2, spawner_owned: bool) -> EntityId {
        let palette = &self.config.enemy.palette;
        let tint = if self.config.enemy.randomize_tint && !palette.is_empty() {
            palette[self.rng.gen_range(0..palette.len())]
        } else {
            palette.first().copied().unwrap_or(Color::SPAWN_PALETTE[0])
        };

        let mut enemy = EnemyComponents::new(position, tint, &self.config);
        enemy.spawner_owned = spawner_owned;
        let id = self.arena.spawn(EntityInner::Enemy(enemy));
        self.flow.register(StoppableId::EnemyWeapon(id));
        debug!(entity = %id, x = position.x, y = position.y, "enemy spawned");
        id
    }

    /// Spawns a shield pickup at `position` outside the spawner's cap.
    pub fn spawn_pickup(&mut self, position: Vec2) -> EntityId {
        self.spawn_pickup_owned(position, false)
    }

    fn spawn_pickup_owned(&mut self, position: Vec2, spawner_owned: bool) -> EntityId {
        let config = &self.config.pickup_spawner;
        let pickup = PickupComponents {
            transform: TransformState::new(position, 0.0),
            radius: config.radius,
            shield_value: config.shield_value,
            remaining_life: (config.lifetime > 0.0).then_some(config.lifetime),
            spawner_owned,
        };
        let id = self.arena.spawn(EntityInner::Pickup(pickup));
        debug!(entity = %id, "pickup spawned");
        id
    }

    fn spawn_bullet(
        &mut self,
        from: Vec2,
        velocity: Vec2,
        damage: i32,
        owner: BulletOwner,
        shooter: Option<EntityId>,
    ) -> EntityId {
        let mut physics = PhysicsState::with_radius(self.config.bullet.radius);
        physics.velocity = velocity;
        self.arena.spawn(EntityInner::Bullet(BulletComponents {
            transform: TransformState::new(from, velocity.y.atan2(velocity.x)),
            physics,
            owner,
            shooter,
            damage,
            remaining_life: self.config.bullet.lifetime,
        }))
    }

    /// Removes an entity and tells whoever tracks it.
    ///
    /// Enemy weapons leave the game-over registry and spawner-owned
    /// entities free a slot in their spawner's cap. Returns `false` if the
    /// entity did not exist.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.arena.despawn(id) else {
            return false;
        };
        match entity.inner() {
            EntityInner::Enemy(e) => {
                self.flow.unregister(StoppableId::EnemyWeapon(id));
                if e.spawner_owned {
                    self.enemy_spawner.on_despawned();
                }
            }
            EntityInner::Pickup(p) => {
                if p.spawner_owned {
                    self.pickup_spawner.on_despawned();
                }
            }
            EntityInner::Player(_) => {
                if self.player == Some(id) {
                    self.player = None;
                }
            }
            EntityInner::Bullet(_) => {}
        }
        true
    }

    // =========================================================================
    // Playthrough lifecycle
    // =========================================================================

    /// Stores the current score as the last score and starts a new
    /// playthrough.
    ///
    /// A store that cannot be written is logged; the restart still happens.
    pub fn restart(&mut self) {
        let score = self.score.score();
        if let Err(error) = self.store.save_last_score(score) {
            warn!(%error, score, "could not store last score");
        }
        self.last_score = Some(score);
        info!(score, "restarting");
        self.reset_playthrough();
    }

    /// Score of the previous playthrough, if any.
    #[must_use]
    pub fn last_score(&self) -> Option<u32> {
        self.last_score
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The sanitized configuration.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The seed the simulation was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// All entities.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Mutable access to all entities.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Simulation and real time.
    #[must_use]
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// The player's id, while the player entity exists.
    #[must_use]
    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    /// The player's components.
    #[must_use]
    pub fn player_components(&self) -> Option<&PlayerComponents> {
        self.player
            .and_then(|id| self.arena.get(id))
            .and_then(Entity::as_player)
    }

    /// Position of the player entity, dead or alive.
    #[must_use]
    pub fn player_position(&self) -> Option<Vec2> {
        self.player_components().map(|p| p.transform.position)
    }

    /// Returns `true` while the player exists and has not died.
    #[must_use]
    pub fn is_player_alive(&self) -> bool {
        self.player_components()
            .is_some_and(|p| !p.health.is_dead())
    }

    /// Score, kills and ability points.
    #[must_use]
    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    /// Upgrade levels and the freeze ability.
    #[must_use]
    pub fn abilities(&self) -> &AbilityEconomy {
        &self.abilities
    }

    /// Game-over state and the stoppable registry.
    #[must_use]
    pub fn flow(&self) -> &GameFlow {
        &self.flow
    }

    /// Returns `true` once the player's death has been handled.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.flow.is_game_over()
    }

    /// The enemy spawner.
    #[must_use]
    pub fn enemy_spawner(&self) -> &EnemySpawner {
        &self.enemy_spawner
    }

    /// The pickup spawner.
    #[must_use]
    pub fn pickup_spawner(&self) -> &PickupSpawner {
        &self.pickup_spawner
    }

    /// Whether the subsystem behind `id` has stopped, or `None` if it no
    /// longer exists.
    #[must_use]
    pub fn is_stopped(&self, id: StoppableId) -> Option<bool> {
        match id {
            StoppableId::EnemySpawner => Some(self.enemy_spawner.is_stopped()),
            StoppableId::PickupSpawner => Some(self.pickup_spawner.is_stopped()),
            StoppableId::EnemyWeapon(enemy) => self
                .arena
                .get(enemy)
                .and_then(Entity::as_enemy)
                .map(|e| e.weapon.is_stopped()),
        }
    }

    /// The event bus, for subscribing listeners.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Drains the events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.events.take_events()
    }
}
