//! Game-over orchestration.
//!
//! [`GameFlow`] keeps a registry of subsystems that must stop when the
//! player dies and runs the transition from "playing" to "frozen":
//!
//! 1. Every registered [`StoppableId`] is told to stop (registry snapshot,
//!    insertion order).
//! 2. The camera is frozen at the player's last position.
//! 3. The game-over presentation is requested.
//! 4. After a delay measured in *real* time, the clock's time multiplier is
//!    set to zero.
//!
//! The transition runs at most once per playthrough; later death
//! notifications are ignored.
//!
//! The registry holds handles rather than references. Whoever owns the
//! actual subsystems resolves a handle to its [`Stoppable`] when the flow
//! asks for it to be stopped.

use glam::Vec2;
use tracing::{debug, info};

use crate::clock::SimClock;
use crate::effect::{EffectSlot, TimedEffect, Timer};
use crate::entity::EntityId;
use crate::events::{EventBus, GameEvent};

/// A subsystem that halts its own activity on game over.
pub trait Stoppable {
    /// Stops the subsystem for the rest of the playthrough.
    fn stop_on_game_over(&mut self);

    /// Returns `true` once stopped.
    fn is_stopped(&self) -> bool;
}

/// Handle to a registered [`Stoppable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoppableId {
    /// The enemy spawner.
    EnemySpawner,
    /// The shield pickup spawner.
    PickupSpawner,
    /// The weapon of one enemy.
    EnemyWeapon(EntityId),
}

// =============================================================================
// DelayedTimeFreeze
// =============================================================================

/// Sets the time multiplier to zero once its (real-time) timer runs out.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayedTimeFreeze {
    timer: Timer,
}

impl DelayedTimeFreeze {
    /// Creates a freeze that lands after `delay` seconds.
    #[must_use]
    pub fn new(delay: f32) -> Self {
        Self {
            timer: Timer::new(delay),
        }
    }
}

impl TimedEffect for DelayedTimeFreeze {
    type Target = SimClock;

    fn timer_mut(&mut self) -> &mut Timer {
        &mut self.timer
    }

    fn on_complete(self, clock: &mut SimClock) {
        clock.set_time_scale(0.0);
    }

    fn on_cancel(self, _clock: &mut SimClock) {}
}

// =============================================================================
// GameFlow
// =============================================================================

/// Registry of stoppable subsystems plus the one-shot death handler.
#[derive(Debug, Clone, Default)]
pub struct GameFlow {
    stoppables: Vec<StoppableId>,
    handled_death: bool,
    camera_frozen_at: Option<Vec2>,
    pending_freeze: EffectSlot<DelayedTimeFreeze>,
}

impl GameFlow {
    /// Creates an empty flow for a new playthrough.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id`. Registering a handle twice is a no-op.
    ///
    /// Returns `true` if the handle was added.
    pub fn register(&mut self, id: StoppableId) -> bool {
        if self.stoppables.contains(&id) {
            return false;
        }
        self.stoppables.push(id);
        true
    }

    /// Removes `id`. Returns `true` if it was registered.
    pub fn unregister(&mut self, id: StoppableId) -> bool {
        let before = self.stoppables.len();
        self.stoppables.retain(|s| *s != id);
        before != self.stoppables.len()
    }

    /// Registered handles, in registration order.
    #[must_use]
    pub fn registered(&self) -> &[StoppableId] {
        &self.stoppables
    }

    /// Handles the player's death.
    ///
    /// On the first call: stops every registered subsystem through `stop`,
    /// freezes the camera at `camera_at`, requests the game-over screen and
    /// schedules the time freeze after `delay` real seconds (immediately if
    /// `delay <= 0`). Later calls do nothing.
    ///
    /// Returns `true` if this call handled the death.
    pub fn handle_player_death(
        &mut self,
        delay: f32,
        camera_at: Vec2,
        clock: &mut SimClock,
        events: &mut EventBus,
        mut stop: impl FnMut(StoppableId),
    ) -> bool {
        if self.handled_death {
            return false;
        }
        self.handled_death = true;

        let snapshot = self.stoppables.clone();
        for id in snapshot {
            stop(id);
        }
        debug!(count = self.stoppables.len(), "stopped gameplay systems");

        self.camera_frozen_at = Some(camera_at);
        events.emit(GameEvent::CameraFrozen);
        events.emit(GameEvent::GameOver);

        let delay = delay.max(0.0);
        info!(delay, "game over");
        if delay > 0.0 {
            self.pending_freeze
                .start(DelayedTimeFreeze::new(delay), clock);
        } else {
            freeze_time(clock, events);
        }
        true
    }

    /// Advances the pending time freeze by `real_dt` unscaled seconds.
    pub fn advance(&mut self, real_dt: f32, clock: &mut SimClock, events: &mut EventBus) {
        if self.pending_freeze.advance(real_dt, clock) {
            info!("time frozen");
            events.emit(GameEvent::TimeFrozen);
        }
    }

    /// Returns `true` once the player's death has been handled.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.handled_death
    }

    /// Where the camera stopped following the player, after game over.
    #[must_use]
    pub fn camera_frozen_at(&self) -> Option<Vec2> {
        self.camera_frozen_at
    }

    /// Returns `true` while the time freeze is scheduled but has not landed.
    #[must_use]
    pub fn is_freeze_pending(&self) -> bool {
        self.pending_freeze.is_active()
    }
}

fn freeze_time(clock: &mut SimClock, events: &mut EventBus) {
    clock.set_time_scale(0.0);
    info!("time frozen");
    events.emit(GameEvent::TimeFrozen);
}

#[cfg(test)]
mod tests {
    use super::*;

    mod registry_tests {
        use super::*;

        #[test]
        fn register_is_duplicate_safe() {
            let mut flow = GameFlow::new();
            assert!(flow.register(StoppableId::EnemySpawner));
            assert!(flow.register(StoppableId::EnemyWeapon(EntityId::new(3))));
            assert!(!flow.register(StoppableId::EnemySpawner));
            assert_eq!(
                flow.registered(),
                &[
                    StoppableId::EnemySpawner,
                    StoppableId::EnemyWeapon(EntityId::new(3))
                ]
            );
        }

        #[test]
        fn unregister_removes() {
            let mut flow = GameFlow::new();
            flow.register(StoppableId::PickupSpawner);
            assert!(flow.unregister(StoppableId::PickupSpawner));
            assert!(!flow.unregister(StoppableId::PickupSpawner));
            assert!(flow.registered().is_empty());
        }
    }

    mod death_tests {
        use super::*;

        fn flow_with(ids: &[StoppableId]) -> GameFlow {
            let mut flow = GameFlow::new();
            for id in ids {
                flow.register(*id);
            }
            flow
        }

        #[test]
        fn death_stops_everything_once() {
            let ids = [
                StoppableId::EnemySpawner,
                StoppableId::PickupSpawner,
                StoppableId::EnemyWeapon(EntityId::new(7)),
            ];
            let mut flow = flow_with(&ids);
            let mut clock = SimClock::new();
            let mut events = EventBus::new();
            let mut stopped = Vec::new();

            assert!(flow.handle_player_death(3.0, Vec2::ONE, &mut clock, &mut events, |id| {
                stopped.push(id);
            }));
            assert!(!flow.handle_player_death(3.0, Vec2::ZERO, &mut clock, &mut events, |id| {
                stopped.push(id);
            }));

            assert_eq!(stopped, ids);
            assert!(flow.is_game_over());
            assert_eq!(flow.camera_frozen_at(), Some(Vec2::ONE));
            let game_overs = events
                .take_events()
                .into_iter()
                .filter(|e| *e == GameEvent::GameOver)
                .count();
            assert_eq!(game_overs, 1);
        }

        #[test]
        fn time_freezes_after_real_time_delay() {
            let mut flow = GameFlow::new();
            let mut clock = SimClock::new();
            let mut events = EventBus::new();
            flow.handle_player_death(3.0, Vec2::ZERO, &mut clock, &mut events, |_| {});

            flow.advance(2.0, &mut clock, &mut events);
            assert!(!clock.is_frozen());
            assert!(flow.is_freeze_pending());

            flow.advance(1.0, &mut clock, &mut events);
            assert!(clock.is_frozen());
            assert!(!flow.is_freeze_pending());
            assert_eq!(events.take_events().last(), Some(&GameEvent::TimeFrozen));
        }

        #[test]
        fn zero_delay_freezes_immediately() {
            let mut flow = GameFlow::new();
            let mut clock = SimClock::new();
            let mut events = EventBus::new();
            flow.handle_player_death(0.0, Vec2::ZERO, &mut clock, &mut events, |_| {});
            assert!(clock.is_frozen());
            assert!(!flow.is_freeze_pending());
        }

        #[test]
        fn delay_runs_while_time_scale_is_zero() {
            let mut flow = GameFlow::new();
            let mut clock = SimClock::new();
            let mut events = EventBus::new();
            clock.set_time_scale(0.0);
            flow.handle_player_death(1.0, Vec2::ZERO, &mut clock, &mut events, |_| {});
            flow.advance(1.0, &mut clock, &mut events);
            assert!(events.pending().contains(&GameEvent::TimeFrozen));
        }
    }

    mod stoppable_tests {
        use super::*;

        #[derive(Default)]
        struct Spawner {
            stopped: bool,
        }

        impl Stoppable for Spawner {
            fn stop_on_game_over(&mut self) {
                self.stopped = true;
            }

            fn is_stopped(&self) -> bool {
                self.stopped
            }
        }

        #[test]
        fn handles_resolve_to_stoppables() {
            let mut flow = GameFlow::new();
            flow.register(StoppableId::EnemySpawner);
            let mut spawner = Spawner::default();
            let mut clock = SimClock::new();
            let mut events = EventBus::new();

            flow.handle_player_death(1.0, Vec2::ZERO, &mut clock, &mut events, |id| {
                if id == StoppableId::EnemySpawner {
                    spawner.stop_on_game_over();
                }
            });
            assert!(spawner.is_stopped());
        }
    }
}
