//! Change notifications for the presentation layer.
//!
//! Every observable state change (health, shield, heat, score, ability
//! points, upgrade levels, deaths, game-over transitions) is published as a
//! [`GameEvent`] on the [`EventBus`]. Observers never feed back into the
//! simulation.
//!
//! Two ways to consume events:
//! - **Log**: every emitted event is appended to an internal log that the
//!   host drains with [`EventBus::take_events`], typically once per frame.
//! - **Listeners**: [`EventBus::subscribe`] registers a callback and returns a
//!   [`Subscription`]. Dropping the subscription unregisters the callback, so
//!   the observer's lifetime is tied to the value that holds it.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use overdrive_core::events::{EventBus, GameEvent};
//!
//! let mut bus = EventBus::new();
//! let seen = Rc::new(Cell::new(0));
//!
//! let counter = Rc::clone(&seen);
//! let subscription = bus.subscribe(move |event| {
//!     if matches!(event, GameEvent::ScoreChanged { .. }) {
//!         counter.set(counter.get() + 1);
//!     }
//! });
//!
//! bus.emit(GameEvent::ScoreChanged { score: 1 });
//! drop(subscription);
//! bus.emit(GameEvent::ScoreChanged { score: 2 });
//!
//! assert_eq!(seen.get(), 1);
//! assert_eq!(bus.take_events().len(), 2);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::abilities::UpgradeLevels;
use crate::entity::EntityId;

// =============================================================================
// GameEvent
// =============================================================================

/// A change notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An entity's health changed.
    HealthChanged {
        /// Entity whose health changed.
        entity: EntityId,
        /// New health.
        current: i32,
        /// Maximum health.
        max: i32,
    },
    /// The player's shield changed.
    ShieldChanged {
        /// New shield.
        current: i32,
        /// Maximum shield.
        max: i32,
    },
    /// The player weapon's heat changed.
    HeatChanged {
        /// New heat.
        current: f32,
        /// Overheat threshold.
        max: f32,
        /// Whether the weapon is locked out.
        overheated: bool,
    },
    /// The score changed.
    ScoreChanged {
        /// New score.
        score: u32,
    },
    /// The number of unspent ability points changed.
    AbilityPointsChanged {
        /// New balance.
        points: u32,
    },
    /// An upgrade level changed (or levels were reset).
    LevelsChanged(UpgradeLevels),
    /// An enemy died. Emitted once per enemy.
    EnemyKilled {
        /// The enemy.
        entity: EntityId,
    },
    /// The player died. Emitted once per playthrough.
    PlayerDied {
        /// The player entity.
        entity: EntityId,
    },
    /// The game-over presentation should be shown.
    GameOver,
    /// The camera should stop following the player.
    CameraFrozen,
    /// The global time multiplier was set to zero.
    TimeFrozen,
    /// The freeze ability started.
    FreezeStarted {
        /// Real-time seconds the freeze lasts.
        duration: f32,
    },
    /// The freeze ability ended and captured enemies were restored.
    FreezeEnded,
}

// =============================================================================
// EventBus
// =============================================================================

type Listener = Box<dyn FnMut(&GameEvent)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
    /// Ids unsubscribed while their listener was checked out by `emit`.
    removed: Vec<u64>,
}

/// Publishes [`GameEvent`]s to listeners and to a drainable log.
#[derive(Default)]
pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
    log: Vec<GameEvent>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .field("log", &self.log)
            .finish()
    }
}

impl EventBus {
    /// Creates a bus with no listeners and an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for every subsequent event.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped.
    pub fn subscribe<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut(&GameEvent) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Box::new(listener)));
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Records `event` and delivers it to every listener in subscription
    /// order.
    pub fn emit(&mut self, event: GameEvent) {
        // Listeners run without the registry borrowed, so they may drop
        // subscriptions (their own included) while being called.
        let mut active = std::mem::take(&mut self.registry.borrow_mut().listeners);
        for (_, listener) in &mut active {
            listener(&event);
        }

        let mut registry = self.registry.borrow_mut();
        let added = std::mem::replace(&mut registry.listeners, active);
        registry.listeners.extend(added);
        let removed = std::mem::take(&mut registry.removed);
        if !removed.is_empty() {
            registry.listeners.retain(|(id, _)| !removed.contains(id));
        }
        drop(registry);

        self.log.push(event);
    }

    /// Drains and returns all events emitted since the last call, in
    /// emission order.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.log)
    }

    /// Events emitted since the last drain.
    #[must_use]
    pub fn pending(&self) -> &[GameEvent] {
        &self.log
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

/// Registration handle returned by [`EventBus::subscribe`].
///
/// Dropping it unregisters the listener. A subscription that outlives its
/// bus does nothing on drop.
#[must_use = "dropping a Subscription unregisters its listener immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let Ok(mut registry) = registry.try_borrow_mut() else {
            return;
        };
        let before = registry.listeners.len();
        registry.listeners.retain(|(id, _)| *id != self.id);
        if registry.listeners.len() == before {
            registry.removed.push(self.id);
        }
    }
}
