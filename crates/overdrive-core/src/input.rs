//! Player intent, sampled once per frame.
//!
//! The simulation never polls devices. The host fills an [`InputState`] (or
//! implements [`InputSource`]) and hands it to
//! [`Simulation::frame`](crate::simulation::Simulation::frame).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::abilities::AbilityKind;

/// Everything the player asked for this frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    /// Desired movement direction; normalized by the simulation.
    pub movement: Vec2,
    /// World point the ship aims at, if the aim device is active.
    pub aim_target: Option<Vec2>,
    /// Fire button is down.
    pub fire_held: bool,
    /// Fire button went down this frame.
    pub fire_pressed: bool,
    /// Ability hotkeys pressed this frame, performed in order.
    pub abilities: Vec<AbilityKind>,
}

impl InputState {
    /// No input at all.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// Movement only.
    #[must_use]
    pub fn moving(direction: Vec2) -> Self {
        Self {
            movement: direction,
            ..Self::default()
        }
    }

    /// Holds (and presses) the trigger while aiming at `target`.
    #[must_use]
    pub fn firing_at(target: Vec2) -> Self {
        Self {
            aim_target: Some(target),
            fire_held: true,
            fire_pressed: true,
            ..Self::default()
        }
    }

    /// Adds an ability request.
    #[must_use]
    pub fn with_ability(mut self, ability: AbilityKind) -> Self {
        self.abilities.push(ability);
        self
    }
}

/// Something that can be asked for the current frame's input.
pub trait InputSource {
    /// Samples input for the frame about to run.
    fn sample(&mut self) -> InputState;
}

/// Replays a fixed list of frames, then reports idle input.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: std::collections::VecDeque<InputState>,
}

impl ScriptedInput {
    /// Creates a source that yields `frames` in order.
    #[must_use]
    pub fn new(frames: impl IntoIterator<Item = InputState>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Frames not yet sampled.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn sample(&mut self) -> InputState {
        self.frames.pop_front().unwrap_or_default()
    }
}
