//! # Overdrive Core
//!
//! Gameplay simulation for Overdrive, a top-down arena shooter.
//!
//! The crate contains the rules only: no rendering, audio or device input.
//! A host samples player intent into an [`InputState`](input::InputState),
//! calls [`Simulation::frame`] once per rendered frame, and draws whatever
//! the [`Arena`](arena::Arena) holds afterwards.
//!
//! ## Architecture
//!
//! - **Entities**: player ship, enemies, bullets, shield pickups, stored in
//!   an id-ordered [`Arena`](arena::Arena)
//! - **Systems**: movement, steering, weapons, heat, physics, collision,
//!   spawning (see [`systems`])
//! - **Rules**: damage and shields ([`combat`]), score and ability points
//!   ([`score`]), upgrades and the freeze ability ([`abilities`]), game over
//!   ([`flow`])
//! - **Time**: a scalable clock ([`clock`]) plus cancellable timed effects
//!   ([`effect`])
//!
//! State changes are announced on an [`EventBus`](events::EventBus) for
//! HUDs and other observers.
//!
//! ## Usage
//!
//! ```rust
//! use overdrive_core::{InputState, SimConfig, Simulation};
//! use glam::Vec2;
//!
//! let mut sim = Simulation::new(SimConfig::default(), 7);
//! let input = InputState::moving(Vec2::X);
//! for _ in 0..60 {
//!     sim.frame(1.0 / 60.0, &input);
//! }
//! assert!(sim.player_position().unwrap().x > 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod abilities;
pub mod arena;
pub mod clock;
pub mod combat;
pub mod config;
pub mod effect;
pub mod entity;
pub mod error;
pub mod events;
pub mod flow;
pub mod input;
pub mod persistence;
pub mod score;
pub mod simulation;
pub mod systems;

pub use abilities::AbilityKind;
pub use config::SimConfig;
pub use entity::{EntityId, EntityTag};
pub use events::GameEvent;
pub use input::InputState;
pub use simulation::Simulation;

#[cfg(test)]
mod tests;
