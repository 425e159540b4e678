//! Crate-level tests that drive a whole [`Simulation`](crate::simulation::Simulation).
//!
//! Unit tests live next to the code they cover; these exercise the frame
//! pipeline end to end.

mod determinism;
mod helpers;
mod integration;

pub use helpers::*;
