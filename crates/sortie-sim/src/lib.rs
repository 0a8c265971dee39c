//! Simulation engine for sortie.
//!
//! Owns the hecs world of host targets, runs the ship, laser, wingman,
//! damage and particle stages once per display frame, and produces
//! `FrameSnapshot`s for the presentation layer.

pub mod bus;
pub mod engine;
pub mod ship;
pub mod systems;
pub mod targets;

pub use engine::{SimConfig, SimulationEngine};
pub use sortie_core as core;

#[cfg(test)]
mod tests;
