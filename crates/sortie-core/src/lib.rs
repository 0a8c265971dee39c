//! Core types and definitions for the sortie simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geometry, tuning constants, commands, events, frame snapshots and the
//! decision-service wire format. It has no dependency on any runtime.

pub mod commands;
pub mod components;
pub mod constants;
pub mod decision;
pub mod enums;
pub mod events;
pub mod geometry;
pub mod math;
pub mod state;
pub mod types;
