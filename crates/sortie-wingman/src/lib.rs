//! Wingman agent for sortie.
//!
//! An escort that activates when the player fires in earnest, flies with
//! arrival steering, takes advisory orders from a remote decision service
//! and talks over a single queued narration channel.
//! No ECS dependency; operates on plain data.

pub mod actions;
pub mod activation;
pub mod agent;
pub mod burst;
pub mod escort;
pub mod poller;
pub mod speech;
pub mod steering;
pub mod waypoint;

pub use agent::{Wingman, WingmanContext};
pub use sortie_core as core;
