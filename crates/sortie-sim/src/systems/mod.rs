//! Per-frame simulation stages.
//!
//! Target state lives in hecs components; projectiles and particles live in
//! the flat vectors of their layer. Stages take what they touch explicitly.

pub mod damage;
pub mod lasers;
pub mod masked_text;
pub mod particles;
pub mod snapshot;
