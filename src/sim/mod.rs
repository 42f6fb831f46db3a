//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one 50 ms tick)
//! - Seeded RNG only
//! - Stable iteration order (objects in spawn order)
//! - No rendering or platform dependencies

pub mod catch;
pub mod state;
pub mod tick;

pub use catch::{is_caught, past_bottom};
pub use state::{Catcher, FallingObject, GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
