//! Trashfall - a falling-object catching arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, falling, catching, game state)
//! - `app`: Screen and dialog state machine (Home ⇄ Game)
//! - `audio`: Music track lifecycle
//! - `settings`: User preferences

pub mod app;
pub mod audio;
pub mod settings;
pub mod sim;

pub use app::{App, Screen};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (20 Hz, matching the
    /// original 50 ms update cadence)
    pub const TICK_MS: u32 = 50;
    /// Fixed simulation timestep in seconds
    pub const TICK_DT: f32 = TICK_MS as f32 / 1000.0;

    /// Ticks between object spawns (1500 ms at the 50 ms clock)
    pub const SPAWN_INTERVAL_TICKS: u32 = 30;
    /// Vertical distance an object falls per tick (100 units/sec)
    pub const FALL_STEP: f32 = 5.0;

    /// Per-axis proximity threshold for a catch
    pub const CATCH_RANGE: f32 = 50.0;

    /// Catcher sprite is a square of this side
    pub const CATCHER_SIZE: f32 = 50.0;
    /// Falling-object sprite is a square of this side
    pub const OBJECT_SIZE: f32 = 30.0;
    /// The catcher's fixed y sits this far above the bottom edge
    pub const CATCHER_BASELINE: f32 = 100.0;

    /// Default field dimensions (native demo and tests; the wasm shell uses
    /// the canvas client size instead)
    pub const DEFAULT_FIELD_WIDTH: f32 = 400.0;
    pub const DEFAULT_FIELD_HEIGHT: f32 = 800.0;
}

/// Map a raw pointer x coordinate to a catcher x position, centering the
/// catcher sprite on the pointer. Deliberately unclamped: the catcher may be
/// dragged past the field edges.
#[inline]
pub fn pointer_to_catcher_x(pointer_x: f32) -> f32 {
    pointer_x - consts::CATCHER_SIZE / 2.0
}
