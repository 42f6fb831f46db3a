//! Fixed timestep simulation tick
//!
//! The original game ran spawn, fall, and catch checks on three independent
//! timers, which left the fall/catch ordering up to timer registration
//! order. Here they are merged into one 50 ms tick with a fixed order:
//! input, fall, spawn, catch, failure check.

use std::cmp::Ordering;

use super::catch::{is_caught, past_bottom};
use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Target catcher x from the drag input, already centered on the pointer
    /// by the input layer. Applied verbatim, unclamped.
    pub target_x: Option<f32>,
    /// Demo mode - steer the catcher toward the most urgent object
    pub autopilot: bool,
}

/// Advance the game by one fixed 50 ms tick.
///
/// Does nothing in any phase other than `Playing`: score, object list, and
/// catcher position are all frozen while paused or while a prompt is up.
pub fn tick(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
    if state.is_paused() {
        return Vec::new();
    }

    let mut events = Vec::new();
    state.time_ticks += 1;

    // Move the catcher. Autopilot chases the lowest object on the field.
    let target_x = if input.autopilot {
        state
            .objects
            .iter()
            .max_by(|a, b| a.pos.y.partial_cmp(&b.pos.y).unwrap_or(Ordering::Equal))
            .map(|o| o.pos.x)
            .or(input.target_x)
    } else {
        input.target_x
    };
    if let Some(x) = target_x {
        state.catcher.move_to(x);
    }

    // Fall before spawn so a fresh object is first seen at y = 0
    for obj in &mut state.objects {
        obj.pos.y += FALL_STEP;
    }

    // Spawn cadence: one object every SPAWN_INTERVAL_TICKS, no cap
    state.spawn_countdown -= 1;
    if state.spawn_countdown == 0 {
        state.spawn_countdown = SPAWN_INTERVAL_TICKS;
        state.spawn_object();
    }

    // Catches: each removes exactly one object and scores one point
    let catcher = state.catcher.pos;
    state.objects.retain(|obj| {
        if is_caught(obj.pos, catcher) {
            events.push(GameEvent::Caught { id: obj.id });
            false
        } else {
            true
        }
    });
    state.score += events.len() as u32;

    // Failure check runs on the post-catch list: an object caught the same
    // tick it crossed the bottom counts as a catch, not a miss. At most one
    // failure per episode regardless of how many objects are past the edge.
    if state
        .objects
        .iter()
        .any(|o| past_bottom(o.pos, state.field.y))
    {
        state.fail();
        events.push(GameEvent::Failed);
    }

    events
}
