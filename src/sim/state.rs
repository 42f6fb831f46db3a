//! Game state and core simulation types

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Frozen while the tab/window is unfocused
    Paused,
    /// An object reached the bottom; waiting on the continue/exit choice
    FailurePrompt,
    /// The music track ended; waiting on the completion acknowledgment
    Finished,
}

/// Something that fell from the top of the field
#[derive(Debug, Clone, Copy)]
pub struct FallingObject {
    pub id: u32,
    /// x is fixed at spawn; y only ever increases
    pub pos: Vec2,
}

/// The player-controlled catcher
#[derive(Debug, Clone, Copy)]
pub struct Catcher {
    /// y is fixed for the whole run; x follows the drag input
    pub pos: Vec2,
}

impl Catcher {
    /// Start centered horizontally, a fixed margin above the bottom edge
    pub fn new(field: Vec2) -> Self {
        Self {
            pos: Vec2::new(field.x / 2.0, field.y - CATCHER_BASELINE),
        }
    }

    /// Follow the drag input. Unclamped: the catcher may leave the field.
    pub fn move_to(&mut self, x: f32) {
        self.pos.x = x;
    }
}

/// Events produced by a tick, for the shell to react to (HUD, prompts)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// An object was caught and scored
    Caught { id: u32 },
    /// An object reached the bottom; the run is now in `FailurePrompt`
    Failed,
}

/// Complete per-run game state (deterministic for a given seed and input
/// sequence; discarded when the player returns to the Home screen)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Field dimensions (width, height)
    pub field: Vec2,
    /// Objects caught this run
    pub score: u32,
    /// Current phase
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Ticks until the next spawn
    pub spawn_countdown: u32,
    /// Player catcher
    pub catcher: Catcher,
    /// Active objects, in spawn order, unbounded
    pub objects: Vec<FallingObject>,
    rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a fresh run on a field of the given size
    pub fn new(seed: u64, field_width: f32, field_height: f32) -> Self {
        let field = Vec2::new(field_width, field_height);
        Self {
            seed,
            field,
            score: 0,
            phase: GamePhase::Playing,
            time_ticks: 0,
            spawn_countdown: SPAWN_INTERVAL_TICKS,
            catcher: Catcher::new(field),
            objects: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Append one object at a uniformly random x along the top edge
    pub fn spawn_object(&mut self) -> u32 {
        let id = self.next_entity_id();
        let x = self.rng.random_range(0.0..self.field.x);
        self.objects.push(FallingObject {
            id,
            pos: Vec2::new(x, 0.0),
        });
        id
    }

    /// True in any phase where ticks must not advance state
    pub fn is_paused(&self) -> bool {
        self.phase != GamePhase::Playing
    }

    /// Freeze for loss of focus. Prompt phases take precedence: a blur while
    /// a dialog is up must not demote it to a plain pause.
    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
        }
    }

    /// Undo a focus-loss pause. Prompt phases stay put.
    pub fn unpause(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
        }
    }

    /// Enter the failure prompt (an object reached the bottom)
    pub fn fail(&mut self) {
        self.phase = GamePhase::FailurePrompt;
    }

    /// Continue playing after the failure prompt. Objects already past the
    /// bottom are dropped so the new episode does not fail on its first
    /// tick; score and in-field objects are untouched.
    pub fn resume_after_failure(&mut self) {
        if self.phase == GamePhase::FailurePrompt {
            let bottom = self.field.y;
            self.objects.retain(|o| o.pos.y <= bottom);
            self.phase = GamePhase::Playing;
        }
    }

    /// The music track ended: the run is complete
    pub fn finish(&mut self) {
        self.phase = GamePhase::Finished;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catcher_starts_centered_above_bottom() {
        let state = GameState::new(1, 400.0, 800.0);
        assert_eq!(state.catcher.pos.x, 200.0);
        assert_eq!(state.catcher.pos.y, 700.0);
    }

    #[test]
    fn test_spawn_in_field_range() {
        let mut state = GameState::new(42, 400.0, 800.0);
        for _ in 0..100 {
            state.spawn_object();
        }
        assert_eq!(state.objects.len(), 100);
        for obj in &state.objects {
            assert!(obj.pos.x >= 0.0 && obj.pos.x < 400.0);
            assert_eq!(obj.pos.y, 0.0);
        }
    }

    #[test]
    fn test_spawn_ids_follow_spawn_order() {
        let mut state = GameState::new(7, 400.0, 800.0);
        let a = state.spawn_object();
        let b = state.spawn_object();
        assert!(b > a);
        assert_eq!(state.objects[0].id, a);
        assert_eq!(state.objects[1].id, b);
    }

    #[test]
    fn test_pause_does_not_clobber_prompts() {
        let mut state = GameState::new(1, 400.0, 800.0);
        state.fail();
        state.pause();
        assert_eq!(state.phase, GamePhase::FailurePrompt);

        state.finish();
        state.unpause();
        assert_eq!(state.phase, GamePhase::Finished);
    }

    #[test]
    fn test_resume_after_failure_drops_only_fallen_objects() {
        let mut state = GameState::new(1, 400.0, 800.0);
        state.objects.push(FallingObject {
            id: 1,
            pos: Vec2::new(50.0, 805.0),
        });
        state.objects.push(FallingObject {
            id: 2,
            pos: Vec2::new(90.0, 300.0),
        });
        state.fail();

        state.resume_after_failure();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.objects.len(), 1);
        assert_eq!(state.objects[0].id, 2);
    }
}
