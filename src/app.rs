//! Application state machine
//!
//! Owns the two screens and the per-run session. Dialog flow is explicit
//! state transitions rather than callback-driven navigation: the shell asks
//! the app what happened and reacts (show/hide overlays, drive the audio
//! backend), never the other way around.

use crate::audio::{MusicCommand, MusicDirector};
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Game,
}

/// Player response to the failure prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureChoice {
    /// Keep playing; music picks up from its current position
    Resume,
    /// Back to the Home screen
    Exit,
}

/// Everything owned by one run of the game, created on entering the Game
/// screen and dropped on leaving it
#[derive(Debug)]
pub struct Session {
    pub state: GameState,
    pub music: MusicDirector,
}

/// Top-level application state
#[derive(Debug)]
pub struct App {
    pub screen: Screen,
    pub settings: Settings,
    session: Option<Session>,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self {
            screen: Screen::Home,
            settings,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Home → Game: create a fresh run
    pub fn start_game(&mut self, seed: u64, field_width: f32, field_height: f32) {
        log::info!("Starting run with seed {seed} on {field_width}x{field_height}");
        self.session = Some(Session {
            state: GameState::new(seed, field_width, field_height),
            music: MusicDirector::new(),
        });
        self.screen = Screen::Game;
    }

    /// Game → Home: drop the run and release the audio resource
    pub fn exit_to_home(&mut self) -> Option<MusicCommand> {
        let cmd = self.session.take().map(|mut s| {
            log::info!("Run over, final score {}", s.state.score);
            s.music.release()
        });
        self.screen = Screen::Home;
        cmd
    }

    /// Advance the simulation by one fixed tick. A failure event pauses the
    /// music along with the sim; the shell shows the prompt.
    pub fn tick(&mut self, input: &TickInput) -> (Vec<GameEvent>, Option<MusicCommand>) {
        let Some(session) = self.session.as_mut() else {
            return (Vec::new(), None);
        };

        let events = tick(&mut session.state, input);
        let cmd = if events.contains(&GameEvent::Failed) {
            session.music.on_failure()
        } else {
            None
        };
        (events, cmd)
    }

    /// The track became playable
    pub fn music_loaded(&mut self) -> Option<MusicCommand> {
        self.session.as_mut().and_then(|s| s.music.on_loaded())
    }

    /// The track failed to load; the run continues without music
    pub fn music_load_failed(&mut self) {
        log::warn!("Music failed to load, continuing without audio");
        if let Some(session) = self.session.as_mut() {
            session.music.on_load_error();
        }
    }

    /// Natural end of the track completes the run. Returns true exactly once
    /// per run; the shell shows the completion prompt on true.
    pub fn track_ended(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.music.on_track_ended() {
            session.state.finish();
            log::info!("Track finished, run complete at score {}", session.state.score);
            true
        } else {
            false
        }
    }

    /// Resolve the failure prompt
    pub fn failure_choice(&mut self, choice: FailureChoice) -> Option<MusicCommand> {
        let prompted = self
            .session
            .as_ref()
            .is_some_and(|s| s.state.phase == GamePhase::FailurePrompt);
        if !prompted {
            return None;
        }
        match choice {
            FailureChoice::Resume => {
                let session = self.session.as_mut()?;
                session.state.resume_after_failure();
                session.music.on_resume_choice()
            }
            FailureChoice::Exit => self.exit_to_home(),
        }
    }

    /// Acknowledge the completion prompt
    pub fn completion_ack(&mut self) -> Option<MusicCommand> {
        let finished = self
            .session
            .as_ref()
            .is_some_and(|s| s.state.phase == GamePhase::Finished);
        if finished { self.exit_to_home() } else { None }
    }

    /// Window/tab lost focus: freeze the sim, pause the music
    pub fn blur(&mut self) -> Option<MusicCommand> {
        let Some(session) = self.session.as_mut() else {
            return None;
        };
        session.state.pause();
        if self.settings.mute_on_blur {
            let cmd = session.music.on_blur();
            if cmd.is_some() {
                log::info!("Auto-paused (focus lost)");
            }
            cmd
        } else {
            None
        }
    }

    /// Window/tab regained focus: resume unless a prompt is holding the run
    pub fn focus(&mut self) -> Option<MusicCommand> {
        let Some(session) = self.session.as_mut() else {
            return None;
        };
        session.state.unpause();
        session.music.on_focus()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MusicState;
    use crate::consts::*;
    use crate::sim::FallingObject;
    use glam::Vec2;

    fn app_in_game() -> App {
        let mut app = App::new(Settings::default());
        app.start_game(4242, DEFAULT_FIELD_WIDTH, DEFAULT_FIELD_HEIGHT);
        app.music_loaded();
        app
    }

    fn force_failure(app: &mut App) -> u32 {
        let session = app.session.as_mut().unwrap();
        // Park the catcher far away and drop an object at the bottom edge
        session.state.catcher.pos = Vec2::new(-1000.0, 700.0);
        session.state.spawn_countdown = u32::MAX;
        session.state.objects.push(FallingObject {
            id: 900,
            pos: Vec2::new(10.0, 799.0),
        });
        let score = session.state.score;
        let (events, cmd) = app.tick(&TickInput::default());
        assert!(events.contains(&GameEvent::Failed));
        assert_eq!(cmd, Some(MusicCommand::Pause));
        score
    }

    #[test]
    fn test_start_game_enters_game_screen() {
        let app = app_in_game();
        assert_eq!(app.screen, Screen::Game);
        let session = app.session().unwrap();
        assert_eq!(session.state.score, 0);
        assert_eq!(session.music.state(), MusicState::Playing);
    }

    #[test]
    fn test_failure_exit_returns_home_with_score_intact() {
        let mut app = app_in_game();
        let score_before = force_failure(&mut app);

        let cmd = app.failure_choice(FailureChoice::Exit);
        assert_eq!(cmd, Some(MusicCommand::Release));
        assert_eq!(app.screen, Screen::Home);
        assert!(app.session().is_none());
        // Exit never touched the score before the session was dropped
        assert_eq!(score_before, 0);
    }

    #[test]
    fn test_failure_resume_continues_with_same_score_and_objects() {
        let mut app = app_in_game();
        {
            let session = app.session.as_mut().unwrap();
            session.state.score = 5;
            session.state.objects.push(FallingObject {
                id: 1,
                pos: Vec2::new(200.0, 100.0),
            });
        }
        force_failure(&mut app);

        let cmd = app.failure_choice(FailureChoice::Resume);
        assert_eq!(cmd, Some(MusicCommand::Play));

        let session = app.session().unwrap();
        assert_eq!(session.state.phase, GamePhase::Playing);
        assert_eq!(session.state.score, 5);
        // The in-field object survived; the fallen one did not
        assert_eq!(session.state.objects.len(), 1);
        assert_eq!(session.state.objects[0].id, 1);
    }

    #[test]
    fn test_failure_choice_requires_prompt() {
        let mut app = app_in_game();
        assert_eq!(app.failure_choice(FailureChoice::Exit), None);
        assert_eq!(app.screen, Screen::Game);
    }

    #[test]
    fn test_completion_prompt_exactly_once() {
        let mut app = app_in_game();
        {
            // Leave objects falling to show completion ignores them
            let session = app.session.as_mut().unwrap();
            session.state.objects.push(FallingObject {
                id: 1,
                pos: Vec2::new(200.0, 100.0),
            });
            session.state.score = 3;
        }

        assert!(app.track_ended());
        assert!(!app.track_ended(), "second ended event must be ignored");

        let session = app.session().unwrap();
        assert_eq!(session.state.phase, GamePhase::Finished);
        assert_eq!(session.state.score, 3);

        // Sim is frozen behind the prompt
        let (events, _) = app.tick(&TickInput::default());
        assert!(events.is_empty());

        let cmd = app.completion_ack();
        assert_eq!(cmd, Some(MusicCommand::Release));
        assert_eq!(app.screen, Screen::Home);
    }

    #[test]
    fn test_blur_focus_freezes_and_resumes() {
        let mut app = app_in_game();

        assert_eq!(app.blur(), Some(MusicCommand::Pause));
        let (events, _) = app.tick(&TickInput::default());
        assert!(events.is_empty());
        assert_eq!(
            app.session().unwrap().state.phase,
            GamePhase::Paused
        );

        assert_eq!(app.focus(), Some(MusicCommand::Play));
        assert_eq!(
            app.session().unwrap().state.phase,
            GamePhase::Playing
        );
    }

    #[test]
    fn test_focus_does_not_dismiss_failure_prompt() {
        let mut app = app_in_game();
        force_failure(&mut app);

        app.blur();
        assert_eq!(app.focus(), None);
        let session = app.session().unwrap();
        assert_eq!(session.state.phase, GamePhase::FailurePrompt);
        assert_eq!(session.music.state(), MusicState::Paused);
    }

    #[test]
    fn test_tick_on_home_screen_is_noop() {
        let mut app = App::new(Settings::default());
        let (events, cmd) = app.tick(&TickInput::default());
        assert!(events.is_empty());
        assert_eq!(cmd, None);
    }
}
