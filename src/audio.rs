//! Music track lifecycle
//!
//! One background track plays per run and its natural end completes the run.
//! `MusicDirector` is the platform-free state machine; the wasm shell feeds
//! it lifecycle events and executes the commands it returns against an
//! `HtmlAudioElement` (see [`web`]).

/// Playback state of the run's single track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicState {
    /// Track requested, not yet playable
    Loading,
    Playing,
    /// Position preserved; resumable
    Paused,
    /// Track reached its natural end
    Finished,
    /// Load failed; the run continues silently
    Unavailable,
}

/// Command for the platform audio backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicCommand {
    /// Start or resume playback from the current position
    Play,
    /// Pause, keeping the current position
    Pause,
    /// Drop the underlying audio resource
    Release,
}

/// Decides what the track should do as the session changes state.
///
/// A pause demanded by the failure prompt outranks focus changes: regaining
/// focus while the prompt is up must not restart the music.
#[derive(Debug, Clone)]
pub struct MusicDirector {
    state: MusicState,
    held_by_prompt: bool,
}

impl Default for MusicDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl MusicDirector {
    pub fn new() -> Self {
        Self {
            state: MusicState::Loading,
            held_by_prompt: false,
        }
    }

    pub fn state(&self) -> MusicState {
        self.state
    }

    /// Track became playable: auto-play
    pub fn on_loaded(&mut self) -> Option<MusicCommand> {
        if self.state == MusicState::Loading {
            self.state = MusicState::Playing;
            Some(MusicCommand::Play)
        } else {
            None
        }
    }

    /// Track failed to load: log upstream, run silently from here on
    pub fn on_load_error(&mut self) {
        self.state = MusicState::Unavailable;
    }

    /// Failure prompt opened: hold playback until the player chooses
    pub fn on_failure(&mut self) -> Option<MusicCommand> {
        match self.state {
            MusicState::Playing | MusicState::Paused => {
                self.state = MusicState::Paused;
                self.held_by_prompt = true;
                Some(MusicCommand::Pause)
            }
            _ => None,
        }
    }

    /// Player chose to continue: pick up from the current position
    pub fn on_resume_choice(&mut self) -> Option<MusicCommand> {
        if self.state == MusicState::Paused && self.held_by_prompt {
            self.held_by_prompt = false;
            self.state = MusicState::Playing;
            Some(MusicCommand::Play)
        } else {
            None
        }
    }

    /// Window/tab lost focus
    pub fn on_blur(&mut self) -> Option<MusicCommand> {
        if self.state == MusicState::Playing {
            self.state = MusicState::Paused;
            Some(MusicCommand::Pause)
        } else {
            None
        }
    }

    /// Window/tab regained focus; no-op while the failure prompt holds
    pub fn on_focus(&mut self) -> Option<MusicCommand> {
        if self.state == MusicState::Paused && !self.held_by_prompt {
            self.state = MusicState::Playing;
            Some(MusicCommand::Play)
        } else {
            None
        }
    }

    /// Natural end of the track. Returns true exactly once per run; the
    /// caller uses it to complete the run and show the one-button prompt.
    pub fn on_track_ended(&mut self) -> bool {
        if self.state == MusicState::Playing {
            self.state = MusicState::Finished;
            true
        } else {
            false
        }
    }

    /// Session teardown: the resource is released unconditionally
    pub fn release(&mut self) -> MusicCommand {
        self.held_by_prompt = false;
        MusicCommand::Release
    }
}

/// `HtmlAudioElement` backend for [`MusicDirector`] commands
#[cfg(target_arch = "wasm32")]
pub mod web {
    use super::MusicCommand;
    use web_sys::HtmlAudioElement;

    pub struct WebMusicPlayer {
        element: Option<HtmlAudioElement>,
    }

    impl WebMusicPlayer {
        /// Create the element and start loading `src`. A creation failure is
        /// logged and leaves a silent player rather than crashing the run.
        pub fn new(src: &str, volume: f32) -> Self {
            let element = match HtmlAudioElement::new_with_src(src) {
                Ok(el) => {
                    el.set_volume(volume.clamp(0.0, 1.0) as f64);
                    Some(el)
                }
                Err(err) => {
                    log::warn!("Failed to create audio element, running silently: {err:?}");
                    None
                }
            };
            Self { element }
        }

        /// The underlying element, for wiring `canplaythrough`/`ended`/`error`
        /// listeners in the shell
        pub fn element(&self) -> Option<&HtmlAudioElement> {
            self.element.as_ref()
        }

        pub fn set_volume(&self, volume: f32) {
            if let Some(el) = &self.element {
                el.set_volume(volume.clamp(0.0, 1.0) as f64);
            }
        }

        /// Execute a director command
        pub fn apply(&mut self, cmd: MusicCommand) {
            let Some(el) = &self.element else { return };
            match cmd {
                MusicCommand::Play => {
                    if let Err(err) = el.play() {
                        log::warn!("Audio play() rejected: {err:?}");
                    }
                }
                MusicCommand::Pause => {
                    if let Err(err) = el.pause() {
                        log::warn!("Audio pause() rejected: {err:?}");
                    }
                }
                MusicCommand::Release => {
                    let _ = el.pause();
                    // Detach the source so the browser can drop the buffer
                    el.set_src("");
                    self.element = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_then_autoplay() {
        let mut music = MusicDirector::new();
        assert_eq!(music.state(), MusicState::Loading);
        assert_eq!(music.on_loaded(), Some(MusicCommand::Play));
        assert_eq!(music.state(), MusicState::Playing);
        // Duplicate load notifications are ignored
        assert_eq!(music.on_loaded(), None);
    }

    #[test]
    fn test_blur_focus_round_trip() {
        let mut music = MusicDirector::new();
        music.on_loaded();

        assert_eq!(music.on_blur(), Some(MusicCommand::Pause));
        assert_eq!(music.state(), MusicState::Paused);
        assert_eq!(music.on_focus(), Some(MusicCommand::Play));
        assert_eq!(music.state(), MusicState::Playing);
    }

    #[test]
    fn test_failure_hold_outranks_focus() {
        let mut music = MusicDirector::new();
        music.on_loaded();

        assert_eq!(music.on_failure(), Some(MusicCommand::Pause));
        // Tab switch while the prompt is up: focus must not restart playback
        assert_eq!(music.on_blur(), None);
        assert_eq!(music.on_focus(), None);
        assert_eq!(music.state(), MusicState::Paused);

        assert_eq!(music.on_resume_choice(), Some(MusicCommand::Play));
        assert_eq!(music.state(), MusicState::Playing);
    }

    #[test]
    fn test_resume_choice_without_prompt_is_ignored() {
        let mut music = MusicDirector::new();
        music.on_loaded();
        music.on_blur();
        // Paused by blur, not by a prompt
        assert_eq!(music.on_resume_choice(), None);
        assert_eq!(music.state(), MusicState::Paused);
    }

    #[test]
    fn test_track_end_reported_once() {
        let mut music = MusicDirector::new();
        music.on_loaded();

        assert!(music.on_track_ended());
        assert_eq!(music.state(), MusicState::Finished);
        assert!(!music.on_track_ended());
        // Nothing revives a finished track
        assert_eq!(music.on_focus(), None);
        assert_eq!(music.on_resume_choice(), None);
    }

    #[test]
    fn test_load_error_goes_silent() {
        let mut music = MusicDirector::new();
        music.on_load_error();
        assert_eq!(music.state(), MusicState::Unavailable);
        assert_eq!(music.on_loaded(), None);
        assert_eq!(music.on_failure(), None);
        assert!(!music.on_track_ended());
    }
}
