//! User preferences
//!
//! Persisted in LocalStorage on wasm; defaults elsewhere. Game state itself
//! is never persisted.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Mute all audio
    pub muted: bool,
    /// Pause music when the window loses focus
    pub mute_on_blur: bool,
    /// Show the FPS counter in the HUD
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            music_volume: 0.7,
            muted: false,
            mute_on_blur: true,
            show_fps: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "trashfall_settings";

    /// Volume the music track should actually play at
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.music_volume).clamp(0.0, 1.0)
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_volume() {
        let mut settings = Settings::default();
        settings.master_volume = 0.5;
        settings.music_volume = 0.5;
        assert!((settings.effective_music_volume() - 0.25).abs() < 1e-6);

        settings.muted = true;
        assert_eq!(settings.effective_music_volume(), 0.0);
    }
}
