//! Audio preferences
//!
//! Persisted in LocalStorage under their own key so a corrupt leaderboard
//! never resets the player's volume.

use serde::{Deserialize, Serialize};

/// Player audio preferences
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master output silenced
    pub muted: bool,
    /// Background music volume (0.0 - 1.0)
    pub bgm_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            muted: false,
            bgm_volume: 0.3,
            sfx_volume: 0.5,
        }
    }
}

/// Clamp a volume to [0, 1]; NaN counts as silence
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

impl Settings {
    /// Same settings with both volumes clamped to [0, 1]
    pub fn sanitized(self) -> Self {
        Self {
            bgm_volume: clamp_volume(self.bgm_volume),
            sfx_volume: clamp_volume(self.sfx_volume),
            ..self
        }
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "fish_frenzy_settings";

    /// Parse stored settings, falling back to defaults on bad data
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) => settings.sanitized(),
            Err(e) => {
                log::warn!("Ignoring stored settings: {e}");
                Self::default()
            }
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
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json(&json);
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
                log::debug!("Settings saved");
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
