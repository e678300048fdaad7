//! Game settings and preferences
//!
//! Persisted in LocalStorage alongside the player name.

use serde::{Deserialize, Serialize};

use crate::persistence;

/// How the autopilot picks its stop offset each round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum PrecisionMode {
    /// Uniform in [-0.5, 0.5): the demo misses now and then
    #[default]
    Random,
    /// Same offset every round. A near-zero value almost never misses,
    /// which is handy for soak runs.
    Fixed(f32),
}

impl PrecisionMode {
    /// Soak-test configuration
    pub const SOAK: PrecisionMode = PrecisionMode::Fixed(0.0001);

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "random" => Some(PrecisionMode::Random),
            "soak" => Some(PrecisionMode::SOAK),
            other => other.parse::<f32>().ok().map(PrecisionMode::Fixed),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Background music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Gameplay ===
    pub autopilot_precision: PrecisionMode,
    /// Falling debris this far below the top layer is removed; `None` keeps it forever
    pub overhang_cull_depth: Option<f32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: 0.05,
            sfx_volume: 0.6,
            muted: false,

            autopilot_precision: PrecisionMode::Random,
            overhang_cull_depth: Some(20.0),
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "stack_tower_settings";

    /// Effective music volume (respects mute)
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.music_volume.clamp(0.0, 1.0)
        }
    }

    /// Effective effects volume (respects mute)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.sfx_volume.clamp(0.0, 1.0)
        }
    }

    /// Load settings, falling back to defaults
    pub fn load() -> Self {
        match persistence::load_json(Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        if persistence::save_json(Self::STORAGE_KEY, self) {
            log::info!("Settings saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_mode_from_str() {
        assert_eq!(PrecisionMode::from_str("Random"), Some(PrecisionMode::Random));
        assert_eq!(PrecisionMode::from_str("soak"), Some(PrecisionMode::SOAK));
        assert_eq!(PrecisionMode::from_str("0.25"), Some(PrecisionMode::Fixed(0.25)));
        assert_eq!(PrecisionMode::from_str("sometimes"), None);
    }

    #[test]
    fn test_mute_zeroes_volumes() {
        let settings = Settings {
            muted: true,
            ..Settings::default()
        };
        assert_eq!(settings.effective_music_volume(), 0.0);
        assert_eq!(settings.effective_sfx_volume(), 0.0);
        assert!(Settings::default().effective_music_volume() > 0.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"muted":true}"#).unwrap();
        assert!(settings.muted);
        assert_eq!(settings.autopilot_precision, PrecisionMode::Random);
        assert_eq!(settings.overhang_cull_depth, Some(20.0));
    }

    #[test]
    fn test_native_load_is_default() {
        let settings = Settings::load();
        assert_eq!(settings.overhang_cull_depth, Settings::default().overhang_cull_depth);
    }
}
