//! Game settings and preferences
//!
//! Persisted in LocalStorage on the web; defaults everywhere else.

use serde::{Deserialize, Serialize};

/// Which keys move the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum KeyLayout {
    /// Arrow keys and WASD
    #[default]
    Both,
    Arrows,
    Wasd,
}

impl KeyLayout {
    /// Label shown on the layout toggle
    pub fn label(&self) -> &'static str {
        match self {
            KeyLayout::Both => "Arrows + WASD",
            KeyLayout::Arrows => "Arrows",
            KeyLayout::Wasd => "WASD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "both" | "all" => Some(KeyLayout::Both),
            "arrows" | "arrow" => Some(KeyLayout::Arrows),
            "wasd" => Some(KeyLayout::Wasd),
            _ => None,
        }
    }

    /// Next layout in toggle order
    pub fn next(&self) -> Self {
        match self {
            KeyLayout::Both => KeyLayout::Arrows,
            KeyLayout::Arrows => KeyLayout::Wasd,
            KeyLayout::Wasd => KeyLayout::Both,
        }
    }

    pub fn arrows(&self) -> bool {
        matches!(self, KeyLayout::Both | KeyLayout::Arrows)
    }

    pub fn wasd(&self) -> bool {
        matches!(self, KeyLayout::Both | KeyLayout::Wasd)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Movement keys
    #[serde(default)]
    pub key_layout: KeyLayout,
    /// Fixed run seed (same exits every session); random when unset
    #[serde(default)]
    pub fixed_seed: Option<u64>,
    /// Log at debug level instead of info
    #[serde(default)]
    pub verbose_logging: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            key_layout: KeyLayout::Both,
            fixed_seed: None,
            verbose_logging: false,
        }
    }
}

impl Settings {
    /// Pick the run seed: the fixed one if configured, else `fallback`
    pub fn seed_or(&self, fallback: u64) -> u64 {
        self.fixed_seed.unwrap_or(fallback)
    }

    /// Log level implied by these settings
    pub fn log_level(&self) -> log::Level {
        if self.verbose_logging {
            log::Level::Debug
        } else {
            log::Level::Info
        }
    }

    /// Parse settings JSON, falling back to defaults on bad input
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring unreadable settings: {}", e);
                Self::default()
            }
        }
    }

    /// Switch movement keys and persist the choice
    pub fn set_key_layout(&mut self, layout: KeyLayout) {
        self.key_layout = layout;
        log::info!("Key layout: {}", layout.label());
        self.save();
    }

    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "escape_the_program_settings";

    #[cfg(target_arch = "wasm32")]
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        match Self::storage().and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten()) {
            Some(json) => Self::from_json(&json),
            None => {
                log::info!("No stored settings, using defaults");
                Self::default()
            }
        }
    }

    /// Write settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let Some(storage) = Self::storage() else {
            log::warn!("LocalStorage unavailable, settings not saved");
            return;
        };
        match serde_json::to_string(self) {
            Ok(json) => {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("Failed to write settings");
                }
            }
            Err(e) => log::warn!("Settings serialization failed: {}", e),
        }
    }

    /// Native builds keep settings for the session only
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}
}
