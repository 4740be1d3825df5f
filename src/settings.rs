//! Sandbox settings and preferences
//!
//! Persisted in LocalStorage on the web; defaults everywhere else.

use serde::{Deserialize, Serialize};

use crate::consts::{GRAB_DAMPING, GRAB_STIFFNESS};
use crate::sim::shape::Rgb;

/// How the create-gesture preview picks its key shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PreviewMode {
    /// Re-roll the shape every frame; the committed key is a fresh roll
    Shimmer,
    /// One seed per gesture; the committed key is the last previewed shape
    #[default]
    Stable,
}

impl PreviewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewMode::Shimmer => "Shimmer",
            PreviewMode::Stable => "Stable",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "shimmer" => Some(PreviewMode::Shimmer),
            "stable" => Some(PreviewMode::Stable),
            _ => None,
        }
    }
}

/// Sandbox settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Create-gesture preview behavior
    pub preview_mode: PreviewMode,
    /// Pixels/s² applied per unit of tilt gravity
    pub gravity_scale: f32,
    /// Background gray level, also used for the hollow in each key head
    pub background: u8,
    /// Grab spring stiffness (0-1, fraction of error corrected per step)
    pub grab_stiffness: f32,
    /// Grab spring damping (0-1)
    pub grab_damping: f32,
    /// Fixed RNG seed (None = seeded from the clock)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preview_mode: PreviewMode::default(),
            gravity_scale: 1000.0,
            background: 245,
            grab_stiffness: GRAB_STIFFNESS,
            grab_damping: GRAB_DAMPING,
            seed: None,
        }
    }
}

impl Settings {
    /// Background as a color
    pub fn background_rgb(&self) -> Rgb {
        Rgb::gray(self.background)
    }

    /// Clamp values loaded from storage into usable ranges
    pub fn sanitized(mut self) -> Self {
        self.grab_stiffness = self.grab_stiffness.clamp(0.001, 1.0);
        self.grab_damping = self.grab_damping.clamp(0.0, 1.0);
        if !self.gravity_scale.is_finite() || self.gravity_scale < 0.0 {
            self.gravity_scale = Self::default().gravity_scale;
        }
        self
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "key_drop_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str::<Settings>(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings.sanitized();
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

    /// Native: settings come from `KEY_DROP_SETTINGS` (JSON) when set
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        match std::env::var("KEY_DROP_SETTINGS") {
            Ok(json) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => settings.sanitized(),
                Err(e) => {
                    log::warn!("Ignoring KEY_DROP_SETTINGS: {}", e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
