// src/config.rs

//! Defines the configuration structures for `gridhost`.
//!
//! The configuration is read from a JSON file: `$GRIDHOST_CONFIG` if set,
//! otherwise `gridhost.json` in the working directory if it exists. Every
//! section and field has a default, so a partial file (or no file) is fine.

use crate::color::PackedColor;
use crate::display::DriverKind;
use crate::tint::TintMode;
use anyhow::{Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "GRIDHOST_CONFIG";
/// File looked for in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "gridhost.json";
/// Frames run by a headless session without an explicit `max_frames`.
pub const HEADLESS_DEFAULT_FRAMES: u64 = 120;

/// Process-wide configuration, loaded on first access.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::load_or_default);

// --- Top-Level Configuration Structure ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Glyph atlas and how glyphs are tinted.
    pub font: FontConfig,
    /// Window and scaling settings.
    pub display: DisplayConfig,
    /// Seed, frame pacing and shutdown.
    pub runtime: RuntimeConfig,
}

// --- Font Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FontConfig {
    /// PNG holding every glyph in a fixed-column grid. Not shipped with the
    /// crate; the default `font.png` is resolved against the working directory.
    pub atlas_path: PathBuf,
    pub glyph_width: u32,
    pub glyph_height: u32,
    /// Glyph index treated as blank and never drawn.
    pub whitespace_glyph: u32,
    pub tint_mode: TintMode,
}

impl Default for FontConfig {
    fn default() -> Self {
        FontConfig {
            atlas_path: PathBuf::from("font.png"),
            glyph_width: 6,
            glyph_height: 6,
            whitespace_glyph: 32,
            tint_mode: TintMode::Mask,
        }
    }
}

// --- Display Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Upper bound on the surface-to-viewport scale.
    pub max_scale: f64,
    pub window_width: u32,
    pub window_height: u32,
    pub title: String,
    /// Shown around the scaled surface and through transparent pixels.
    pub clear_color: PackedColor,
    pub driver: DriverKind,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            max_scale: 8.0,
            window_width: 960,
            window_height: 720,
            title: "gridhost".to_string(),
            clear_color: PackedColor::BLACK,
            driver: DriverKind::Headless,
        }
    }
}

// --- Runtime Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Seed handed to the module's `onInit`. Defaults to the wall clock.
    pub seed: Option<u32>,
    pub target_fps: u32,
    /// Stop after this many frames. Headless sessions default to
    /// `HEADLESS_DEFAULT_FRAMES`; windowed sessions run until closed.
    pub max_frames: Option<u64>,
    /// Where to write the final surface as PNG on shutdown.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            seed: None,
            target_fps: 60,
            max_frames: None,
            snapshot_path: None,
        }
    }
}

impl RuntimeConfig {
    /// The configured seed, or the current Unix time in milliseconds
    /// truncated to 32 bits.
    pub fn resolve_seed(&self) -> u32 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_millis() as u32)
                .unwrap_or(0)
        })
    }

    pub fn frame_limit(&self, driver: DriverKind) -> Option<u64> {
        match (self.max_frames, driver) {
            (Some(limit), _) => Some(limit),
            (None, DriverKind::Headless) => Some(HEADLESS_DEFAULT_FRAMES),
            (None, _) => None,
        }
    }
}

impl Config {
    /// Parses a configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config '{}'", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config '{}'", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Locates and loads the configuration, falling back to defaults when
    /// there is no file or it cannot be parsed.
    pub fn load_or_default() -> Self {
        let path = match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => PathBuf::from(path),
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !local.exists() {
                    info!("Config: no {} found. Using defaults.", DEFAULT_CONFIG_FILE);
                    return Config::default();
                }
                local
            }
        };
        match Self::from_path(&path) {
            Ok(config) => {
                info!("Config: loaded '{}'", path.display());
                config
            }
            Err(e) => {
                warn!("Config: {:#}. Using defaults.", e);
                Config::default()
            }
        }
    }
}
