//! Application configuration
//!
//! Read from a TOML file. Every field has a default, so a partial file or no
//! file at all is valid.

use anyhow::{Context, Result};
use beatswirl_control::KeyBindings;
use beatswirl_core::{LogConfig, Preset, PresetStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub animation: AnimationConfig,
    pub presets: PresetsConfig,
    pub input: InputConfig,
    pub logging: LogConfig,
}

/// Frame loop and initial tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Seconds between launch and the first beat
    pub start_delay_secs: f64,
    /// Frames per second of the host loop
    pub frame_rate: f64,
    /// Colors added or removed by the grow/shrink keys
    pub palette_step: usize,
    pub rotation_speed: f64,
    pub beat_multiplier: f64,
    pub palette_size: usize,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        let defaults = Preset::default();
        Self {
            start_delay_secs: 0.5,
            frame_rate: 60.0,
            palette_step: 6,
            rotation_speed: defaults.rotation_speed,
            beat_multiplier: defaults.beat_multiplier,
            palette_size: defaults.palette_size,
        }
    }
}

impl AnimationConfig {
    /// Tunables the session starts with
    pub fn initial_preset(&self) -> Preset {
        Preset::new(self.rotation_speed, self.beat_multiplier, self.palette_size)
    }

    pub fn start_delay(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.start_delay_secs)
            .with_context(|| format!("Invalid start_delay_secs: {}", self.start_delay_secs))
    }

    /// Time between frames
    pub fn frame_duration(&self) -> Result<Duration> {
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            anyhow::bail!("frame_rate must be > 0, got {}", self.frame_rate);
        }
        Ok(Duration::from_secs_f64(1.0 / self.frame_rate))
    }
}

/// Where user presets live
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetsConfig {
    /// Preset file; the user data directory is used when unset
    pub path: Option<PathBuf>,
    /// Save on a background thread instead of inside the frame loop
    pub background_save: bool,
}

impl PresetsConfig {
    pub fn resolve_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(PresetStore::default_path)
    }
}

/// Keyboard layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// JSON key binding table replacing the default layout
    pub bindings: Option<PathBuf>,
}

impl InputConfig {
    pub fn key_bindings(&self) -> Result<KeyBindings> {
        match &self.bindings {
            Some(path) => KeyBindings::load_from_file(path)
                .with_context(|| format!("Failed to load key bindings: {:?}", path)),
            None => Ok(KeyBindings::new()),
        }
    }
}

impl AppConfig {
    /// Load from `path`. A missing file gives the defaults; a malformed one
    /// is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse config: {:?}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.animation.initial_preset(), Preset::default());
    }

    #[test]
    fn test_partial_file() {
        let config = AppConfig::from_toml(
            r#"
            [animation]
            frame_rate = 30.0
            palette_size = 12

            [presets]
            path = "/tmp/presets.json"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.animation.frame_rate, 30.0);
        assert_eq!(config.animation.palette_size, 12);
        assert_eq!(config.animation.palette_step, 6);
        assert_eq!(
            config.presets.resolve_path(),
            Some(PathBuf::from("/tmp/presets.json"))
        );
        assert!(!config.presets.background_save);
        assert_eq!(config.input.bindings, None);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.console_output);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.toml");
        std::fs::write(&path, "[animation\nframe_rate = ").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_custom_key_bindings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keys.json");
        let mut bindings = KeyBindings::empty();
        bindings.bind(
            beatswirl_control::Key::Char('m'),
            beatswirl_control::Action::ShowStatus,
        );
        std::fs::write(&path, bindings.to_json().unwrap()).unwrap();

        let input = InputConfig {
            bindings: Some(path),
        };
        assert_eq!(input.key_bindings().unwrap(), bindings);
        assert_eq!(InputConfig::default().key_bindings().unwrap(), KeyBindings::new());
    }

    #[test]
    fn test_frame_duration() {
        let mut animation = AnimationConfig::default();
        let frame = animation.frame_duration().unwrap();
        assert!((frame.as_secs_f64() - 1.0 / 60.0).abs() < 1e-9);

        animation.frame_rate = 0.0;
        assert!(animation.frame_duration().is_err());
        animation.start_delay_secs = -1.0;
        assert!(animation.start_delay().is_err());
    }
}
