//! Preset Store
//!
//! User presets are bound to a fixed set of keyboard slots and persisted as a
//! single JSON object keyed by slot letter. Loading never fails: a missing or
//! unreadable file yields an empty store. Saving always rewrites the whole file.

use crate::params::Preset;
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// File name used under the user data directory
pub const PRESET_FILE_NAME: &str = "json_presets.json";

/// Keys a user preset can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
#[allow(missing_docs)]
pub enum SlotKey {
    Q,
    W,
    E,
    R,
    T,
    Y,
    U,
    I,
    O,
    A,
    S,
    D,
    F,
    G,
    H,
    J,
    K,
    L,
}

impl SlotKey {
    /// Every slot, in keyboard order
    pub const ALL: [SlotKey; 18] = [
        SlotKey::Q,
        SlotKey::W,
        SlotKey::E,
        SlotKey::R,
        SlotKey::T,
        SlotKey::Y,
        SlotKey::U,
        SlotKey::I,
        SlotKey::O,
        SlotKey::A,
        SlotKey::S,
        SlotKey::D,
        SlotKey::F,
        SlotKey::G,
        SlotKey::H,
        SlotKey::J,
        SlotKey::K,
        SlotKey::L,
    ];

    /// Lowercase key character
    pub fn as_char(self) -> char {
        match self {
            SlotKey::Q => 'q',
            SlotKey::W => 'w',
            SlotKey::E => 'e',
            SlotKey::R => 'r',
            SlotKey::T => 't',
            SlotKey::Y => 'y',
            SlotKey::U => 'u',
            SlotKey::I => 'i',
            SlotKey::O => 'o',
            SlotKey::A => 'a',
            SlotKey::S => 's',
            SlotKey::D => 'd',
            SlotKey::F => 'f',
            SlotKey::G => 'g',
            SlotKey::H => 'h',
            SlotKey::J => 'j',
            SlotKey::K => 'k',
            SlotKey::L => 'l',
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl TryFrom<char> for SlotKey {
    type Error = CoreError;

    fn try_from(c: char) -> Result<Self> {
        let lower = c.to_ascii_lowercase();
        SlotKey::ALL
            .into_iter()
            .find(|slot| slot.as_char() == lower)
            .ok_or_else(|| CoreError::InvalidSlot(c.to_string()))
    }
}

impl FromStr for SlotKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => SlotKey::try_from(c),
            _ => Err(CoreError::InvalidSlot(s.to_string())),
        }
    }
}

impl From<SlotKey> for String {
    fn from(slot: SlotKey) -> Self {
        slot.as_char().to_string()
    }
}

impl TryFrom<String> for SlotKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// User presets keyed by slot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetStore {
    presets: BTreeMap<SlotKey, Preset>,
    path: Option<PathBuf>,
}

impl PresetStore {
    /// Empty store with no backing file
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the store from `path`.
    ///
    /// Missing or corrupt files give an empty store bound to `path`.
    /// Entries with unknown slots or invalid values are skipped.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let presets = match Self::read_entries(&path) {
            Ok(presets) => {
                info!("Loaded {} user presets from {:?}", presets.len(), path);
                presets
            }
            Err(CoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preset file at {:?}, starting empty", path);
                BTreeMap::new()
            }
            Err(e) => {
                warn!("Ignoring unreadable preset file {:?}: {}", path, e);
                BTreeMap::new()
            }
        };

        Self {
            presets,
            path: Some(path),
        }
    }

    fn read_entries(path: &Path) -> Result<BTreeMap<SlotKey, Preset>> {
        let content = std::fs::read_to_string(path)?;
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(&content)?;

        let mut presets = BTreeMap::new();
        for (key, value) in raw {
            let slot = match key.parse::<SlotKey>() {
                Ok(slot) => slot,
                Err(e) => {
                    warn!("Skipping preset entry: {}", e);
                    continue;
                }
            };
            match serde_json::from_value::<Preset>(value) {
                Ok(preset) if preset.validate().is_ok() => {
                    presets.insert(slot, preset);
                }
                Ok(preset) => warn!("Skipping invalid preset {}: {:?}", slot, preset),
                Err(e) => warn!("Skipping malformed preset {}: {}", slot, e),
            }
        }
        Ok(presets)
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Preset bound to `slot`
    pub fn get(&self, slot: SlotKey) -> Option<&Preset> {
        self.presets.get(&slot)
    }

    /// Bind a preset to `slot`, returning the previous one
    pub fn set(&mut self, slot: SlotKey, preset: Preset) -> Option<Preset> {
        self.presets.insert(slot, preset)
    }

    /// Unbind `slot`
    pub fn remove(&mut self, slot: SlotKey) -> Option<Preset> {
        self.presets.remove(&slot)
    }

    /// Bound slots in keyboard order
    pub fn slots(&self) -> impl Iterator<Item = (SlotKey, &Preset)> {
        self.presets.iter().map(|(slot, preset)| (*slot, preset))
    }

    /// Number of bound slots
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// No slot bound
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.presets)?)
    }

    /// Write the whole store to its backing file. A store without a
    /// backing file saves nothing.
    pub fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => self.save_to_path(path),
            None => Ok(()),
        }
    }

    /// Write the whole store to `path` via a temporary sibling file
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = self.to_json()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, path)?;
        info!("Saved {} user presets to {:?}", self.presets.len(), path);
        Ok(())
    }

    /// Default preset file in the user data directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("BeatSwirl").join(PRESET_FILE_NAME))
    }
}
