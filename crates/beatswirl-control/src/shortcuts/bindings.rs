//! Keyboard shortcut bindings

use super::{HeldKeys, Key};
use crate::error::Result;
use beatswirl_core::SlotKey;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Something a key can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    DoubleRotationSpeed,
    HalveRotationSpeed,
    DoubleBeatMultiplier,
    HalveBeatMultiplier,
    GrowPalette,
    ShrinkPalette,
    /// Load a compiled-in preset by index
    LoadBuiltinPreset(usize),
    /// Load the user preset bound to a slot, if any
    LoadUserPreset(SlotKey),
    /// Store the current parameters into every held slot and persist
    SaveToHeldSlots,
    ShowStatus,
    /// Freezes rotation while the key is held
    SuspendRotation,
}

/// One key to action mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub key: Key,
    pub action: Action,
}

/// Key binding table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBindings {
    bindings: Vec<Binding>,
}

impl KeyBindings {
    /// Default layout
    pub fn new() -> Self {
        let defaults = [
            (Key::Char('z'), Action::DoubleRotationSpeed),
            (Key::Char('c'), Action::HalveRotationSpeed),
            (Key::Char('x'), Action::GrowPalette),
            (Key::Char('v'), Action::ShrinkPalette),
            (Key::Char('b'), Action::DoubleBeatMultiplier),
            (Key::Char('n'), Action::HalveBeatMultiplier),
            // 0 restores the defaults, which are the last built-in preset
            (Key::Digit(0), Action::LoadBuiltinPreset(2)),
            (Key::Digit(1), Action::LoadBuiltinPreset(0)),
            (Key::Digit(2), Action::LoadBuiltinPreset(1)),
            (Key::Equals, Action::SaveToHeldSlots),
            (Key::F3, Action::ShowStatus),
            (Key::Space, Action::SuspendRotation),
        ];
        let slots = SlotKey::ALL
            .into_iter()
            .map(|slot| (Key::Slot(slot), Action::LoadUserPreset(slot)));

        let bindings = defaults
            .into_iter()
            .chain(slots)
            .map(|(key, action)| Binding { key, action })
            .collect();
        Self { bindings }
    }

    /// No bindings at all
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Action bound to `key`
    pub fn find_action(&self, key: Key) -> Option<Action> {
        self.bindings
            .iter()
            .find(|b| b.key == key)
            .map(|b| b.action)
    }

    /// Bind `key`, replacing any previous binding for it
    pub fn bind(&mut self, key: Key, action: Action) {
        self.unbind(key);
        self.bindings.push(Binding { key, action });
    }

    /// Remove the binding for `key`
    pub fn unbind(&mut self, key: Key) -> Option<Action> {
        let pos = self.bindings.iter().position(|b| b.key == key)?;
        Some(self.bindings.remove(pos).action)
    }

    /// Keys bound to `action`
    pub fn keys_for(&self, action: Action) -> Vec<Key> {
        self.bindings
            .iter()
            .filter(|b| b.action == action)
            .map(|b| b.key)
            .collect()
    }

    /// True if any key bound to `action` is held
    pub fn is_action_held(&self, action: Action, held: &HeldKeys) -> bool {
        self.bindings
            .iter()
            .any(|b| b.action == action && held.is_held(b.key))
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Export to JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Import from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let bindings = Self::from_json(&json)?;
        info!("Loaded {} key bindings", bindings.bindings.len());
        Ok(bindings)
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let bindings = KeyBindings::new();
        assert_eq!(
            bindings.find_action(Key::Char('z')),
            Some(Action::DoubleRotationSpeed)
        );
        assert_eq!(
            bindings.find_action(Key::Digit(0)),
            Some(Action::LoadBuiltinPreset(2))
        );
        assert_eq!(
            bindings.find_action(Key::Slot(SlotKey::K)),
            Some(Action::LoadUserPreset(SlotKey::K))
        );
        assert_eq!(bindings.find_action(Key::Char('m')), None);
        assert_eq!(bindings.bindings().len(), 12 + SlotKey::ALL.len());
        assert_eq!(bindings.keys_for(Action::GrowPalette), vec![Key::Char('x')]);
    }

    #[test]
    fn test_rebind_replaces() {
        let mut bindings = KeyBindings::new();
        bindings.bind(Key::Char('z'), Action::ShowStatus);
        assert_eq!(bindings.find_action(Key::Char('z')), Some(Action::ShowStatus));
        assert!(bindings.keys_for(Action::DoubleRotationSpeed).is_empty());
    }

    #[test]
    fn test_is_action_held() {
        let bindings = KeyBindings::new();
        let mut held = HeldKeys::new();
        assert!(!bindings.is_action_held(Action::SuspendRotation, &held));
        held.press(Key::Space);
        assert!(bindings.is_action_held(Action::SuspendRotation, &held));
    }

    #[test]
    fn test_serialization() {
        let bindings = KeyBindings::new();
        let json = bindings.to_json().unwrap();
        let loaded = KeyBindings::from_json(&json).unwrap();
        assert_eq!(bindings, loaded);
    }
}
