//! Key identifiers delivered by the host

use beatswirl_core::SlotKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A key the host can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Key {
    /// A key from the preset slot alphabet
    Slot(SlotKey),
    /// Any other letter (lowercase)
    Char(char),
    /// Number row digit
    Digit(u8),
    /// `=` (the unshifted `+` key)
    Equals,
    Space,
    F3,
    Escape,
}

impl Key {
    /// Parse a host key name such as `q`, `Z`, `0`, `=`, `space`, `f3`.
    /// Returns `None` for keys BeatSwirl has no use for.
    pub fn parse(name: &str) -> Option<Key> {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "space" | " " => return Some(Key::Space),
            "=" | "+" | "equals" | "plus" => return Some(Key::Equals),
            "f3" => return Some(Key::F3),
            "escape" | "esc" => return Some(Key::Escape),
            _ => {}
        }

        let mut chars = lower.chars();
        let c = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return None,
        };

        if let Some(d) = c.to_digit(10) {
            Some(Key::Digit(d as u8))
        } else if let Ok(slot) = SlotKey::try_from(c) {
            Some(Key::Slot(slot))
        } else if c.is_ascii_alphabetic() {
            Some(Key::Char(c))
        } else {
            None
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Slot(slot) => write!(f, "{}", slot),
            Key::Char(c) => write!(f, "{}", c),
            Key::Digit(d) => write!(f, "{}", d),
            Key::Equals => write!(f, "="),
            Key::Space => write!(f, "space"),
            Key::F3 => write!(f, "f3"),
            Key::Escape => write!(f, "escape"),
        }
    }
}

/// Keys currently held down
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldKeys {
    keys: BTreeSet<Key>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as down
    pub fn press(&mut self, key: Key) {
        self.keys.insert(key);
    }

    /// Mark a key as up
    pub fn release(&mut self, key: Key) {
        self.keys.remove(&key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    /// Held preset slots, in keyboard order
    pub fn held_slots(&self) -> Vec<SlotKey> {
        self.keys
            .iter()
            .filter_map(|key| match key {
                Key::Slot(slot) => Some(*slot),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<Key> for HeldKeys {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}
