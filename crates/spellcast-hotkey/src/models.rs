//! Core data models for key sequences and recognition events

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Platform-specific key identifier as delivered by the keyboard hook
pub type NativeKeyCode = u16;

/// A normalized keyboard modifier.
///
/// The declaration order is the canonical order used when rendering a key,
/// so `shift+ctrl+a` and `ctrl+shift+a` both render as `ctrl+shift+a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Super,
}

impl Modifier {
    pub const ALL: [Modifier; 4] = [Modifier::Ctrl, Modifier::Alt, Modifier::Shift, Modifier::Super];

    /// Canonical lower-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Ctrl => "ctrl",
            Modifier::Alt => "alt",
            Modifier::Shift => "shift",
            Modifier::Super => "super",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One key combination: zero or more modifiers plus a named key.
///
/// Equality and hashing only consider `modifiers` and `name`; `code` is an
/// opaque platform value and two codes may describe the same combination.
#[derive(Debug, Clone, Serialize)]
pub struct Key {
    pub code: NativeKeyCode,
    pub modifiers: BTreeSet<Modifier>,
    pub name: String,
}

impl Key {
    /// Create a key; the name is lower-cased
    pub fn new(
        code: NativeKeyCode,
        modifiers: impl IntoIterator<Item = Modifier>,
        name: impl Into<String>,
    ) -> Self {
        Key {
            code,
            modifiers: modifiers.into_iter().collect(),
            name: name.into().to_lowercase(),
        }
    }

    /// Whether two keys describe the same combination
    pub fn same_combo(&self, other: &Key) -> bool {
        self.name == other.name && self.modifiers == other.modifiers
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.same_combo(other)
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.modifiers.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier)?;
        }
        f.write_str(&self.name)
    }
}

/// An ordered list of key combinations pressed one after another
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeySequence {
    keys: Vec<Key>,
}

impl KeySequence {
    pub fn new(keys: Vec<Key>) -> Self {
        KeySequence { keys }
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Canonical string form, e.g. `ctrl+alt+g,s`
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Step-wise strict prefix test: `g` is a prefix of `g,s`, but `f1` is not
    /// a prefix of `f12`.
    pub fn is_strict_prefix_of(&self, other: &KeySequence) -> bool {
        self.keys.len() < other.keys.len()
            && self
                .keys
                .iter()
                .zip(other.keys.iter())
                .all(|(a, b)| a.same_combo(b))
    }

    pub fn into_keys(self) -> Vec<Key> {
        self.keys
    }
}

impl From<Vec<Key>> for KeySequence {
    fn from(keys: Vec<Key>) -> Self {
        KeySequence::new(keys)
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}

impl Serialize for KeySequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical())
    }
}

/// A successful recognition, handed to the spell handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpellEvent {
    pub sequence: KeySequence,
    pub spell: String,
    pub timestamp: DateTime<Utc>,
}

impl SpellEvent {
    pub fn new(sequence: KeySequence, spell: impl Into<String>) -> Self {
        SpellEvent {
            sequence,
            spell: spell.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Direction of a raw key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Down,
    Up,
}

/// A raw event from the keyboard hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub code: NativeKeyCode,
    /// Modifiers held while the key went down
    pub modifiers: BTreeSet<Modifier>,
    pub kind: KeyEventKind,
}

impl RawKeyEvent {
    pub fn down(code: NativeKeyCode, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        RawKeyEvent {
            code,
            modifiers: modifiers.into_iter().collect(),
            kind: KeyEventKind::Down,
        }
    }

    pub fn up(code: NativeKeyCode) -> Self {
        RawKeyEvent {
            code,
            modifiers: BTreeSet::new(),
            kind: KeyEventKind::Up,
        }
    }

    pub fn is_key_down(&self) -> bool {
        self.kind == KeyEventKind::Down
    }
}

impl From<&Key> for RawKeyEvent {
    fn from(key: &Key) -> Self {
        RawKeyEvent::down(key.code, key.modifiers.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(mods: &[Modifier], name: &str) -> Key {
        Key::new(0, mods.iter().copied(), name)
    }

    #[test]
    fn test_key_display_orders_modifiers() {
        let k = key(&[Modifier::Shift, Modifier::Ctrl], "a");
        assert_eq!(k.to_string(), "ctrl+shift+a");
    }

    #[test]
    fn test_key_identity_ignores_code() {
        let a = Key::new(0x41, [Modifier::Ctrl], "a");
        let b = Key::new(30, [Modifier::Ctrl], "A");
        assert_eq!(a, b);
    }

    #[test]
    fn test_sequence_display() {
        let seq = KeySequence::new(vec![key(&[Modifier::Alt], "g"), key(&[], "s")]);
        assert_eq!(seq.to_string(), "alt+g,s");
    }

    #[test]
    fn test_strict_prefix_is_stepwise() {
        let f1 = KeySequence::new(vec![key(&[], "f1")]);
        let f12 = KeySequence::new(vec![key(&[], "f12")]);
        let f1_s = KeySequence::new(vec![key(&[], "f1"), key(&[], "s")]);

        assert!(!f1.is_strict_prefix_of(&f12));
        assert!(f1.is_strict_prefix_of(&f1_s));
        assert!(!f1_s.is_strict_prefix_of(&f1));
        assert!(!f1.is_strict_prefix_of(&f1));
    }

    #[test]
    fn test_raw_event_from_key() {
        let k = Key::new(0x47, [Modifier::Ctrl], "g");
        let raw = RawKeyEvent::from(&k);
        assert!(raw.is_key_down());
        assert_eq!(raw.code, 0x47);
        assert!(raw.modifiers.contains(&Modifier::Ctrl));
    }
}
