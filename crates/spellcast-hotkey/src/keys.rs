//! Platform-neutral key name table
//!
//! Names map to virtual-key style codes: letters and digits use their
//! upper-case ASCII value, `f1` is `0x70`, and so on. Platform resolvers add
//! their own special keys on top of this table.

use crate::models::{Modifier, NativeKeyCode};

/// Named keys accepted in every descriptor, besides single letters and digits
pub const NAMED_KEYS: &[(&str, NativeKeyCode)] = &[
    ("space", 0x20),
    ("enter", 0x0D),
    ("tab", 0x09),
    ("esc", 0x1B),
    ("backspace", 0x08),
    ("delete", 0x2E),
    ("insert", 0x2D),
    ("home", 0x24),
    ("end", 0x23),
    ("pageup", 0x21),
    ("pagedown", 0x22),
    ("up", 0x26),
    ("down", 0x28),
    ("left", 0x25),
    ("right", 0x27),
    ("f1", 0x70),
    ("f2", 0x71),
    ("f3", 0x72),
    ("f4", 0x73),
    ("f5", 0x74),
    ("f6", 0x75),
    ("f7", 0x76),
    ("f8", 0x77),
    ("f9", 0x78),
    ("f10", 0x79),
    ("f11", 0x7A),
    ("f12", 0x7B),
];

/// Alternative spellings and the canonical name they collapse to
pub const KEY_ALIASES: &[(&str, &str)] = &[
    ("return", "enter"),
    ("escape", "esc"),
    ("del", "delete"),
    ("ins", "insert"),
    ("pgup", "pageup"),
    ("pgdn", "pagedown"),
    ("spacebar", "space"),
];

/// Codes of keys that only ever act as modifiers (generic, left and right)
pub const MODIFIER_CODES: &[(NativeKeyCode, Modifier)] = &[
    (0x10, Modifier::Shift),
    (0x11, Modifier::Ctrl),
    (0x12, Modifier::Alt),
    (0x5B, Modifier::Super),
    (0x5C, Modifier::Super),
    (0xA0, Modifier::Shift),
    (0xA1, Modifier::Shift),
    (0xA2, Modifier::Ctrl),
    (0xA3, Modifier::Ctrl),
    (0xA4, Modifier::Alt),
    (0xA5, Modifier::Alt),
];

/// Resolve an alias to its canonical key name. `token` must already be lower-case.
pub fn canonical_key_name(token: &str) -> &str {
    KEY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == token)
        .map(|(_, name)| *name)
        .unwrap_or(token)
}

/// Code for a canonical, lower-case key name
pub fn code_for_name(name: &str) -> Option<NativeKeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            return Some(c.to_ascii_uppercase() as NativeKeyCode);
        }
    }

    NAMED_KEYS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, code)| *code)
}

/// Canonical key name for a code, if the code is in the common table
pub fn name_for_code(code: NativeKeyCode) -> Option<String> {
    if let Ok(byte) = u8::try_from(code) {
        if byte.is_ascii_uppercase() || byte.is_ascii_digit() {
            return Some((byte as char).to_ascii_lowercase().to_string());
        }
    }

    NAMED_KEYS
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(n, _)| (*n).to_string())
}

/// Modifier represented by a bare modifier key code
pub fn modifier_for_code(code: NativeKeyCode) -> Option<Modifier> {
    MODIFIER_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, m)| *m)
}
