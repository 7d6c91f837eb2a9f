//! Key name resolution supplied per platform
//!
//! The parser and the engine never look up platform tables on their own; they
//! receive a [`KeyNameResolver`] at construction time.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::keys;
use crate::models::{Modifier, NativeKeyCode};

/// Platform capability that normalizes modifier tokens and names native key codes
pub trait KeyNameResolver: Send + Sync + fmt::Debug {
    /// Normalize a lower-case modifier token such as `option` or `win`
    fn normalize_modifier(&self, token: &str) -> Option<Modifier>;

    /// Canonical key name for a native code, `None` if the code is unknown
    fn resolve_key_name(&self, code: NativeKeyCode) -> Option<String>;

    /// Whether the code belongs to a key that only acts as a modifier
    fn is_modifier_code(&self, code: NativeKeyCode) -> bool {
        keys::modifier_for_code(code).is_some()
    }

    /// Key names that exist only on this platform
    fn special_keys(&self) -> &[(&'static str, NativeKeyCode)] {
        &[]
    }

    /// Native code for a canonical key name, including platform special keys
    fn code_for_name(&self, name: &str) -> Option<NativeKeyCode> {
        keys::code_for_name(name).or_else(|| {
            self.special_keys()
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, code)| *code)
        })
    }
}

/// Supported platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    /// The platform this binary was compiled for
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Linux => write!(f, "linux"),
            Platform::MacOs => write!(f, "macos"),
            Platform::Windows => write!(f, "windows"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "macos" | "darwin" | "mac" => Ok(Platform::MacOs),
            "windows" | "win" => Ok(Platform::Windows),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}

const LINUX_MODIFIERS: &[(&str, Modifier)] = &[
    ("ctrl", Modifier::Ctrl),
    ("control", Modifier::Ctrl),
    ("alt", Modifier::Alt),
    ("opt", Modifier::Alt),
    ("option", Modifier::Alt),
    ("shift", Modifier::Shift),
    ("cmd", Modifier::Super),
    ("command", Modifier::Super),
    ("win", Modifier::Super),
    ("windows", Modifier::Super),
    ("meta", Modifier::Super),
    ("super", Modifier::Super),
];

const MACOS_MODIFIERS: &[(&str, Modifier)] = &[
    ("cmd", Modifier::Super),
    ("command", Modifier::Super),
    ("ctrl", Modifier::Ctrl),
    ("control", Modifier::Ctrl),
    ("alt", Modifier::Alt),
    ("option", Modifier::Alt),
    ("opt", Modifier::Alt),
    ("shift", Modifier::Shift),
    ("super", Modifier::Super),
];

const WINDOWS_MODIFIERS: &[(&str, Modifier)] = &[
    ("win", Modifier::Super),
    ("windows", Modifier::Super),
    ("ctrl", Modifier::Ctrl),
    ("control", Modifier::Ctrl),
    ("alt", Modifier::Alt),
    ("shift", Modifier::Shift),
    ("super", Modifier::Super),
];

const MACOS_SPECIAL_KEYS: &[(&str, NativeKeyCode)] = &[
    ("fn", 0xE8),
    ("capslock", 0x14),
    ("clear", 0x0C),
    ("help", 0x2F),
];

const WINDOWS_SPECIAL_KEYS: &[(&str, NativeKeyCode)] = &[
    ("printscreen", 0x2C),
    ("scrolllock", 0x91),
    ("pause", 0x13),
    ("numlock", 0x90),
];

/// Table-driven resolver for one of the built-in platforms
#[derive(Debug, Clone, Copy)]
pub struct PlatformResolver {
    platform: Platform,
}

impl PlatformResolver {
    pub fn new(platform: Platform) -> Self {
        PlatformResolver { platform }
    }

    /// Resolver for the platform this binary was compiled for
    pub fn current() -> Self {
        Self::new(Platform::current())
    }

    /// Shared handle, the form the parser and engine take
    pub fn shared(platform: Platform) -> Arc<dyn KeyNameResolver> {
        Arc::new(Self::new(platform))
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Modifier aliases accepted on this platform
    pub fn modifier_aliases(&self) -> &'static [(&'static str, Modifier)] {
        match self.platform {
            Platform::Linux => LINUX_MODIFIERS,
            Platform::MacOs => MACOS_MODIFIERS,
            Platform::Windows => WINDOWS_MODIFIERS,
        }
    }
}

impl KeyNameResolver for PlatformResolver {
    fn normalize_modifier(&self, token: &str) -> Option<Modifier> {
        self.modifier_aliases()
            .iter()
            .find(|(alias, _)| *alias == token)
            .map(|(_, m)| *m)
    }

    fn resolve_key_name(&self, code: NativeKeyCode) -> Option<String> {
        keys::name_for_code(code).or_else(|| {
            self.special_keys()
                .iter()
                .find(|(_, c)| *c == code)
                .map(|(n, _)| (*n).to_string())
        })
    }

    fn special_keys(&self) -> &[(&'static str, NativeKeyCode)] {
        match self.platform {
            Platform::Linux => &[],
            Platform::MacOs => MACOS_SPECIAL_KEYS,
            Platform::Windows => WINDOWS_SPECIAL_KEYS,
        }
    }
}
