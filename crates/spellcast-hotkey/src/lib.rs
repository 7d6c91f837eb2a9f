//! Prefix-armed hotkey sequence recognition
//!
//! A spell is cast by pressing a global prefix combination followed by a short
//! sequence of keys (`alt+space` then `g`, `s`). This crate provides:
//! - Descriptor parsing into canonical key sequences
//! - A registry that rejects duplicate and prefix-ambiguous sequences
//! - A timeout-bounded recognition engine fed by a bounded event queue
//! - Fire-and-forget dispatch of recognized spells to an async handler
//! - YAML spellbook configuration with validation

pub mod config;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod handler;
pub mod keys;
pub mod models;
pub mod parser;
pub mod recognizer;
pub mod registry;
pub mod resolver;

// Re-export public types
pub use config::{ConfigIssue, HotkeyConfig, Severity, SpellcastConfig};
pub use conflict::{Conflict, ConflictDetector};
pub use engine::{EngineOptions, HotkeyManager, KeyEventSender, RecognitionEngine};
pub use error::{ConfigError, EngineError, ParseError, RegistryError, ValidationError};
pub use handler::{FnHandler, SpellHandler};
pub use models::{Key, KeyEventKind, KeySequence, Modifier, NativeKeyCode, RawKeyEvent, SpellEvent};
pub use parser::SequenceParser;
pub use recognizer::{Recognition, RecognitionState, Recognizer, Timeout};
pub use registry::{Binding, Lookup, SequenceRegistry};
pub use resolver::{KeyNameResolver, Platform, PlatformResolver};
