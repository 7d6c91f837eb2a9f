//! Descriptor parsing: `"ctrl+alt+g,s"` into a canonical [`KeySequence`]

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::error::ParseError;
use crate::keys;
use crate::models::{Key, KeySequence, RawKeyEvent};
use crate::resolver::KeyNameResolver;

/// Stateless translator from descriptor strings to key sequences.
///
/// Steps are separated by `,`, and within a step `+` separates modifiers from
/// the key name, which is always the last token. Parsing is case-insensitive.
#[derive(Clone)]
pub struct SequenceParser {
    resolver: Arc<dyn KeyNameResolver>,
}

impl SequenceParser {
    pub fn new(resolver: Arc<dyn KeyNameResolver>) -> Self {
        SequenceParser { resolver }
    }

    pub fn resolver(&self) -> &Arc<dyn KeyNameResolver> {
        &self.resolver
    }

    /// Parse a full descriptor such as `ctrl+a` or `g,s`
    pub fn parse(&self, descriptor: &str) -> Result<KeySequence, ParseError> {
        if descriptor.trim().is_empty() {
            return Err(ParseError::new(descriptor, "empty sequence"));
        }

        let keys = descriptor
            .split(',')
            .map(|step| {
                let step = step.trim();
                if step.is_empty() {
                    return Err(ParseError::new(descriptor, "empty key in sequence"));
                }
                self.parse_step(descriptor, step)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(KeySequence::new(keys))
    }

    /// Parse a single key combination such as `ctrl+shift+f5`
    pub fn parse_key(&self, step: &str) -> Result<Key, ParseError> {
        let trimmed = step.trim();
        if trimmed.is_empty() {
            return Err(ParseError::new(step, "empty key"));
        }
        self.parse_step(step, trimmed)
    }

    /// Canonical string of a descriptor, the form used as a registry key
    pub fn normalize(&self, descriptor: &str) -> Result<String, ParseError> {
        self.parse(descriptor).map(|seq| seq.canonical())
    }

    /// Translate a raw hook event into a key. `None` means the code could not
    /// be attributed to a key and the event should be dropped.
    pub fn resolve_event(&self, event: &RawKeyEvent) -> Option<Key> {
        let name = self.resolver.resolve_key_name(event.code)?;
        if name.is_empty() {
            return None;
        }
        Some(Key::new(event.code, event.modifiers.iter().copied(), name))
    }

    fn parse_step(&self, input: &str, step: &str) -> Result<Key, ParseError> {
        let lowered = step.to_lowercase();
        let mut tokens: Vec<&str> = lowered.split('+').map(str::trim).collect();

        // split always yields at least one token
        let key_token = tokens.pop().unwrap_or_default();
        if key_token.is_empty() {
            return Err(ParseError::new(input, "empty key"));
        }

        let mut modifiers = BTreeSet::new();
        for token in tokens {
            if token.is_empty() {
                return Err(ParseError::new(input, "empty modifier"));
            }
            let modifier = self
                .resolver
                .normalize_modifier(token)
                .ok_or_else(|| ParseError::new(input, format!("unknown modifier: {}", token)))?;
            modifiers.insert(modifier);
        }

        let name = keys::canonical_key_name(key_token);
        let code = self
            .resolver
            .code_for_name(name)
            .ok_or_else(|| ParseError::new(input, format!("unknown key: {}", key_token)))?;

        Ok(Key::new(code, modifiers, name))
    }
}

impl fmt::Debug for SequenceParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceParser")
            .field("resolver", &self.resolver)
            .finish()
    }
}
