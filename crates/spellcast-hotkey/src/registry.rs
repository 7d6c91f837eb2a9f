//! Sequence registry with duplicate and prefix-ambiguity validation
//!
//! Lock discipline: recognition lookups and enumeration take the read lock;
//! `register`, `unregister` and `clear` take the write lock for the whole
//! check-then-mutate step, so no reader ever sees a half-applied registration.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::conflict::ConflictDetector;
use crate::error::{RegistryError, ValidationError};
use crate::models::KeySequence;
use crate::parser::SequenceParser;

/// A registered sequence and the spell it triggers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub sequence: KeySequence,
    pub spell: String,
}

/// Result of looking up a (partial) candidate sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The candidate equals a registered sequence
    Match(Binding),
    /// The candidate is a strict prefix of at least one registered sequence
    Prefix,
    /// No registered sequence starts with the candidate
    NoMatch,
}

/// Thread-safe map of canonical sequence to spell name.
///
/// Cloning is cheap and every clone shares the same table.
#[derive(Debug, Clone)]
pub struct SequenceRegistry {
    parser: SequenceParser,
    entries: Arc<RwLock<BTreeMap<String, Binding>>>,
}

impl SequenceRegistry {
    pub fn new(parser: SequenceParser) -> Self {
        SequenceRegistry {
            parser,
            entries: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    pub fn parser(&self) -> &SequenceParser {
        &self.parser
    }

    /// Check that `descriptor` could be registered for `spell` without
    /// changing the registry.
    pub fn validate(&self, descriptor: &str, spell: &str) -> Result<KeySequence, RegistryError> {
        let sequence = self.parser.parse(descriptor)?;
        let entries = self.read();
        Self::check(&entries, &sequence, spell)?;
        Ok(sequence)
    }

    /// Validate and insert. The registry is unchanged on error.
    pub fn register(&self, descriptor: &str, spell: &str) -> Result<KeySequence, RegistryError> {
        let sequence = self.parser.parse(descriptor)?;
        let canonical = sequence.canonical();

        let mut entries = self.write();
        Self::check(&entries, &sequence, spell)?;
        entries.insert(
            canonical.clone(),
            Binding {
                sequence: sequence.clone(),
                spell: spell.to_string(),
            },
        );
        drop(entries);

        debug!(sequence = %canonical, spell = %spell, "Registered spell sequence");
        Ok(sequence)
    }

    /// Remove a registration. Unknown or unparsable descriptors are a no-op.
    /// Returns the spell that was bound, if any.
    pub fn unregister(&self, descriptor: &str) -> Option<String> {
        let canonical = match self.parser.normalize(descriptor) {
            Ok(canonical) => canonical,
            Err(_) => descriptor.trim().to_lowercase(),
        };

        let removed = self.write().remove(&canonical).map(|b| b.spell);
        if let Some(spell) = &removed {
            debug!(sequence = %canonical, spell = %spell, "Unregistered spell sequence");
        }
        removed
    }

    /// Snapshot of canonical sequence to spell name
    pub fn get_registered(&self) -> BTreeMap<String, String> {
        self.read()
            .iter()
            .map(|(seq, binding)| (seq.clone(), binding.spell.clone()))
            .collect()
    }

    /// Snapshot of every binding, ordered by canonical sequence
    pub fn bindings(&self) -> Vec<Binding> {
        self.read().values().cloned().collect()
    }

    /// Canonical sequences bound to a spell
    pub fn sequences_for(&self, spell: &str) -> Vec<String> {
        self.read()
            .iter()
            .filter(|(_, binding)| binding.spell == spell)
            .map(|(seq, _)| seq.clone())
            .collect()
    }

    /// Classify a candidate sequence under a single read lock
    pub fn lookup(&self, candidate: &KeySequence) -> Lookup {
        let entries = self.read();

        if let Some(binding) = entries.get(&candidate.canonical()) {
            return Lookup::Match(binding.clone());
        }

        if entries
            .values()
            .any(|binding| candidate.is_strict_prefix_of(&binding.sequence))
        {
            Lookup::Prefix
        } else {
            Lookup::NoMatch
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    fn check(
        entries: &BTreeMap<String, Binding>,
        sequence: &KeySequence,
        spell: &str,
    ) -> Result<(), ValidationError> {
        if spell.trim().is_empty() {
            return Err(ValidationError::new(
                sequence.canonical(),
                "spell name cannot be empty",
            ));
        }

        let existing = entries
            .values()
            .map(|binding| (&binding.sequence, binding.spell.as_str()));

        match ConflictDetector::check(sequence, spell, existing) {
            Some(conflict) => Err(conflict.into()),
            None => Ok(()),
        }
    }

    // Every write is a single insert, remove or clear, so the map is
    // consistent even if a holder panicked.
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Binding>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Binding>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
