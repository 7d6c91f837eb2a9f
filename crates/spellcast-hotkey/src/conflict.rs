//! Conflict detection between key sequences
//!
//! Two sequences conflict when they are equal but bound to different spells,
//! or when one is a strict step-wise prefix of the other. In the latter case
//! the engine could not tell, after the shorter sequence was typed, whether to
//! fire it or keep waiting for the longer one.

use std::fmt;

use crate::error::ValidationError;
use crate::models::KeySequence;

/// A conflict between a candidate sequence and an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// The same sequence is already bound to another spell
    Duplicate {
        sequence: String,
        existing_spell: String,
    },
    /// The candidate is a prefix of a longer existing sequence
    LongerSequence {
        sequence: String,
        existing: String,
        existing_spell: String,
    },
    /// An existing sequence is a prefix of the candidate
    ShorterSequence {
        sequence: String,
        existing: String,
        existing_spell: String,
    },
}

impl Conflict {
    /// The candidate sequence this conflict was reported for
    pub fn sequence(&self) -> &str {
        match self {
            Conflict::Duplicate { sequence, .. }
            | Conflict::LongerSequence { sequence, .. }
            | Conflict::ShorterSequence { sequence, .. } => sequence,
        }
    }

    /// Spell that already owns the conflicting sequence
    pub fn existing_spell(&self) -> &str {
        match self {
            Conflict::Duplicate { existing_spell, .. }
            | Conflict::LongerSequence { existing_spell, .. }
            | Conflict::ShorterSequence { existing_spell, .. } => existing_spell,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Conflict::Duplicate { existing_spell, .. } => {
                format!("sequence already registered for spell '{}'", existing_spell)
            }
            Conflict::LongerSequence {
                existing,
                existing_spell,
                ..
            } => format!(
                "sequence conflicts with longer sequence '{}' (spell: {})",
                existing, existing_spell
            ),
            Conflict::ShorterSequence {
                existing,
                existing_spell,
                ..
            } => format!(
                "sequence conflicts with shorter sequence '{}' (spell: {})",
                existing, existing_spell
            ),
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sequence(), self.message())
    }
}

impl From<Conflict> for ValidationError {
    fn from(conflict: Conflict) -> Self {
        ValidationError::new(conflict.sequence(), conflict.message())
    }
}

/// Detects duplicate and prefix-ambiguous sequences
pub struct ConflictDetector;

impl ConflictDetector {
    /// Check one candidate against existing bindings; the first conflict wins.
    ///
    /// Re-binding a sequence to the spell that already owns it is not a conflict.
    pub fn check<'a, I>(candidate: &KeySequence, spell: &str, existing: I) -> Option<Conflict>
    where
        I: IntoIterator<Item = (&'a KeySequence, &'a str)>,
    {
        let sequence = candidate.canonical();

        for (other, other_spell) in existing {
            if other == candidate {
                if other_spell != spell {
                    return Some(Conflict::Duplicate {
                        sequence,
                        existing_spell: other_spell.to_string(),
                    });
                }
                continue;
            }

            if candidate.is_strict_prefix_of(other) {
                return Some(Conflict::LongerSequence {
                    sequence,
                    existing: other.canonical(),
                    existing_spell: other_spell.to_string(),
                });
            }

            if other.is_strict_prefix_of(candidate) {
                return Some(Conflict::ShorterSequence {
                    sequence,
                    existing: other.canonical(),
                    existing_spell: other_spell.to_string(),
                });
            }
        }

        None
    }

    /// Detect every conflict in a batch of bindings, checking each binding
    /// against the ones before it.
    pub fn detect(bindings: &[(KeySequence, String)]) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        for (idx, (sequence, spell)) in bindings.iter().enumerate() {
            let earlier = bindings[..idx].iter().map(|(s, n)| (s, n.as_str()));
            if let Some(conflict) = Self::check(sequence, spell, earlier) {
                conflicts.push(conflict);
            }
        }

        conflicts
    }
}
