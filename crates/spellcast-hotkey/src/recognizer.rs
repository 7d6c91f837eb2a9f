//! Prefix-armed sequence recognition state machine
//!
//! The recognizer owns no I/O and no locks. The engine's processing loop is
//! its only owner and feeds it keys and clock ticks; time is always passed in
//! so transitions are deterministic under test.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::models::{Key, KeySequence, SpellEvent};
use crate::registry::{Lookup, SequenceRegistry};

/// Transient recognition state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionState {
    Idle,
    /// Prefix seen, no step captured yet
    Armed { armed_at: Instant },
    /// At least one step captured
    Collecting {
        armed_at: Instant,
        candidate: Vec<Key>,
    },
}

/// Outcome of feeding one key to the recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognition {
    /// Idle and the key was not the prefix
    Ignored,
    /// The prefix key armed the recognizer
    Armed,
    /// The candidate is a prefix of a registered sequence; waiting for more
    Pending(KeySequence),
    /// The candidate matched a registered sequence
    Matched(SpellEvent),
    /// Nothing registered starts with the candidate
    Abandoned(KeySequence),
}

/// Which timeout expired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// No step followed the prefix in time
    Prefix,
    /// The sequence was not completed in time
    Sequence,
}

/// The recognition state machine: `Idle -> Armed -> Collecting -> Idle`
#[derive(Debug, Clone)]
pub struct Recognizer {
    prefix: Key,
    prefix_timeout: Duration,
    sequence_timeout: Duration,
    state: RecognitionState,
}

impl Recognizer {
    /// A zero timeout disables that timeout.
    pub fn new(prefix: Key, prefix_timeout: Duration, sequence_timeout: Duration) -> Self {
        Recognizer {
            prefix,
            prefix_timeout,
            sequence_timeout,
            state: RecognitionState::Idle,
        }
    }

    pub fn prefix(&self) -> &Key {
        &self.prefix
    }

    pub fn state(&self) -> &RecognitionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == RecognitionState::Idle
    }

    pub fn reset(&mut self) {
        self.state = RecognitionState::Idle;
    }

    /// Feed one key-down. Expired state is discarded first, so a late key is
    /// treated as if the timer tick had already run.
    pub fn on_key(&mut self, key: Key, now: Instant, registry: &SequenceRegistry) -> Recognition {
        self.on_tick(now);

        let (armed_at, mut candidate) = match std::mem::replace(&mut self.state, RecognitionState::Idle) {
            RecognitionState::Idle => {
                if key.same_combo(&self.prefix) {
                    info!(prefix = %self.prefix, "Prefix key detected, waiting for spell");
                    self.state = RecognitionState::Armed { armed_at: now };
                    return Recognition::Armed;
                }
                return Recognition::Ignored;
            }
            RecognitionState::Armed { armed_at } => (armed_at, Vec::new()),
            RecognitionState::Collecting {
                armed_at,
                candidate,
            } => (armed_at, candidate),
        };

        candidate.push(key);
        let sequence = KeySequence::new(candidate);

        match registry.lookup(&sequence) {
            Lookup::Match(binding) => {
                info!(sequence = %sequence, spell = %binding.spell, "Spell matched");
                Recognition::Matched(SpellEvent::new(sequence, binding.spell))
            }
            Lookup::Prefix => {
                debug!(sequence = %sequence, "Partial sequence, waiting for next key");
                self.state = RecognitionState::Collecting {
                    armed_at,
                    candidate: sequence.keys().to_vec(),
                };
                Recognition::Pending(sequence)
            }
            Lookup::NoMatch => {
                info!(sequence = %sequence, "Unknown spell sequence, resetting");
                Recognition::Abandoned(sequence)
            }
        }
    }

    /// Evaluate both timeouts against `now`
    pub fn on_tick(&mut self, now: Instant) -> Option<Timeout> {
        let expired = match &self.state {
            RecognitionState::Idle => None,
            RecognitionState::Armed { armed_at } => {
                Self::elapsed_beyond(*armed_at, now, self.prefix_timeout).then_some(Timeout::Prefix)
            }
            RecognitionState::Collecting { armed_at, .. } => {
                Self::elapsed_beyond(*armed_at, now, self.sequence_timeout)
                    .then_some(Timeout::Sequence)
            }
        };

        if let Some(timeout) = expired {
            info!(?timeout, "Timeout, spell cancelled");
            self.reset();
        }
        expired
    }

    fn elapsed_beyond(armed_at: Instant, now: Instant, limit: Duration) -> bool {
        !limit.is_zero() && now.saturating_duration_since(armed_at) > limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SequenceParser;
    use crate::resolver::{Platform, PlatformResolver};

    fn setup() -> (SequenceParser, SequenceRegistry, Recognizer) {
        let parser = SequenceParser::new(PlatformResolver::shared(Platform::Linux));
        let registry = SequenceRegistry::new(parser.clone());
        registry.register("g,s", "git_status").unwrap();
        let prefix = parser.parse_key("alt+space").unwrap();
        let recognizer = Recognizer::new(
            prefix,
            Duration::from_millis(1000),
            Duration::from_millis(2000),
        );
        (parser, registry, recognizer)
    }

    #[test]
    fn test_idle_ignores_non_prefix() {
        let (parser, registry, mut rec) = setup();
        let now = Instant::now();
        let r = rec.on_key(parser.parse_key("g").unwrap(), now, &registry);
        assert_eq!(r, Recognition::Ignored);
        assert!(rec.is_idle());
    }

    #[test]
    fn test_full_match_resets_to_idle() {
        let (parser, registry, mut rec) = setup();
        let now = Instant::now();

        assert_eq!(rec.on_key(parser.parse_key("alt+space").unwrap(), now, &registry), Recognition::Armed);
        assert!(matches!(
            rec.on_key(parser.parse_key("g").unwrap(), now, &registry),
            Recognition::Pending(_)
        ));
        match rec.on_key(parser.parse_key("s").unwrap(), now, &registry) {
            Recognition::Matched(event) => {
                assert_eq!(event.spell, "git_status");
                assert_eq!(event.sequence.to_string(), "g,s");
            }
            other => panic!("expected match, got {:?}", other),
        }
        assert!(rec.is_idle());
    }

    #[test]
    fn test_prefix_timeout_only_while_armed() {
        let (parser, registry, mut rec) = setup();
        let start = Instant::now();

        rec.on_key(parser.parse_key("alt+space").unwrap(), start, &registry);
        assert_eq!(rec.on_tick(start + Duration::from_millis(900)), None);
        assert_eq!(
            rec.on_tick(start + Duration::from_millis(1001)),
            Some(Timeout::Prefix)
        );
        assert!(rec.is_idle());
    }

    #[test]
    fn test_sequence_timeout_while_collecting() {
        let (parser, registry, mut rec) = setup();
        let start = Instant::now();

        rec.on_key(parser.parse_key("alt+space").unwrap(), start, &registry);
        rec.on_key(parser.parse_key("g").unwrap(), start + Duration::from_millis(500), &registry);

        // past the prefix timeout but inside the sequence timeout
        assert_eq!(rec.on_tick(start + Duration::from_millis(1500)), None);
        assert_eq!(
            rec.on_tick(start + Duration::from_millis(2100)),
            Some(Timeout::Sequence)
        );
    }

    #[test]
    fn test_zero_timeout_disables() {
        let (parser, registry, _) = setup();
        let prefix = parser.parse_key("alt+space").unwrap();
        let mut rec = Recognizer::new(prefix, Duration::ZERO, Duration::ZERO);
        let start = Instant::now();

        rec.on_key(parser.parse_key("alt+space").unwrap(), start, &registry);
        assert_eq!(rec.on_tick(start + Duration::from_secs(3600)), None);
        assert!(!rec.is_idle());
    }

    #[test]
    fn test_late_key_is_not_appended() {
        let (parser, registry, mut rec) = setup();
        let start = Instant::now();

        rec.on_key(parser.parse_key("alt+space").unwrap(), start, &registry);
        rec.on_key(parser.parse_key("g").unwrap(), start, &registry);
        let r = rec.on_key(
            parser.parse_key("s").unwrap(),
            start + Duration::from_millis(2500),
            &registry,
        );
        assert_eq!(r, Recognition::Ignored);
        assert!(rec.is_idle());
    }
}
