//! Spellbook configuration
//!
//! A YAML file with a `hotkeys` section (prefix and timeouts in milliseconds)
//! and a `spells` map from descriptor to spell name:
//!
//! ```yaml
//! hotkeys:
//!   prefix: "alt+space"
//!   timeout: 1000
//!   sequence_timeout: 2000
//! spells:
//!   "g,s": git_status
//!   "t": terminal
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conflict::ConflictDetector;
use crate::engine::{EngineOptions, RecognitionEngine, DEFAULT_PREFIX};
use crate::error::ConfigError;
use crate::models::{Key, KeySequence};
use crate::parser::SequenceParser;
use crate::resolver::KeyNameResolver;

/// Prefix timeouts below this are accepted but flagged
pub const MIN_RECOMMENDED_TIMEOUT_MS: u64 = 100;

/// The `hotkeys` section; timeouts are milliseconds and `0` disables one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    pub prefix: String,
    pub timeout: u64,
    pub sequence_timeout: u64,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        HotkeyConfig {
            prefix: DEFAULT_PREFIX.to_string(),
            timeout: 1000,
            sequence_timeout: 2000,
        }
    }
}

impl From<&HotkeyConfig> for EngineOptions {
    fn from(config: &HotkeyConfig) -> Self {
        EngineOptions {
            prefix: config.prefix.clone(),
            prefix_timeout: Duration::from_millis(config.timeout),
            sequence_timeout: Duration::from_millis(config.sequence_timeout),
            ..EngineOptions::default()
        }
    }
}

/// A complete spellbook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellcastConfig {
    pub hotkeys: HotkeyConfig,
    /// Descriptor to spell name
    pub spells: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One finding from [`SpellcastConfig::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Dotted path of the offending field, e.g. `hotkeys.prefix`
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ConfigIssue {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigIssue {
            severity: Severity::Error,
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigIssue {
            severity: Severity::Warning,
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.field, self.message)
    }
}

impl SpellcastConfig {
    /// Parse a spellbook from YAML. An empty document yields the defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(SpellcastConfig::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        debug!(
            path = %path.display(),
            spells = config.spells.len(),
            "Loaded spellbook"
        );
        Ok(config)
    }

    /// Load the spellbook at [`default_path`](Self::default_path), falling
    /// back to the defaults when the file does not exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if !path.exists() {
            debug!(path = %path.display(), "No spellbook found, using defaults");
            return Ok(SpellcastConfig::default());
        }
        Self::load(path)
    }

    /// `<config dir>/spellcast/spellbook.yml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("spellcast").join("spellbook.yml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check the spellbook without building an engine. Returns every issue
    /// found; an empty list means the config is usable as is.
    pub fn validate(&self, resolver: &Arc<dyn KeyNameResolver>) -> Vec<ConfigIssue> {
        let parser = SequenceParser::new(Arc::clone(resolver));
        let mut issues = Vec::new();

        let prefix = self.validate_prefix(&parser, &mut issues);
        self.validate_timeouts(&mut issues);

        let mut bindings: Vec<(KeySequence, String)> = Vec::new();
        for (descriptor, spell) in &self.spells {
            let field = format!("spells.{}", descriptor);

            if spell.trim().is_empty() {
                issues.push(ConfigIssue::error(&field, "spell name cannot be empty"));
                continue;
            }

            let sequence = match parser.parse(descriptor) {
                Ok(sequence) => sequence,
                Err(e) => {
                    issues.push(
                        ConfigIssue::error(&field, e.to_string())
                            .suggest("separate steps with ',' and modifiers with '+', e.g. 'ctrl+g,s'"),
                    );
                    continue;
                }
            };

            if let (Some(prefix), Some(first)) = (&prefix, sequence.keys().first()) {
                if first == prefix {
                    issues.push(
                        ConfigIssue::warning(
                            &field,
                            format!("spell '{}' starts with the prefix key '{}'", spell, prefix),
                        )
                        .suggest("the prefix is consumed before collection starts; drop it from the spell"),
                    );
                }
            }

            // reported under the key as written in the file, not the canonical form
            let earlier = bindings.iter().map(|(s, n)| (s, n.as_str()));
            if let Some(conflict) = ConflictDetector::check(&sequence, spell, earlier) {
                issues.push(
                    ConfigIssue::error(&field, conflict.message())
                        .suggest("no spell may be a prefix of, or equal to, another spell"),
                );
            }

            bindings.push((sequence, spell.clone()));
        }

        issues
    }

    fn validate_prefix(
        &self,
        parser: &SequenceParser,
        issues: &mut Vec<ConfigIssue>,
    ) -> Option<Key> {
        if self.hotkeys.prefix.trim().is_empty() {
            issues.push(
                ConfigIssue::error("hotkeys.prefix", "prefix key is required")
                    .suggest(format!("use a single combination such as '{}'", DEFAULT_PREFIX)),
            );
            return None;
        }

        match parser.parse(&self.hotkeys.prefix) {
            Ok(sequence) if sequence.len() == 1 => sequence.into_keys().into_iter().next(),
            Ok(sequence) => {
                issues.push(
                    ConfigIssue::error(
                        "hotkeys.prefix",
                        format!("prefix must be a single key combination, got '{}'", sequence),
                    )
                    .suggest("remove the ',' separated steps"),
                );
                None
            }
            Err(e) => {
                issues.push(ConfigIssue::error("hotkeys.prefix", e.to_string()));
                None
            }
        }
    }

    fn validate_timeouts(&self, issues: &mut Vec<ConfigIssue>) {
        let HotkeyConfig {
            timeout,
            sequence_timeout,
            ..
        } = self.hotkeys;

        if timeout != 0 && timeout < MIN_RECOMMENDED_TIMEOUT_MS {
            issues.push(
                ConfigIssue::warning(
                    "hotkeys.timeout",
                    format!("prefix timeout of {}ms is very short", timeout),
                )
                .suggest(format!("use at least {}ms", MIN_RECOMMENDED_TIMEOUT_MS)),
            );
        }

        if sequence_timeout != 0 && sequence_timeout < timeout {
            issues.push(
                ConfigIssue::error(
                    "hotkeys.sequence_timeout",
                    format!(
                        "sequence timeout ({}ms) is shorter than the prefix timeout ({}ms)",
                        sequence_timeout, timeout
                    ),
                )
                .suggest("set sequence_timeout to at least the prefix timeout, or 0 to disable it"),
            );
        }
    }
}

impl RecognitionEngine {
    /// Build an engine with every spell of the config registered.
    ///
    /// Spells are registered in descriptor order; the first rejected one
    /// aborts construction.
    pub fn from_config(
        config: &SpellcastConfig,
        resolver: Arc<dyn KeyNameResolver>,
    ) -> Result<RecognitionEngine, ConfigError> {
        let engine = RecognitionEngine::new(EngineOptions::from(&config.hotkeys), resolver)?;

        for (descriptor, spell) in &config.spells {
            engine
                .registry()
                .register(descriptor, spell)
                .map_err(|source| ConfigError::Spell {
                    descriptor: descriptor.clone(),
                    source,
                })?;
        }

        Ok(engine)
    }
}
