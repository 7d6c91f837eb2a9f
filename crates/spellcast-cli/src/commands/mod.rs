// Command handlers for the spellcast CLI

pub mod check;
pub mod keys;
pub mod parse;
pub mod simulate;

pub use check::{CheckCommand, CheckReport};
pub use keys::KeysCommand;
pub use parse::{DescriptorInfo, ParseCommand, StepInfo};
pub use simulate::SimulateCommand;

use std::path::Path;
use std::sync::Arc;

use spellcast_hotkey::{KeyNameResolver, Platform, PlatformResolver, SpellcastConfig};

use crate::error::CliResult;

/// Trait for command handlers
#[async_trait::async_trait]
pub trait Command: Send + Sync {
    /// Execute the command
    async fn execute(&self) -> CliResult<()>;
}

/// Resolver for the requested platform, or the one this binary runs on
pub(crate) fn resolver_for(platform: Option<Platform>) -> Arc<dyn KeyNameResolver> {
    PlatformResolver::shared(platform.unwrap_or_else(Platform::current))
}

/// Load the given spellbook, or the default one (defaults if absent)
pub(crate) fn load_config(path: Option<&Path>) -> CliResult<SpellcastConfig> {
    let config = match path {
        Some(path) => SpellcastConfig::load(path)?,
        None => SpellcastConfig::load_default()?,
    };
    Ok(config)
}
