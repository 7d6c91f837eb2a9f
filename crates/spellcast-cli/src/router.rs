// Command routing and dispatch

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use spellcast_hotkey::Platform;

use crate::commands::*;
use crate::error::CliResult;

/// Spellcast - prefix-key spell sequences
#[derive(Parser, Debug)]
#[command(name = "spellcast")]
#[command(bin_name = "spellcast")]
#[command(about = "Inspect, validate and rehearse prefix-key spell sequences")]
#[command(
    long_about = "Spellcast: cast a spell by pressing a prefix combination followed by a short key sequence.\n\nQuick Start:\n  • spellcast parse ctrl+shift+g,s     Show the canonical form of a sequence\n  • spellcast check                   Validate your spellbook\n  • spellcast simulate alt+space g s  Rehearse a key stream against the spellbook\n  • spellcast keys                    List key and modifier names"
)]
#[command(version)]
#[command(author = "Spellcast Contributors")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimize output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Parse key sequence descriptors
    #[command(about = "Show the canonical form, key names and native codes of descriptors")]
    Parse {
        /// Descriptors such as 'ctrl+a' or 'g,s'
        #[arg(value_name = "DESCRIPTOR", required = true)]
        descriptors: Vec<String>,

        /// Platform whose key names apply (linux, macos, windows)
        #[arg(long)]
        platform: Option<Platform>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate a spellbook
    #[command(about = "Load and validate a spellbook, listing issues and registered spells")]
    Check {
        /// Spellbook path (default: <config dir>/spellcast/spellbook.yml)
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Platform whose key names apply (linux, macos, windows)
        #[arg(long)]
        platform: Option<Platform>,
    },

    /// Rehearse a key stream
    #[command(about = "Feed key presses through a live engine and print the spells cast")]
    Simulate {
        /// Spellbook path (default: <config dir>/spellcast/spellbook.yml)
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Platform whose key names apply (linux, macos, windows)
        #[arg(long)]
        platform: Option<Platform>,

        /// Milliseconds between key presses
        #[arg(long, default_value_t = simulate::DEFAULT_DELAY_MS)]
        delay_ms: u64,

        /// Milliseconds to keep listening after the last press
        #[arg(long, default_value_t = simulate::DEFAULT_WAIT_MS)]
        wait_ms: u64,

        /// Key presses, prefix included, e.g. 'alt+space g s'
        #[arg(value_name = "STEP", required = true)]
        steps: Vec<String>,
    },

    /// List key names
    #[command(about = "List key names, native codes and modifier aliases")]
    Keys {
        /// Platform to list (linux, macos, windows)
        #[arg(long)]
        platform: Option<Platform>,
    },
}

/// Command router
pub struct CommandRouter;

impl CommandRouter {
    /// Parse arguments and run the selected command
    pub async fn route() -> CliResult<()> {
        let cli = Cli::parse();

        crate::logging::init_logging(cli.verbose, cli.quiet);

        Self::execute(&cli).await
    }

    /// Execute a command
    pub async fn execute(cli: &Cli) -> CliResult<()> {
        match &cli.command {
            Commands::Parse {
                descriptors,
                platform,
                json,
            } => {
                let cmd = ParseCommand::new(descriptors.clone())
                    .with_platform(*platform)
                    .with_json(*json);
                cmd.execute().await
            }
            Commands::Check { config, platform } => {
                let cmd = CheckCommand::new(config.clone()).with_platform(*platform);
                cmd.execute().await
            }
            Commands::Simulate {
                config,
                platform,
                delay_ms,
                wait_ms,
                steps,
            } => {
                let cmd = SimulateCommand::new(steps.clone())
                    .with_config(config.clone())
                    .with_platform(*platform)
                    .with_delay(Duration::from_millis(*delay_ms))
                    .with_wait(Duration::from_millis(*wait_ms));
                cmd.execute().await
            }
            Commands::Keys { platform } => {
                let cmd = KeysCommand::new(*platform);
                cmd.execute().await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommand() {
        let cli = Cli::try_parse_from(["spellcast", "-v", "parse", "ctrl+a", "g,s", "--platform", "mac"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Parse {
                descriptors,
                platform,
                json,
            } => {
                assert_eq!(descriptors, vec!["ctrl+a", "g,s"]);
                assert_eq!(platform, Some(Platform::MacOs));
                assert!(!json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_simulate_defaults() {
        let cli = Cli::try_parse_from(["spellcast", "simulate", "alt+space", "t"]).unwrap();
        match cli.command {
            Commands::Simulate {
                delay_ms,
                wait_ms,
                steps,
                config,
                ..
            } => {
                assert_eq!(delay_ms, simulate::DEFAULT_DELAY_MS);
                assert_eq!(wait_ms, simulate::DEFAULT_WAIT_MS);
                assert_eq!(steps, vec!["alt+space", "t"]);
                assert!(config.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_platform() {
        assert!(Cli::try_parse_from(["spellcast", "keys", "--platform", "beos"]).is_err());
    }

    #[test]
    fn test_parse_requires_descriptor() {
        assert!(Cli::try_parse_from(["spellcast", "parse"]).is_err());
    }

    #[test]
    fn test_global_quiet_after_subcommand() {
        let cli = Cli::try_parse_from(["spellcast", "check", "-q", "--config", "book.yml"]).unwrap();
        assert!(cli.quiet);
        assert!(matches!(
            cli.command,
            Commands::Check { config: Some(ref p), .. } if p == &PathBuf::from("book.yml")
        ));
    }
}
