use std::fs;
use std::time::Duration;

use spellcast_cli::commands::{CheckCommand, Command, ParseCommand, SimulateCommand};
use spellcast_cli::{Cli, CliError, CommandRouter};
use spellcast_hotkey::Platform;
use clap::Parser;
use tempfile::TempDir;

const SPELLBOOK: &str = r#"
hotkeys:
  prefix: "ctrl+a"
  timeout: 1000
  sequence_timeout: 2000
spells:
  "x,y": demo
  "t": terminal
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn write_spellbook(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("spellbook.yml");
        fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_router_runs_parse() {
        let cli = Cli::try_parse_from(["spellcast", "parse", "--platform", "linux", "Ctrl+Shift+A"]).unwrap();
        assert!(CommandRouter::execute(&cli).await.is_ok());
    }

    #[tokio::test]
    async fn test_router_reports_check_failure() {
        let dir = TempDir::new().unwrap();
        let path = write_spellbook(&dir, "hotkeys:\n  prefix: \"\"\n");

        let cli = Cli::try_parse_from([
            "spellcast",
            "check",
            "--platform",
            "linux",
            "--config",
            path.to_str().unwrap(),
        ])
        .unwrap();
        let err = CommandRouter::execute(&cli).await.unwrap_err();
        assert!(matches!(err, CliError::ValidationFailed { errors: 1 }));
    }

    #[tokio::test]
    async fn test_check_valid_spellbook() {
        let dir = TempDir::new().unwrap();
        let path = write_spellbook(&dir, SPELLBOOK);

        let report = CheckCommand::new(Some(path))
            .with_platform(Some(Platform::Linux))
            .report()
            .unwrap();
        assert_eq!(report.errors(), 0);
        assert_eq!(report.config.spells.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulate_from_spellbook_file() {
        let dir = TempDir::new().unwrap();
        let path = write_spellbook(&dir, SPELLBOOK);

        let events = SimulateCommand::new(vec!["ctrl+a".into(), "x".into(), "y".into()])
            .with_config(Some(path))
            .with_platform(Some(Platform::Linux))
            .with_delay(Duration::from_millis(50))
            .run()
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sequence.canonical(), "x,y");
        assert_eq!(events[0].spell, "demo");
    }

    #[tokio::test]
    async fn test_parse_command_json() {
        let cmd = ParseCommand::new(vec!["alt+space".to_string()])
            .with_platform(Some(Platform::Linux))
            .with_json(true);
        assert!(cmd.execute().await.is_ok());
    }
}
