// Validate a spellbook

use std::path::PathBuf;

use spellcast_hotkey::{ConfigIssue, Platform, SequenceParser, Severity, SpellcastConfig};

use super::{load_config, resolver_for, Command};
use crate::error::{CliError, CliResult};
use crate::output::OutputStyle;

/// Outcome of checking a spellbook
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// The file that was checked; `None` when the defaults were used
    pub path: Option<PathBuf>,
    pub config: SpellcastConfig,
    pub issues: Vec<ConfigIssue>,
}

impl CheckReport {
    pub fn errors(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }

    pub fn warnings(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }
}

/// Load and validate a spellbook
pub struct CheckCommand {
    config: Option<PathBuf>,
    platform: Option<Platform>,
}

impl CheckCommand {
    pub fn new(config: Option<PathBuf>) -> Self {
        Self {
            config,
            platform: None,
        }
    }

    pub fn with_platform(mut self, platform: Option<Platform>) -> Self {
        self.platform = platform;
        self
    }

    pub fn report(&self) -> CliResult<CheckReport> {
        let config = load_config(self.config.as_deref())?;
        let issues = config.validate(&resolver_for(self.platform));

        let path = match &self.config {
            Some(path) => Some(path.clone()),
            None => SpellcastConfig::default_path().ok().filter(|p| p.exists()),
        };

        Ok(CheckReport {
            path,
            config,
            issues,
        })
    }

    fn print_report(&self, report: &CheckReport) {
        let style = OutputStyle::default();
        let parser = SequenceParser::new(resolver_for(self.platform));
        let hotkeys = &report.config.hotkeys;

        let source = match &report.path {
            Some(path) => path.display().to_string(),
            None => "built-in defaults".to_string(),
        };
        println!("{}", style.header(&format!("Spellbook: {}", source)));
        println!("{}", style.key_value("prefix", &hotkeys.prefix));
        println!("{}", style.key_value("timeout", &format_timeout(hotkeys.timeout)));
        println!(
            "{}",
            style.key_value("sequence_timeout", &format_timeout(hotkeys.sequence_timeout))
        );

        println!("{}", style.section(&format!("Spells ({})", report.config.spells.len())));
        for (descriptor, spell) in &report.config.spells {
            let canonical = parser
                .normalize(descriptor)
                .unwrap_or_else(|_| descriptor.clone());
            println!("{}", style.list_item(&format!("{} → {}", style.code(&canonical), spell)));
        }

        if !report.issues.is_empty() {
            println!("{}", style.section("Issues"));
            for issue in &report.issues {
                let text = format!("{}: {}", issue.field, issue.message);
                let line = match (issue.severity, &issue.suggestion) {
                    (Severity::Error, Some(s)) => style.error_with_suggestion(&text, s),
                    (Severity::Error, None) => style.error(&text),
                    (Severity::Warning, Some(s)) => style.warning_with_suggestion(&text, s),
                    (Severity::Warning, None) => style.warning(&text),
                };
                println!("{}", line);
            }
        }
        println!();
    }
}

fn format_timeout(ms: u64) -> String {
    if ms == 0 {
        "disabled".to_string()
    } else {
        format!("{}ms", ms)
    }
}

#[async_trait::async_trait]
impl Command for CheckCommand {
    async fn execute(&self) -> CliResult<()> {
        let report = self.report()?;
        self.print_report(&report);

        let errors = report.errors();
        if errors > 0 {
            return Err(CliError::ValidationFailed { errors });
        }

        let style = OutputStyle::default();
        println!(
            "{}",
            style.success(&format!(
                "Spellbook is valid ({} spell(s), {} warning(s))",
                report.config.spells.len(),
                report.warnings()
            ))
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn spellbook(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("spellbook.yml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_report_counts_issues() {
        let dir = TempDir::new().unwrap();
        let path = spellbook(
            &dir,
            "hotkeys:\n  timeout: 50\nspells:\n  \"g\": git\n  \"g,s\": git_status\n",
        );

        let report = CheckCommand::new(Some(path.clone()))
            .with_platform(Some(Platform::Linux))
            .report()
            .unwrap();
        assert_eq!(report.path, Some(path));
        assert_eq!(report.errors(), 1);
        assert_eq!(report.warnings(), 1);
    }

    #[tokio::test]
    async fn test_execute_fails_on_errors() {
        let dir = TempDir::new().unwrap();
        let path = spellbook(&dir, "spells:\n  \"t\": terminal\n  \"x,,y\": broken\n");

        let result = CheckCommand::new(Some(path))
            .with_platform(Some(Platform::Linux))
            .execute()
            .await;
        assert!(matches!(result, Err(CliError::ValidationFailed { errors: 1 })));
    }

    #[tokio::test]
    async fn test_execute_accepts_clean_spellbook() {
        let dir = TempDir::new().unwrap();
        let path = spellbook(&dir, "spells:\n  \"g,s\": git_status\n  \"t\": terminal\n");

        let result = CheckCommand::new(Some(path))
            .with_platform(Some(Platform::Linux))
            .execute()
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let result = CheckCommand::new(Some(dir.path().join("nope.yml"))).report();
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_format_timeout() {
        assert_eq!(format_timeout(0), "disabled");
        assert_eq!(format_timeout(1000), "1000ms");
    }
}
