use std::fs;
use std::time::Duration;

use spellcast_hotkey::*;
use tempfile::TempDir;

const SPELLBOOK: &str = r#"
hotkeys:
  prefix: "ctrl+a"
  timeout: 750
  sequence_timeout: 1500
spells:
  "g,s": git_status
  "G,P": git_push
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

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = write_spellbook(&dir, SPELLBOOK);

        let config = SpellcastConfig::load(&path).unwrap();
        assert_eq!(config.hotkeys.prefix, "ctrl+a");
        assert_eq!(config.hotkeys.timeout, 750);
        assert_eq!(config.hotkeys.sequence_timeout, 1500);
        assert_eq!(config.spells.len(), 3);
        assert!(config
            .validate(&PlatformResolver::shared(Platform::Linux))
            .is_empty());
    }

    #[test]
    fn test_engine_from_loaded_config() {
        let dir = TempDir::new().unwrap();
        let config = SpellcastConfig::load(write_spellbook(&dir, SPELLBOOK)).unwrap();

        let engine =
            RecognitionEngine::from_config(&config, PlatformResolver::shared(Platform::Linux)).unwrap();
        assert_eq!(engine.prefix().to_string(), "ctrl+a");
        assert_eq!(engine.options().prefix_timeout, Duration::from_millis(750));
        assert_eq!(engine.options().sequence_timeout, Duration::from_millis(1500));

        let registered = engine.registered();
        assert_eq!(registered["g,p"], "git_push");
        assert_eq!(registered["g,s"], "git_status");
        assert_eq!(registered["t"], "terminal");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = SpellcastConfig::load(dir.path().join("absent.yml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_malformed_yaml_is_yaml_error() {
        let dir = TempDir::new().unwrap();
        let path = write_spellbook(&dir, "hotkeys: [not, a, map]\n");
        assert!(matches!(SpellcastConfig::load(path), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_bad_prefix_fails_engine_construction() {
        let config = SpellcastConfig::from_yaml_str("hotkeys:\n  prefix: \"ctrl+a,b\"\n").unwrap();
        let result = RecognitionEngine::from_config(&config, PlatformResolver::shared(Platform::Linux));
        assert!(matches!(
            result,
            Err(ConfigError::Engine(EngineError::MultiStepPrefix(_)))
        ));
    }

    #[test]
    fn test_conflicting_spells_reported() {
        let config = SpellcastConfig::from_yaml_str(
            "spells:\n  \"g\": git\n  \"g,s\": git_status\n  \"t\": terminal\n",
        )
        .unwrap();

        let issues = config.validate(&PlatformResolver::shared(Platform::Linux));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].field, "spells.g,s");
        assert_eq!(
            issues[0].message,
            "sequence conflicts with shorter sequence 'g' (spell: git)"
        );
        assert!(issues[0].suggestion.is_some());
    }

    #[test]
    fn test_platform_specific_validation() {
        let config = SpellcastConfig::from_yaml_str("spells:\n  \"cmd+k\": palette\n").unwrap();

        assert!(config
            .validate(&PlatformResolver::shared(Platform::MacOs))
            .is_empty());

        let issues = config.validate(&PlatformResolver::shared(Platform::Windows));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("unknown modifier: cmd"));
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = SpellcastConfig::from_yaml_str(SPELLBOOK).unwrap();
        let yaml = config.to_yaml_string().unwrap();
        assert_eq!(SpellcastConfig::from_yaml_str(&yaml).unwrap(), config);
    }
}
