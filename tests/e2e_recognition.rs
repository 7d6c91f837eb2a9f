//! End-to-end: spellbook file on disk through a running engine to dispatched spells

use std::fs;
use std::time::Duration;

use spellcast_cli::commands::SimulateCommand;
use spellcast_hotkey::*;
use tempfile::TempDir;
use tokio::sync::mpsc;

const SPELLBOOK: &str = r#"
hotkeys:
  prefix: "ctrl+a"
  timeout: 1000
  sequence_timeout: 2000
spells:
  "x,y": demo
  "g,s": git_status
  "t": terminal
"#;

fn write_spellbook(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("spellbook.yml");
    fs::write(&path, SPELLBOOK).expect("Failed to write spellbook");
    path
}

fn press(engine: &RecognitionEngine, steps: &[&str]) {
    let sender = engine.event_sender();
    for step in steps {
        let key = engine.parser().parse_key(step).unwrap();
        assert!(sender.send(RawKeyEvent::from(&key)));
    }
}

/// Load a spellbook, run the engine, and cast every spell it defines
#[tokio::test(start_paused = true)]
async fn test_spellbook_to_dispatch() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_spellbook(&temp_dir);

    let config = SpellcastConfig::load(&path).unwrap();
    let resolver = PlatformResolver::shared(Platform::Linux);
    assert!(config.validate(&resolver).is_empty());

    let engine = RecognitionEngine::from_config(&config, resolver).unwrap();
    assert_eq!(engine.registered().len(), 3);

    let (tx, mut rx) = mpsc::unbounded_channel();
    engine.set_handler(FnHandler::shared(move |event: SpellEvent| {
        tx.send(event)?;
        Ok(())
    }));
    engine.start().unwrap();

    press(&engine, &["ctrl+a", "x", "y"]);
    press(&engine, &["ctrl+a", "t"]);
    press(&engine, &["ctrl+a", "g", "s"]);

    let mut spells = Vec::new();
    for _ in 0..3 {
        let event = tokio::time::timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("spell dispatched")
            .expect("channel open");
        spells.push(event.spell);
    }
    assert_eq!(spells, vec!["demo", "terminal", "git_status"]);

    engine.shutdown().await.unwrap();
    assert!(!engine.is_running());
}

/// Conflicting spellbooks are reported by validation and refused by the engine
#[tokio::test]
async fn test_conflicting_spellbook_is_refused() {
    let mut config = SpellcastConfig::default();
    config.spells.insert("g".to_string(), "git".to_string());
    config.spells.insert("g,s".to_string(), "git_status".to_string());

    let resolver = PlatformResolver::shared(Platform::Linux);
    let issues = config.validate(&resolver);
    assert_eq!(issues.iter().filter(|i| i.is_error()).count(), 1);

    let result = RecognitionEngine::from_config(&config, resolver);
    assert!(matches!(result, Err(ConfigError::Spell { .. })));
}

/// The CLI rehearsal path reads the same spellbook
#[tokio::test(start_paused = true)]
async fn test_simulate_command_with_spellbook() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_spellbook(&temp_dir);

    let events = SimulateCommand::new(vec!["ctrl+a,x,y".to_string(), "ctrl+a".to_string(), "t".to_string()])
        .with_config(Some(path))
        .with_platform(Some(Platform::Linux))
        .run()
        .await
        .unwrap();

    let spells: Vec<_> = events.iter().map(|e| e.spell.as_str()).collect();
    assert_eq!(spells, vec!["demo", "terminal"]);
}
