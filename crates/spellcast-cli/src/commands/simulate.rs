// Feed a key stream through a live engine and report the spells cast

use std::path::PathBuf;
use std::time::Duration;

use spellcast_hotkey::{
    FnHandler, HotkeyManager, Platform, RawKeyEvent, RecognitionEngine, SequenceParser, SpellEvent,
    SpellcastConfig,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{load_config, resolver_for, Command};
use crate::error::CliResult;
use crate::output::OutputStyle;

pub const DEFAULT_DELAY_MS: u64 = 50;
pub const DEFAULT_WAIT_MS: u64 = 500;

/// Simulate key presses against a spellbook.
///
/// Each step is a descriptor; comma-separated steps are pressed in order, so
/// `alt+space g,s` and `alt+space g s` are the same stream.
pub struct SimulateCommand {
    config: Option<PathBuf>,
    inline: Option<SpellcastConfig>,
    platform: Option<Platform>,
    delay: Duration,
    wait: Duration,
    steps: Vec<String>,
}

impl SimulateCommand {
    pub fn new(steps: Vec<String>) -> Self {
        Self {
            config: None,
            inline: None,
            platform: None,
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            wait: Duration::from_millis(DEFAULT_WAIT_MS),
            steps,
        }
    }

    pub fn with_config(mut self, config: Option<PathBuf>) -> Self {
        self.config = config;
        self
    }

    /// Use an in-memory spellbook instead of loading one
    pub fn with_spellbook(mut self, config: SpellcastConfig) -> Self {
        self.inline = Some(config);
        self
    }

    pub fn with_platform(mut self, platform: Option<Platform>) -> Self {
        self.platform = platform;
        self
    }

    /// Pause between consecutive key presses
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Time to keep the engine running after the last press
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    /// Run the simulation and return every dispatched spell in order
    pub async fn run(&self) -> CliResult<Vec<SpellEvent>> {
        let config = match &self.inline {
            Some(config) => config.clone(),
            None => load_config(self.config.as_deref())?,
        };
        let resolver = resolver_for(self.platform);

        // resolve every step before touching the engine
        let parser = SequenceParser::new(resolver.clone());
        let mut keys = Vec::new();
        for step in &self.steps {
            keys.extend(parser.parse(step)?.into_keys());
        }

        let engine = RecognitionEngine::from_config(&config, resolver)?;
        let (tx, mut rx) = mpsc::unbounded_channel();
        engine.set_handler(FnHandler::shared(move |event: SpellEvent| {
            tx.send(event)?;
            Ok(())
        }));
        engine.start()?;

        let sender = engine.event_sender();
        for (idx, key) in keys.iter().enumerate() {
            if idx > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            debug!(key = %key, "Simulating key press");
            if !sender.send(RawKeyEvent::from(key)) {
                warn!(key = %key, "Simulated key press dropped");
            }
        }

        tokio::time::sleep(self.wait).await;
        engine.shutdown().await?;

        // handler tasks may still be finishing
        tokio::task::yield_now().await;
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        Ok(events)
    }
}

#[async_trait::async_trait]
impl Command for SimulateCommand {
    async fn execute(&self) -> CliResult<()> {
        let style = OutputStyle::default();
        let events = self.run().await?;

        for event in &events {
            println!(
                "{} {} → {}",
                event.timestamp.format("%H:%M:%S%.3f"),
                style.code(&event.sequence.canonical()),
                style.header(&event.spell)
            );
        }

        if events.is_empty() {
            println!("{}", style.warning("No spell was cast"));
        } else {
            println!("{}", style.success(&format!("{} spell(s) cast", events.len())));
        }
        Ok(())
    }
}
