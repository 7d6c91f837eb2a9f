//! Recognition engine: the event loop around [`Recognizer`]
//!
//! Two sources are multiplexed into one sequential loop: the bounded raw key
//! queue and a periodic tick used only for timeout evaluation. The loop is the
//! sole owner of the recognizer, so recognition state needs no lock. The
//! registry is the only state shared with API callers.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::handler::{self, SpellHandler};
use crate::models::{Key, RawKeyEvent, SpellEvent};
use crate::parser::SequenceParser;
use crate::recognizer::{Recognition, Recognizer};
use crate::registry::SequenceRegistry;
use crate::resolver::KeyNameResolver;

pub const DEFAULT_PREFIX: &str = "alt+space";
pub const DEFAULT_PREFIX_TIMEOUT: Duration = Duration::from_millis(1000);
pub const DEFAULT_SEQUENCE_TIMEOUT: Duration = Duration::from_millis(2000);
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Engine settings; timeouts of zero are disabled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Descriptor of the single key combination that arms recognition
    pub prefix: String,
    /// Maximum time from prefix to the first following key
    pub prefix_timeout: Duration,
    /// Maximum time from prefix to a completed sequence
    pub sequence_timeout: Duration,
    /// How often timeouts are evaluated
    pub tick_interval: Duration,
    /// Capacity of the raw key queue
    pub queue_capacity: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            prefix: DEFAULT_PREFIX.to_string(),
            prefix_timeout: DEFAULT_PREFIX_TIMEOUT,
            sequence_timeout: DEFAULT_SEQUENCE_TIMEOUT,
            tick_interval: DEFAULT_TICK_INTERVAL,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Hotkey manager surface exposed to the rest of the application
pub trait HotkeyManager: Send + Sync {
    /// Begin recognizing; fails if already running
    fn start(&self) -> Result<(), EngineError>;

    /// Stop recognizing; fails if not running
    fn stop(&self) -> Result<(), EngineError>;

    fn is_running(&self) -> bool;

    /// Bind a descriptor to a spell after validation
    fn register(&self, descriptor: &str, spell: &str) -> Result<(), EngineError>;

    /// Remove a binding; never fails
    fn unregister(&self, descriptor: &str);

    /// Set the handler receiving recognized spells
    fn set_handler(&self, handler: Arc<dyn SpellHandler>);

    /// Snapshot of canonical sequence to spell name
    fn registered(&self) -> BTreeMap<String, String>;
}

/// Queued events carry the run generation that accepted them; `0` means
/// stopped.
type Stamped = (u64, RawKeyEvent);

/// Producer side of the raw key queue, handed to the keyboard hook.
///
/// Sending never blocks: when the queue is full, or the engine is stopped,
/// the event is dropped.
#[derive(Debug, Clone)]
pub struct KeyEventSender {
    tx: mpsc::Sender<Stamped>,
    generation: Arc<AtomicU64>,
}

impl KeyEventSender {
    /// Returns `false` if the event was dropped
    pub fn send(&self, event: RawKeyEvent) -> bool {
        let generation = self.generation.load(Ordering::Acquire);
        if generation == 0 {
            debug!(code = event.code, "Engine not running, ignoring key event");
            return false;
        }

        match self.tx.try_send((generation, event)) {
            Ok(()) => true,
            Err(TrySendError::Full((_, event))) => {
                warn!(code = event.code, "Event queue full, dropping key event");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

#[derive(Default)]
struct RunState {
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
    last_generation: u64,
}

type SharedHandler = Arc<RwLock<Option<Arc<dyn SpellHandler>>>>;

/// Real-time recognizer of prefix-armed key sequences
pub struct RecognitionEngine {
    options: EngineOptions,
    prefix: Key,
    registry: SequenceRegistry,
    handler: SharedHandler,
    sender: KeyEventSender,
    receiver: Arc<tokio::sync::Mutex<mpsc::Receiver<Stamped>>>,
    run: Mutex<RunState>,
}

impl RecognitionEngine {
    /// Build an engine; the prefix must parse to exactly one key combination
    pub fn new(options: EngineOptions, resolver: Arc<dyn KeyNameResolver>) -> Result<Self, EngineError> {
        let parser = SequenceParser::new(resolver);
        let prefix_seq = parser.parse(&options.prefix).map_err(EngineError::Prefix)?;
        if prefix_seq.len() != 1 {
            return Err(EngineError::MultiStepPrefix(prefix_seq.canonical()));
        }
        let prefix = prefix_seq.into_keys().remove(0);

        let (tx, rx) = mpsc::channel(options.queue_capacity.max(1));

        Ok(RecognitionEngine {
            options,
            prefix,
            registry: SequenceRegistry::new(parser),
            handler: Arc::new(RwLock::new(None)),
            sender: KeyEventSender {
                tx,
                generation: Arc::new(AtomicU64::new(0)),
            },
            receiver: Arc::new(tokio::sync::Mutex::new(rx)),
            run: Mutex::new(RunState::default()),
        })
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// The parsed prefix key
    pub fn prefix(&self) -> &Key {
        &self.prefix
    }

    pub fn parser(&self) -> &SequenceParser {
        self.registry.parser()
    }

    /// The shared registry; clones observe the same bindings
    pub fn registry(&self) -> &SequenceRegistry {
        &self.registry
    }

    /// A handle the keyboard hook uses to feed raw events
    pub fn event_sender(&self) -> KeyEventSender {
        self.sender.clone()
    }

    /// Check a binding without registering it
    pub fn validate(&self, descriptor: &str, spell: &str) -> Result<(), EngineError> {
        self.registry.validate(descriptor, spell)?;
        Ok(())
    }

    /// Stop and wait for the recognition loop to exit
    pub async fn shutdown(&self) -> Result<(), EngineError> {
        let task = {
            let mut run = self.lock_run();
            let cancel = run.cancel.take().ok_or(EngineError::NotRunning)?;
            self.sender.generation.store(0, Ordering::Release);
            cancel.cancel();
            run.task.take()
        };

        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Recognition loop ended abnormally");
            }
        }
        info!("Hotkey manager stopped");
        Ok(())
    }

    fn lock_run(&self) -> MutexGuard<'_, RunState> {
        self.run.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HotkeyManager for RecognitionEngine {
    fn start(&self) -> Result<(), EngineError> {
        let mut run = self.lock_run();
        if run.cancel.is_some() {
            return Err(EngineError::AlreadyRunning);
        }
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;

        debug!(
            prefix = %self.prefix,
            sequences = self.registry.len(),
            "Starting hotkey manager"
        );

        run.last_generation += 1;
        let generation = run.last_generation;

        let cancel = CancellationToken::new();
        let recognition_loop = RecognitionLoop {
            recognizer: Recognizer::new(
                self.prefix.clone(),
                self.options.prefix_timeout,
                self.options.sequence_timeout,
            ),
            registry: self.registry.clone(),
            handler: Arc::clone(&self.handler),
            receiver: Arc::clone(&self.receiver),
            tick_interval: self.options.tick_interval,
            generation,
            cancel: cancel.clone(),
        };

        self.sender.generation.store(generation, Ordering::Release);
        run.task = Some(runtime.spawn(recognition_loop.run()));
        run.cancel = Some(cancel);

        info!(prefix = %self.prefix, "Hotkey manager started");
        Ok(())
    }

    fn stop(&self) -> Result<(), EngineError> {
        let mut run = self.lock_run();
        let cancel = run.cancel.take().ok_or(EngineError::NotRunning)?;
        self.sender.generation.store(0, Ordering::Release);
        cancel.cancel();
        // the loop releases the queue as soon as it observes the cancellation
        run.task = None;

        info!("Hotkey manager stopped");
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.lock_run().cancel.is_some()
    }

    fn register(&self, descriptor: &str, spell: &str) -> Result<(), EngineError> {
        self.registry.register(descriptor, spell)?;
        Ok(())
    }

    fn unregister(&self, descriptor: &str) {
        self.registry.unregister(descriptor);
    }

    fn set_handler(&self, handler: Arc<dyn SpellHandler>) {
        *self.handler.write().unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    fn registered(&self) -> BTreeMap<String, String> {
        self.registry.get_registered()
    }
}

impl Drop for RecognitionEngine {
    fn drop(&mut self) {
        if let Some(cancel) = self.lock_run().cancel.take() {
            cancel.cancel();
        }
    }
}

/// State moved into the spawned processing task
struct RecognitionLoop {
    recognizer: Recognizer,
    registry: SequenceRegistry,
    handler: SharedHandler,
    receiver: Arc<tokio::sync::Mutex<mpsc::Receiver<Stamped>>>,
    tick_interval: Duration,
    generation: u64,
    cancel: CancellationToken,
}

impl RecognitionLoop {
    async fn run(mut self) {
        let cancel = self.cancel.clone();

        // a previous loop may still be releasing the queue after a restart
        let mut receiver = tokio::select! {
            _ = cancel.cancelled() => return,
            guard = Arc::clone(&self.receiver).lock_owned() => guard,
        };

        let mut ticker = tokio::time::interval(self.tick_interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,

                event = receiver.recv() => match event {
                    Some((generation, event)) if generation == self.generation => self.process(event),
                    Some(_) => debug!("Discarding key event queued before restart"),
                    None => break,
                },

                _ = ticker.tick() => {
                    self.recognizer.on_tick(Instant::now());
                }
            }
        }

        debug!(generation = self.generation, "Recognition loop exited");
    }

    fn process(&mut self, event: RawKeyEvent) {
        if !event.is_key_down() {
            return;
        }

        let parser = self.registry.parser();
        if parser.resolver().is_modifier_code(event.code) {
            return;
        }

        let Some(key) = parser.resolve_event(&event) else {
            debug!(code = event.code, "Dropping unresolvable key event");
            return;
        };
        debug!(key = %key, code = key.code, "Key pressed");

        if let Recognition::Matched(spell_event) = self.recognizer.on_key(key, Instant::now(), &self.registry) {
            self.dispatch(spell_event);
        }
    }

    fn dispatch(&self, event: SpellEvent) {
        let handler = self
            .handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        match handler {
            Some(handler) => {
                handler::dispatch(handler, event);
            }
            None => warn!(spell = %event.spell, "No spell handler set, dropping recognized spell"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use crate::models::Modifier;
    use crate::resolver::{Platform, PlatformResolver};

    fn engine() -> RecognitionEngine {
        RecognitionEngine::new(EngineOptions::default(), PlatformResolver::shared(Platform::Linux)).unwrap()
    }

    #[test]
    fn test_prefix_must_parse() {
        let options = EngineOptions {
            prefix: "hyper+space".to_string(),
            ..EngineOptions::default()
        };
        let result = RecognitionEngine::new(options, PlatformResolver::shared(Platform::Linux));
        assert!(matches!(result, Err(EngineError::Prefix(_))));
    }

    #[test]
    fn test_prefix_must_be_single_step() {
        let options = EngineOptions {
            prefix: "ctrl+a,b".to_string(),
            ..EngineOptions::default()
        };
        match RecognitionEngine::new(options, PlatformResolver::shared(Platform::Linux)) {
            Err(EngineError::MultiStepPrefix(prefix)) => assert_eq!(prefix, "ctrl+a,b"),
            _ => panic!("expected multi-step prefix error"),
        }
    }

    #[test]
    fn test_start_requires_runtime() {
        let engine = engine();
        assert!(matches!(engine.start(), Err(EngineError::NoRuntime)));
        assert!(!engine.is_running());
    }

    #[test]
    fn test_sender_rejects_while_stopped() {
        let engine = engine();
        let sender = engine.event_sender();
        assert!(!sender.send(RawKeyEvent::down(0x20, [Modifier::Alt])));
    }

    #[test]
    fn test_register_goes_through_registry() {
        let engine = engine();
        engine.register("g,s", "git_status").unwrap();
        assert!(matches!(
            engine.register("g", "git"),
            Err(EngineError::Registry(RegistryError::Validation(_)))
        ));
        assert!(engine.validate("h,s", "other").is_ok());

        engine.unregister("g,s");
        assert!(engine.registered().is_empty());
    }

    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        let engine = engine();
        engine.start().unwrap();
        assert!(engine.is_running());
        assert!(matches!(engine.start(), Err(EngineError::AlreadyRunning)));

        engine.stop().unwrap();
        assert!(!engine.is_running());
        assert!(matches!(engine.stop(), Err(EngineError::NotRunning)));
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_loop() {
        let engine = engine();
        engine.start().unwrap();
        engine.shutdown().await.unwrap();
        assert!(!engine.is_running());
        assert!(matches!(engine.shutdown().await, Err(EngineError::NotRunning)));
    }
}
