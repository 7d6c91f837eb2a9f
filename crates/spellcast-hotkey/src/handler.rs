//! Spell handlers invoked on successful recognition

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::models::SpellEvent;

/// Receives every recognized spell.
///
/// Each invocation runs on its own task; the recognition loop never waits for
/// it, and invocations are not serialized against each other.
#[async_trait]
pub trait SpellHandler: Send + Sync {
    async fn handle(&self, event: SpellEvent) -> anyhow::Result<()>;
}

/// Adapter turning a synchronous closure into a [`SpellHandler`]
///
/// ```rust
/// use spellcast_hotkey::{
///     FnHandler, Platform, PlatformResolver, SequenceParser, SpellEvent, SpellHandler,
/// };
///
/// # tokio_test::block_on(async {
/// let parser = SequenceParser::new(PlatformResolver::shared(Platform::Linux));
/// let handler = FnHandler::shared(|event: SpellEvent| {
///     println!("cast {}", event.spell);
///     Ok(())
/// });
///
/// let event = SpellEvent::new(parser.parse("g,s").unwrap(), "git_status");
/// assert!(handler.handle(event).await.is_ok());
/// # });
/// ```
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(SpellEvent) -> anyhow::Result<()> + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        FnHandler { f }
    }

    /// Wrap the closure in the shared form the engine takes
    pub fn shared(f: F) -> Arc<dyn SpellHandler> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F> SpellHandler for FnHandler<F>
where
    F: Fn(SpellEvent) -> anyhow::Result<()> + Send + Sync + 'static,
{
    async fn handle(&self, event: SpellEvent) -> anyhow::Result<()> {
        (self.f)(event)
    }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnHandler")
    }
}

/// Hand a recognized spell to the handler on a detached task.
///
/// Handler failures are logged, never propagated.
pub fn dispatch(handler: Arc<dyn SpellHandler>, event: SpellEvent) -> JoinHandle<()> {
    tokio::spawn(async move {
        let spell = event.spell.clone();
        let sequence = event.sequence.canonical();
        match handler.handle(event).await {
            Ok(()) => debug!(spell = %spell, sequence = %sequence, "Spell handler completed"),
            Err(e) => error!(spell = %spell, sequence = %sequence, error = %e, "Spell handler failed"),
        }
    })
}
