//! The engine: independent loops around one shared dashboard.
//!
//! - input loop (OS thread): terminal events to key tokens and actions
//! - handler loop: key resolution, routing, prompts, engine events
//! - render loop: debounced redraws and the error surface
//! - signal loop (unix): process signals to exit, suspend, resume, resize
//! - watch loop: repository changes to reload and refresh events
//!
//! Loops talk over the channels in [`crate::services::async_bridge`] and
//! stop together on one [`CancellationToken`]. [`Engine::run`] joins every
//! loop before returning.

mod handler_loop;
mod input_loop;
mod render_loop;
mod session;
#[cfg(unix)]
mod signal_loop;
mod watch_loop;

pub use input_loop::{CrosstermEvents, TerminalEvents, POLL_INTERVAL};
pub use session::{InputSession, StepOutcome};

use crate::app::{Dashboard, SharedDashboard};
use crate::config::Config;
use crate::error::EngineError;
use crate::input::actions::Action;
use crate::input::key::{KeySequence, KeyToken};
use crate::input::keybindings::KeyBindingRegistry;
use crate::model::repository::Repository;
use crate::services::async_bridge::{channels, EngineEvent, EngineReceivers, EngineSenders};
use crate::services::search::SearchEngine;
use crate::view::prompt::PromptHistories;
use crate::view::surface::RenderBackend;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Called on suspend; returns once the process is continued.
pub type SuspendHook = Box<dyn FnMut() -> std::io::Result<()> + Send>;

/// Timing and capacity settings for the loops
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub debounce: Duration,
    pub error_batch: Duration,
    pub min_error_display: Duration,
    pub key_channel_capacity: usize,
    pub max_remap_depth: usize,
    pub mouse: bool,
    /// Install process signal handlers
    pub signals: bool,
    /// Watch this repository for changes
    pub watch: Option<WatchOptions>,
}

#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub repo: Arc<Repository>,
    pub debounce: Duration,
}

impl EngineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            debounce: config.render.debounce(),
            error_batch: config.render.error_batch(),
            min_error_display: config.render.min_error_display(),
            key_channel_capacity: config.input.key_channel_capacity,
            max_remap_depth: config.input.max_remap_depth,
            mouse: config.input.mouse,
            signals: true,
            watch: None,
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// State shared with the signal loop so SIGTSTP can cancel a running
/// prompt instead of suspending.
#[derive(Debug, Default)]
pub struct PromptControl {
    active: AtomicBool,
    cancel: Notify,
}

impl PromptControl {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    /// Cancel the running prompt, if any.
    pub fn cancel(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.cancel.notify_one();
        true
    }
}

/// A handle for feeding and stopping a running engine from outside.
#[derive(Clone)]
pub struct EngineHandle {
    senders: EngineSenders,
    cancel: CancellationToken,
    dashboard: SharedDashboard,
    prompt: Arc<PromptControl>,
}

impl EngineHandle {
    /// Queue the tokens of a textual key sequence such as `"gg<Enter>"`.
    pub async fn send_keys(&self, keys: &str) {
        for token in KeySequence::parse(keys).into_tokens() {
            self.send_key(token).await;
        }
    }

    pub async fn send_key(&self, token: KeyToken) {
        if self.senders.keys.send(token).await.is_err() {
            tracing::trace!("key sent after shutdown");
        }
    }

    pub async fn send_action(&self, action: Action) {
        if self.senders.actions.send(action).await.is_err() {
            tracing::trace!("action sent after shutdown");
        }
    }

    pub async fn send_event(&self, event: EngineEvent) {
        if self.senders.events.send(event).await.is_err() {
            tracing::trace!("event sent after shutdown");
        }
    }

    /// Report a recoverable error for display.
    pub fn report_error(&self, error: impl std::fmt::Display) {
        self.senders.errors.report(error);
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn dashboard(&self) -> &SharedDashboard {
        &self.dashboard
    }

    pub fn prompt(&self) -> &PromptControl {
        &self.prompt
    }
}

pub struct Engine {
    dashboard: SharedDashboard,
    registry: KeyBindingRegistry,
    histories: PromptHistories,
    options: EngineOptions,
    senders: EngineSenders,
    receivers: EngineReceivers,
    cancel: CancellationToken,
    prompt: Arc<PromptControl>,
    input: Option<Box<dyn TerminalEvents>>,
    suspend: Option<SuspendHook>,
}

impl Engine {
    pub fn new(
        dashboard: Dashboard,
        registry: KeyBindingRegistry,
        histories: PromptHistories,
        options: EngineOptions,
    ) -> Self {
        let (senders, receivers) = channels(options.key_channel_capacity);
        Self {
            dashboard: dashboard.share(),
            registry,
            histories,
            options,
            senders,
            receivers,
            cancel: CancellationToken::new(),
            prompt: Arc::new(PromptControl::default()),
            input: None,
            suspend: None,
        }
    }

    /// Read terminal input from `events` on a dedicated thread.
    pub fn with_input(mut self, events: Box<dyn TerminalEvents>) -> Self {
        self.input = Some(events);
        self
    }

    pub fn with_suspend_hook(mut self, hook: SuspendHook) -> Self {
        self.suspend = Some(hook);
        self
    }

    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            senders: self.senders.clone(),
            cancel: self.cancel.clone(),
            dashboard: self.dashboard.clone(),
            prompt: self.prompt.clone(),
        }
    }

    /// Run every loop until exit. Returns the first error a loop stopped
    /// with, after all loops have finished.
    pub async fn run<B>(self, backend: B) -> Result<(), EngineError>
    where
        B: RenderBackend + 'static,
    {
        let Engine {
            dashboard,
            registry,
            histories,
            options,
            senders,
            receivers,
            cancel,
            prompt,
            input,
            suspend,
        } = self;
        let EngineReceivers {
            keys,
            actions,
            events,
            redraw,
            errors,
        } = receivers;

        tracing::info!("Engine starting");
        let mut tasks: JoinSet<Result<(), EngineError>> = JoinSet::new();

        let search = SearchEngine::new(tokio::runtime::Handle::current(), senders.events.clone());
        let session =
            InputSession::new(registry, options.max_remap_depth, histories).with_search(search);
        let handler = handler_loop::HandlerLoop {
            dashboard: dashboard.clone(),
            session,
            senders: senders.clone(),
            keys,
            actions,
            events,
            cancel: cancel.clone(),
            prompt: prompt.clone(),
            suspend,
        };
        tasks.spawn(handler.run());

        let renderer = render_loop::RenderLoop {
            backend,
            dashboard,
            redraw_rx: redraw,
            errors_rx: errors,
            redraw: senders.redraw.clone(),
            debounce: options.debounce,
            error_batch: options.error_batch,
            min_error_display: options.min_error_display,
            cancel: cancel.clone(),
        };
        tasks.spawn(renderer.run());

        if let Some(source) = input {
            let input_loop = input_loop::InputLoop {
                source,
                keys: senders.keys.clone(),
                actions: senders.actions.clone(),
                events: senders.events.clone(),
                cancel: cancel.clone(),
                mouse: options.mouse,
            };
            tasks.spawn_blocking(move || input_loop.run());
        }

        #[cfg(unix)]
        if options.signals {
            tasks.spawn(signal_loop::run(
                senders.actions.clone(),
                senders.events.clone(),
                cancel.clone(),
                prompt.clone(),
            ));
        }

        if let Some(watch) = options.watch.clone() {
            tasks.spawn(watch_loop::run(
                watch.repo,
                watch.debounce,
                senders.events.clone(),
                senders.errors.clone(),
                cancel.clone(),
            ));
        }

        // First frame
        senders.redraw.request_full();

        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            // Whichever loop stops first takes the others down with it
            cancel.cancel();
            let result = match joined {
                Ok(result) => result,
                Err(e) => Err(EngineError::runtime(format!("Engine task failed: {e}"))),
            };
            if let Err(e) = result {
                tracing::error!("Engine loop stopped: {}", e);
                first_error.get_or_insert(e);
            }
        }
        tracing::info!("Engine stopped");

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
