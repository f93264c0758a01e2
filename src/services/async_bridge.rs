//! Async Bridge: the channels that connect the engine loops
//!
//! Every loop runs on its own and owns its state. Loops talk to each other
//! only through the bounded channels created here:
//! - key tokens: input loop -> handler loop (drop when full)
//! - actions: input/signal loops -> handler loop
//! - engine events: signal/watch loops and search workers -> handler loop
//! - redraw pulses: anyone -> render loop (capacity 1, coalescing)
//! - errors: anyone -> render loop
//!
//! Shutdown is not a channel: it is the engine's shared cancellation token.

use crate::input::actions::Action;
use crate::input::key::KeyToken;
use crate::services::search::SearchToken;
use crate::view::PaneId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Capacity of the action channel
pub const ACTION_CHANNEL_CAPACITY: usize = 64;
/// Capacity of the engine event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 64;
/// Capacity of the error channel
pub const ERROR_CHANNEL_CAPACITY: usize = 64;

/// Messages for the handler loop that are not keys or actions
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Terminal size changed
    Resize,
    /// The process was continued after a suspend
    Resume,
    /// Repository structure changed: reload every view
    Reload,
    /// File content changed: refresh what depends on it
    StatusRefresh,
    /// A background search finished
    SearchResult {
        pane: PaneId,
        token: SearchToken,
        pattern: String,
        /// Matching row, `None` when nothing matched
        index: Option<usize>,
    },
}

/// Asks the render loop for a redraw.
///
/// Pulses go through a capacity-1 channel with `try_send`; a full channel
/// means a redraw is already pending, so extra pulses are simply dropped.
#[derive(Debug, Clone)]
pub struct RedrawRequester {
    tx: mpsc::Sender<()>,
    full: Arc<AtomicBool>,
}

impl RedrawRequester {
    pub fn request(&self) {
        match self.tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Closed(())) => tracing::trace!("redraw requested after shutdown"),
        }
    }

    /// Request a redraw that repaints the whole screen (after resize or resume).
    pub fn request_full(&self) {
        self.full.store(true, Ordering::SeqCst);
        self.request();
    }

    /// Whether a full repaint was requested since the last call.
    pub fn take_full(&self) -> bool {
        self.full.swap(false, Ordering::SeqCst)
    }
}

/// Sends recoverable errors to the render loop for display.
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    tx: mpsc::Sender<String>,
}

impl ErrorReporter {
    pub fn report(&self, error: impl std::fmt::Display) {
        let message = error.to_string();
        tracing::warn!("{}", message);
        match self.tx.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                tracing::warn!("Error channel full, dropping: {}", message)
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }
}

/// Sending halves, cloned into whichever loop needs them
#[derive(Debug, Clone)]
pub struct EngineSenders {
    pub keys: mpsc::Sender<KeyToken>,
    pub actions: mpsc::Sender<Action>,
    pub events: mpsc::Sender<EngineEvent>,
    pub redraw: RedrawRequester,
    pub errors: ErrorReporter,
}

/// Receiving halves, each moved into exactly one loop
#[derive(Debug)]
pub struct EngineReceivers {
    pub keys: mpsc::Receiver<KeyToken>,
    pub actions: mpsc::Receiver<Action>,
    pub events: mpsc::Receiver<EngineEvent>,
    pub redraw: mpsc::Receiver<()>,
    pub errors: mpsc::Receiver<String>,
}

/// Create every engine channel. `key_capacity` bounds the key channel.
pub fn channels(key_capacity: usize) -> (EngineSenders, EngineReceivers) {
    let (keys_tx, keys_rx) = mpsc::channel(key_capacity.max(1));
    let (actions_tx, actions_rx) = mpsc::channel(ACTION_CHANNEL_CAPACITY);
    let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (redraw_tx, redraw_rx) = mpsc::channel(1);
    let (errors_tx, errors_rx) = mpsc::channel(ERROR_CHANNEL_CAPACITY);

    let senders = EngineSenders {
        keys: keys_tx,
        actions: actions_tx,
        events: events_tx,
        redraw: RedrawRequester {
            tx: redraw_tx,
            full: Arc::new(AtomicBool::new(false)),
        },
        errors: ErrorReporter { tx: errors_tx },
    };
    let receivers = EngineReceivers {
        keys: keys_rx,
        actions: actions_rx,
        events: events_rx,
        redraw: redraw_rx,
        errors: errors_rx,
    };
    (senders, receivers)
}
