//! Terminal input on a dedicated thread.
//!
//! Polls with a short timeout so the cancellation token is re-checked at
//! every wake. Keys go to the bounded key channel with `try_send`; a full
//! channel drops the key.

use crate::app::MouseTranslator;
use crate::error::EngineError;
use crate::input::actions::Action;
use crate::input::key::KeyToken;
use crate::services::async_bridge::EngineEvent;
use crossterm::event::{Event, KeyEventKind};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

/// How long one poll waits before checking for shutdown
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Source of terminal events.
pub trait TerminalEvents: Send {
    /// Whether an event is ready within `timeout`.
    fn poll(&mut self, timeout: Duration) -> io::Result<bool>;

    fn read(&mut self) -> io::Result<Event>;
}

/// The real terminal
#[derive(Debug, Default)]
pub struct CrosstermEvents;

impl TerminalEvents for CrosstermEvents {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        crossterm::event::poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        crossterm::event::read()
    }
}

pub(super) struct InputLoop {
    pub source: Box<dyn TerminalEvents>,
    pub keys: mpsc::Sender<KeyToken>,
    pub actions: mpsc::Sender<Action>,
    pub events: mpsc::Sender<EngineEvent>,
    pub cancel: CancellationToken,
    pub mouse: bool,
}

impl InputLoop {
    pub fn run(mut self) -> Result<(), EngineError> {
        tracing::debug!("Input loop started");
        let mut translator = MouseTranslator::new();

        while !self.cancel.is_cancelled() {
            if !self.source.poll(POLL_INTERVAL)? {
                continue;
            }
            match self.source.read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    let Some(token) = KeyToken::from_key_event(&key) else {
                        tracing::trace!("Unmapped key {:?}", key);
                        continue;
                    };
                    match self.keys.try_send(token) {
                        Ok(()) => {}
                        Err(TrySendError::Full(token)) => {
                            tracing::warn!("Key channel full, dropping {}", token)
                        }
                        Err(TrySendError::Closed(_)) => break,
                    }
                }
                Event::Mouse(event) if self.mouse => {
                    for action in translator.translate(&event, Instant::now()) {
                        if let Err(TrySendError::Full(action)) = self.actions.try_send(action) {
                            tracing::warn!("Action channel full, dropping {}", action.action_type.name());
                        }
                    }
                }
                Event::Resize(width, height) => {
                    tracing::debug!("Resize to {}x{}", width, height);
                    if self.events.try_send(EngineEvent::Resize).is_err() {
                        tracing::warn!("Event channel full, dropping resize");
                    }
                }
                _ => {}
            }
        }
        tracing::debug!("Input loop stopped");
        Ok(())
    }
}
