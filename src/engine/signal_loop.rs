//! Process signals.
//!
//! SIGINT, SIGTERM and SIGHUP stop the engine. SIGTSTP cancels a running
//! prompt, or suspends when there is none. SIGCONT and SIGWINCH force a full
//! repaint.

use super::PromptControl;
use crate::error::EngineError;
use crate::input::actions::{Action, ActionType};
use crate::services::async_bridge::EngineEvent;
use nix::sys::signal::Signal;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub(super) async fn run(
    actions: mpsc::Sender<Action>,
    events: mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
    prompt: Arc<PromptControl>,
) -> Result<(), EngineError> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;
    let mut stop = signal(SignalKind::from_raw(Signal::SIGTSTP as i32))?;
    let mut cont = signal(SignalKind::from_raw(Signal::SIGCONT as i32))?;
    let mut winch = signal(SignalKind::window_change())?;
    tracing::info!("Signal handlers installed");

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interrupt.recv() => {
                tracing::info!("SIGINT received, exiting");
                cancel.cancel();
            }
            _ = terminate.recv() => {
                tracing::info!("SIGTERM received, exiting");
                cancel.cancel();
            }
            _ = hangup.recv() => {
                tracing::info!("SIGHUP received, exiting");
                cancel.cancel();
            }
            _ = stop.recv() => {
                if prompt.cancel() {
                    tracing::debug!("SIGTSTP cancels the prompt");
                } else if actions.send(Action::new(ActionType::Suspend)).await.is_err() {
                    break;
                }
            }
            _ = cont.recv() => {
                if events.send(EngineEvent::Resume).await.is_err() {
                    break;
                }
            }
            _ = winch.recv() => {
                if events.send(EngineEvent::Resize).await.is_err() {
                    break;
                }
            }
        }
    }
    Ok(())
}
