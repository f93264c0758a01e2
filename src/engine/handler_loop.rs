//! The handler loop: sole consumer of keys, actions and engine events, and
//! the only code that mutates the dashboard. Resolution itself happens in
//! [`InputSession`]; this loop feeds it and carries out what each step asks
//! for.

use super::session::{InputSession, StepOutcome};
use super::{PromptControl, SuspendHook};
use crate::app::{lock, SharedDashboard};
use crate::error::EngineError;
use crate::input::actions::Action;
use crate::input::key::KeyToken;
use crate::services::async_bridge::{EngineEvent, EngineSenders};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Whether the loop keeps going after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub(super) struct HandlerLoop {
    pub dashboard: SharedDashboard,
    pub session: InputSession,
    pub senders: EngineSenders,
    pub keys: mpsc::Receiver<KeyToken>,
    pub actions: mpsc::Receiver<Action>,
    pub events: mpsc::Receiver<EngineEvent>,
    pub cancel: CancellationToken,
    pub prompt: Arc<PromptControl>,
    pub suspend: Option<SuspendHook>,
}

impl HandlerLoop {
    pub async fn run(mut self) -> Result<(), EngineError> {
        tracing::debug!("Handler loop started");
        let result = self.run_steps().await;
        // Exiting for any reason stops every other loop
        self.cancel.cancel();
        tracing::debug!("Handler loop stopped");
        result
    }

    async fn run_steps(&mut self) -> Result<(), EngineError> {
        loop {
            let prompting = self.session.is_prompting();
            let step = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(()),
                _ = self.prompt.cancel.notified(), if prompting => {
                    tracing::debug!("Prompt cancelled by signal");
                    let mut dashboard = lock(&self.dashboard);
                    self.session
                        .cancel_prompt(&mut dashboard)
                        .map(Option::unwrap_or_default)
                }
                Some(token) = self.keys.recv() => {
                    tracing::trace!("key {}", token);
                    let mut dashboard = lock(&self.dashboard);
                    self.session.feed_keys(&mut dashboard, [token])
                }
                // Outside actions wait while a prompt reads keys
                Some(action) = self.actions.recv(), if !prompting => {
                    let mut dashboard = lock(&self.dashboard);
                    self.session.dispatch(&mut dashboard, action)
                }
                Some(event) = self.events.recv() => self.on_event(event),
                else => return Ok(()),
            };
            self.prompt.set_active(self.session.is_prompting());

            match step.map(|out| self.carry_out(out)) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => {
                    tracing::info!("Exit requested");
                    return Ok(());
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    self.senders.errors.report(e);
                    self.senders.redraw.request();
                }
            }
        }
    }

    /// Act on what a step left for the engine.
    fn carry_out(&mut self, out: StepOutcome) -> Flow {
        for error in out.errors {
            self.senders.errors.report(error);
        }
        for _ in 0..out.suspends {
            self.suspend();
        }
        if out.redraw {
            self.senders.redraw.request();
        }
        if out.exit {
            Flow::Exit
        } else {
            Flow::Continue
        }
    }

    fn suspend(&mut self) {
        let Some(hook) = self.suspend.as_mut() else {
            tracing::debug!("Suspend is not available");
            return;
        };
        if let Err(e) = hook() {
            self.senders
                .errors
                .report(format!("Suspend failed: {e}"));
        }
        self.senders.redraw.request_full();
    }

    fn on_event(&mut self, event: EngineEvent) -> Result<StepOutcome, EngineError> {
        let mut dashboard = lock(&self.dashboard);
        match event {
            EngineEvent::Resize | EngineEvent::Resume => {
                self.senders.redraw.request_full();
                Ok(StepOutcome::default())
            }
            EngineEvent::Reload => {
                tracing::info!("Repository changed, reloading");
                self.session.apply(&mut dashboard, |dashboard, ctx| {
                    ctx.request_redraw();
                    dashboard.reload_all(ctx)
                })
            }
            EngineEvent::StatusRefresh => self.session.apply(&mut dashboard, |dashboard, ctx| {
                ctx.request_redraw();
                dashboard.refresh_all(ctx)
            }),
            EngineEvent::SearchResult {
                pane,
                token,
                pattern,
                index,
            } => self.session.apply(&mut dashboard, |dashboard, ctx| {
                dashboard.on_search_result(pane, token, &pattern, index, ctx);
                Ok(())
            }),
        }
    }
}
