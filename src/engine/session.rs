//! Synchronous key resolution and routing.
//!
//! An [`InputSession`] owns the binding registry, the input buffer and the
//! open prompt. Each step resolves whatever is buffered against the
//! dashboard, routes the resulting actions and feeds an open prompt, until
//! the buffer runs dry or waits for more keys. The handler loop calls it
//! for every key, action and engine event; effects that leave the
//! dashboard (exit, suspend, errors, redraws) come back in a
//! [`StepOutcome`].

use crate::app::{Dashboard, RouteOutcome};
use crate::commands;
use crate::error::EngineError;
use crate::input::actions::Action;
use crate::input::buffer::{InputBuffer, Resolution};
use crate::input::handler::ActionContext;
use crate::input::key::KeyToken;
use crate::input::keybindings::KeyBindingRegistry;
use crate::services::search::SearchEngine;
use crate::view::prompt::{LinePrompt, PromptHistories, PromptKind, PromptOutcome};
use std::collections::VecDeque;

/// What a step asks of its caller.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub exit: bool,
    /// Number of suspend requests, in order of arrival
    pub suspends: usize,
    /// Recoverable errors for the error surface
    pub errors: Vec<String>,
    pub redraw: bool,
}

pub struct InputSession {
    registry: KeyBindingRegistry,
    buffer: InputBuffer,
    histories: PromptHistories,
    search: Option<SearchEngine>,
    prompt: Option<LinePrompt>,
    /// Actions waiting behind an open prompt
    queue: VecDeque<Action>,
}

impl InputSession {
    pub fn new(
        registry: KeyBindingRegistry,
        max_remap_depth: usize,
        histories: PromptHistories,
    ) -> Self {
        Self {
            registry,
            buffer: InputBuffer::new(max_remap_depth),
            histories,
            search: None,
            prompt: None,
            queue: VecDeque::new(),
        }
    }

    /// Run searches on `search` instead of inline.
    pub fn with_search(mut self, search: SearchEngine) -> Self {
        self.search = Some(search);
        self
    }

    pub fn registry(&self) -> &KeyBindingRegistry {
        &self.registry
    }

    pub fn histories(&self) -> &PromptHistories {
        &self.histories
    }

    pub fn is_prompting(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn prompt_kind(&self) -> Option<PromptKind> {
        self.prompt.as_ref().map(LinePrompt::kind)
    }

    pub fn pending_keys(&self) -> String {
        self.buffer.pending_keys().to_string()
    }

    pub fn context(&self) -> ActionContext {
        ActionContext::with_search(self.search.clone())
    }

    /// Append `tokens` and resolve.
    pub fn feed_keys(
        &mut self,
        dashboard: &mut Dashboard,
        tokens: impl IntoIterator<Item = KeyToken>,
    ) -> Result<StepOutcome, EngineError> {
        self.buffer.append(tokens);
        self.resolve_keys(dashboard)
    }

    /// Append keys in binding notation, e.g. `gg` or `/main<Enter>`, and
    /// resolve.
    pub fn feed_raw(
        &mut self,
        dashboard: &mut Dashboard,
        keys: &str,
    ) -> Result<StepOutcome, EngineError> {
        self.buffer.append_raw(keys);
        self.resolve_keys(dashboard)
    }

    /// Route `action` and everything it leads to.
    pub fn dispatch(
        &mut self,
        dashboard: &mut Dashboard,
        action: Action,
    ) -> Result<StepOutcome, EngineError> {
        self.queue.push_back(action);
        let mut out = StepOutcome::default();
        self.drive(dashboard, &mut out)?;
        Ok(out)
    }

    /// Let `apply` change the dashboard, then route what it deferred.
    pub fn apply<F>(
        &mut self,
        dashboard: &mut Dashboard,
        apply: F,
    ) -> Result<StepOutcome, EngineError>
    where
        F: FnOnce(&mut Dashboard, &mut ActionContext) -> Result<(), EngineError>,
    {
        let mut out = StepOutcome::default();
        let mut ctx = self.context();
        let result = apply(dashboard, &mut ctx);
        self.settle(dashboard, &mut ctx, &mut out);
        self.drive(dashboard, &mut out)?;
        result.map(|()| out)
    }

    /// Close the open prompt without submitting it. Returns `None` when no
    /// prompt was open.
    pub fn cancel_prompt(
        &mut self,
        dashboard: &mut Dashboard,
    ) -> Result<Option<StepOutcome>, EngineError> {
        if self.prompt.is_none() {
            return Ok(None);
        }
        let mut out = StepOutcome::default();
        self.close_prompt(dashboard, PromptOutcome::Cancelled, &mut out);
        self.drive(dashboard, &mut out)?;
        Ok(Some(out))
    }

    fn resolve_keys(&mut self, dashboard: &mut Dashboard) -> Result<StepOutcome, EngineError> {
        let mut out = StepOutcome {
            redraw: true,
            ..StepOutcome::default()
        };
        let result = self.drive(dashboard, &mut out);
        let pending = self.buffer.pending_keys().to_string();
        dashboard.status_bar_mut().set_pending_keys(pending);
        result.map(|()| out)
    }

    fn drive(
        &mut self,
        dashboard: &mut Dashboard,
        out: &mut StepOutcome,
    ) -> Result<(), EngineError> {
        let result = self.run(dashboard, out);
        if result.is_err() {
            self.queue.clear();
        }
        result
    }

    fn run(
        &mut self,
        dashboard: &mut Dashboard,
        out: &mut StepOutcome,
    ) -> Result<(), EngineError> {
        loop {
            if out.exit {
                self.buffer.clear();
                self.queue.clear();
                return Ok(());
            }
            if self.prompt.is_some() {
                if !self.feed_prompt(dashboard, out) {
                    // Waiting for more keys
                    return Ok(());
                }
                continue;
            }
            if let Some(action) = self.queue.pop_front() {
                self.route(dashboard, action, out)?;
                continue;
            }

            match self.buffer.process(&self.registry, &dashboard.active_hierarchy()) {
                Resolution::Empty | Resolution::Pending => return Ok(()),
                Resolution::Action(action) => self.queue.push_back(action),
                Resolution::Literal(keys) => {
                    let mut ctx = self.context();
                    dashboard.handle_key_press(&keys, &mut ctx)?;
                    self.settle(dashboard, &mut ctx, out);
                }
                Resolution::RemapLimitExceeded(keys) => {
                    let message = format!("Remap limit exceeded for {keys}, input discarded");
                    tracing::warn!("{}", message);
                    dashboard.set_status(message.clone());
                    out.errors.push(message);
                    out.redraw = true;
                }
            }
        }
    }

    fn route(
        &mut self,
        dashboard: &mut Dashboard,
        action: Action,
        out: &mut StepOutcome,
    ) -> Result<(), EngineError> {
        let mut ctx = self.context();
        let outcome = dashboard.dispatch(action, &self.registry, &mut ctx)?;
        self.settle(dashboard, &mut ctx, out);

        match outcome {
            RouteOutcome::Handled => {}
            RouteOutcome::Exit => out.exit = true,
            RouteOutcome::Suspend => out.suspends += 1,
            RouteOutcome::Prompt(kind) => {
                let prompt = LinePrompt::new(kind, self.histories.get(kind));
                dashboard.begin_prompt(&prompt);
                self.prompt = Some(prompt);
                out.redraw = true;
            }
        }
        Ok(())
    }

    /// Apply what handlers left in `ctx`; deferred actions join the queue.
    fn settle(
        &mut self,
        dashboard: &mut Dashboard,
        ctx: &mut ActionContext,
        out: &mut StepOutcome,
    ) {
        if let Some(message) = ctx.status_message.take() {
            dashboard.set_status(message);
            ctx.redraw = true;
        }
        out.redraw |= ctx.redraw;
        self.queue.extend(ctx.take_deferred());
    }

    /// Feed buffered keys to the open prompt. Returns false while it waits
    /// for more.
    fn feed_prompt(&mut self, dashboard: &mut Dashboard, out: &mut StepOutcome) -> bool {
        let Some(prompt) = self.prompt.as_mut() else {
            return true;
        };
        let outcome = loop {
            let Some(token) = self.buffer.take_next() else {
                return false;
            };
            match prompt.feed(&token) {
                PromptOutcome::Continue => {
                    dashboard.update_prompt(prompt);
                    out.redraw = true;
                }
                done => break done,
            }
        };
        self.close_prompt(dashboard, outcome, out);
        true
    }

    fn close_prompt(
        &mut self,
        dashboard: &mut Dashboard,
        outcome: PromptOutcome,
        out: &mut StepOutcome,
    ) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        dashboard.end_prompt();
        out.redraw = true;

        let PromptOutcome::Submitted(line) = outcome else {
            return;
        };
        if line.is_empty() {
            return;
        }
        let kind = prompt.kind();
        self.histories.record(kind, &line);

        match kind.submit_action(line.clone()) {
            Some(action) => self.queue.push_back(action),
            None => match commands::execute(&line, &mut self.registry) {
                Ok(actions) => self.queue.extend(actions),
                Err(e) => out.errors.push(format!("{line}: {e}")),
            },
        }
    }
}
