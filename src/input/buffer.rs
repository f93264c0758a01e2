//! Input resolution buffer.
//!
//! Holds key tokens that have been typed but not yet resolved. Each call to
//! [`InputBuffer::process`] consumes tokens greedily until it can produce one
//! resolution: an action, a run of literal keys, or a request to wait for
//! more input because the tokens so far are a prefix of a longer binding.

use crate::input::actions::{Action, ActionType};
use crate::input::key::{KeySequence, KeyToken};
use crate::input::keybindings::{Binding, KeyBindingRegistry};
use crate::view::ViewId;
use std::collections::VecDeque;

/// Default bound on remap expansions within one `process` call
pub const DEFAULT_MAX_REMAP_DEPTH: usize = 32;

/// Outcome of one [`InputBuffer::process`] call
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A bound action
    Action(Action),
    /// Keys that resolved to nothing, for the active view to handle
    Literal(KeySequence),
    /// The buffered keys are a prefix of a binding; wait for more input
    Pending,
    /// Nothing buffered
    Empty,
    /// Remap expansion did not terminate; the buffer has been cleared
    RemapLimitExceeded(KeySequence),
}

/// FIFO of pending key tokens
#[derive(Debug, Clone)]
pub struct InputBuffer {
    pending: VecDeque<KeyToken>,
    max_remap_depth: usize,
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REMAP_DEPTH)
    }
}

impl InputBuffer {
    pub fn new(max_remap_depth: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            max_remap_depth,
        }
    }

    pub fn append(&mut self, tokens: impl IntoIterator<Item = KeyToken>) {
        self.pending.extend(tokens);
    }

    /// Tokenize `keys` and append them.
    pub fn append_raw(&mut self, keys: &str) {
        self.append(KeySequence::parse(keys).into_tokens());
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// The buffered keys, for display while a chord is in progress.
    pub fn pending_keys(&self) -> KeySequence {
        KeySequence::from(self.pending.iter().cloned().collect::<Vec<_>>())
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Take the oldest buffered token. A prompt opened by a binding consumes
    /// keys typed after it this way before reading new input.
    pub fn take_next(&mut self) -> Option<KeyToken> {
        self.pending.pop_front()
    }

    fn prepend(&mut self, tokens: &[KeyToken]) {
        for token in tokens.iter().rev() {
            self.pending.push_front(token.clone());
        }
    }

    /// Resolve buffered keys against `hierarchy` (most specific scope first).
    ///
    /// Yields at most one resolution. Tokens not consumed stay buffered for
    /// the next call, so callers loop while [`has_pending`](Self::has_pending)
    /// and the result is not [`Resolution::Pending`].
    pub fn process(&mut self, registry: &KeyBindingRegistry, hierarchy: &[ViewId]) -> Resolution {
        if self.pending.is_empty() {
            return Resolution::Empty;
        }

        let mut candidate = KeySequence::new();
        let mut expansions = 0;

        while let Some(token) = self.pending.pop_front() {
            candidate.push(token);
            let lookup = registry.lookup(hierarchy, &candidate);

            match lookup.binding {
                Some(Binding::Action(ActionType::None)) => {
                    tracing::trace!("{} bound to none, consumed", candidate);
                    return Resolution::Literal(candidate);
                }
                Some(Binding::Action(action_type)) => {
                    tracing::trace!("{} -> {}", candidate, action_type.name());
                    return Resolution::Action(Action::new(action_type));
                }
                Some(Binding::Keystring(target)) => {
                    expansions += 1;
                    if expansions > self.max_remap_depth {
                        tracing::warn!(
                            "Remap of {} exceeded {} expansions, discarding input",
                            candidate,
                            self.max_remap_depth
                        );
                        self.pending.clear();
                        return Resolution::RemapLimitExceeded(candidate);
                    }
                    tracing::trace!("{} remapped to {}", candidate, target);
                    self.prepend(target.tokens());
                    candidate.clear();
                }
                None if lookup.is_prefix => {
                    if self.pending.is_empty() {
                        tracing::trace!("{} is a prefix, waiting for more input", candidate);
                        self.prepend(candidate.tokens());
                        return Resolution::Pending;
                    }
                }
                None => {
                    tracing::trace!("{} is unbound", candidate);
                    return Resolution::Literal(candidate);
                }
            }
        }

        // A remap expanded to an empty sequence
        if candidate.is_empty() {
            Resolution::Empty
        } else {
            Resolution::Literal(candidate)
        }
    }
}
