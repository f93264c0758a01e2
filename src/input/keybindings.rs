//! Key binding registry.
//!
//! Bindings are stored per view scope in a prefix tree keyed on key tokens.
//! A lookup walks the caller's view hierarchy from the most specific scope to
//! the global [`ViewId::All`] scope and returns the first exact match. When no
//! exact match exists, the lookup reports whether the sequence is a strict
//! prefix of some binding in any of the visited scopes, which is what lets the
//! input buffer wait for the rest of a multi-key chord.

use crate::config::KeyBindingConfig;
use crate::error::ResolutionError;
use crate::input::actions::ActionType;
use crate::input::key::{KeySequence, KeyToken};
use crate::view::ViewId;
use std::collections::HashMap;

/// What a key sequence means in a given scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Run an action
    Action(ActionType),
    /// Replace the sequence with another one and resolve again
    Keystring(KeySequence),
}

/// Result of a registry lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    /// First exact match in hierarchy order
    pub binding: Option<Binding>,
    /// The sequence is a strict prefix of a binding in a visited scope
    pub is_prefix: bool,
}

#[derive(Debug, Clone, Default)]
struct TrieNode {
    binding: Option<Binding>,
    children: HashMap<KeyToken, TrieNode>,
}

impl TrieNode {
    fn find(&self, sequence: &KeySequence) -> Option<&TrieNode> {
        sequence
            .iter()
            .try_fold(self, |node, token| node.children.get(token))
    }

    fn insert(&mut self, tokens: &[KeyToken], binding: Binding) -> Option<Binding> {
        match tokens.split_first() {
            None => self.binding.replace(binding),
            Some((first, rest)) => self
                .children
                .entry(first.clone())
                .or_default()
                .insert(rest, binding),
        }
    }

    /// Remove the binding at `tokens`, pruning branches left empty.
    fn remove(&mut self, tokens: &[KeyToken]) -> bool {
        match tokens.split_first() {
            None => self.binding.take().is_some(),
            Some((first, rest)) => {
                let Some(child) = self.children.get_mut(first) else {
                    return false;
                };
                let removed = child.remove(rest);
                if child.is_empty() {
                    self.children.remove(first);
                }
                removed
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.binding.is_none() && self.children.is_empty()
    }

    fn collect(&self, prefix: &mut Vec<KeyToken>, out: &mut Vec<(KeySequence, Binding)>) {
        if let Some(binding) = &self.binding {
            out.push((KeySequence::from(prefix.clone()), binding.clone()));
        }
        for (token, child) in &self.children {
            prefix.push(token.clone());
            child.collect(prefix, out);
            prefix.pop();
        }
    }
}

/// All key bindings, per view scope.
///
/// Constructed once at startup and owned by the handler loop; everything that
/// needs bindings receives a reference to it.
#[derive(Debug, Clone, Default)]
pub struct KeyBindingRegistry {
    scopes: HashMap<ViewId, TrieNode>,
}

impl KeyBindingRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the default key map.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (scope, keys, action) in DEFAULT_BINDINGS {
            registry.bind(*scope, KeySequence::parse(keys), Binding::Action(*action));
        }
        registry
    }

    /// Bind `sequence` in `scope`, replacing any previous binding.
    pub fn bind(&mut self, scope: ViewId, sequence: KeySequence, binding: Binding) {
        if sequence.is_empty() {
            tracing::warn!("Ignoring empty key sequence bound in {}", scope.name());
            return;
        }
        tracing::debug!("bind {} {} -> {:?}", scope.name(), sequence, binding);
        let previous = self
            .scopes
            .entry(scope)
            .or_default()
            .insert(sequence.tokens(), binding);
        if let Some(previous) = previous {
            tracing::trace!("  replaced {:?}", previous);
        }
    }

    /// Remove the binding for `sequence` in `scope`. Returns whether one existed.
    pub fn unbind(&mut self, scope: ViewId, sequence: &KeySequence) -> bool {
        let Some(root) = self.scopes.get_mut(&scope) else {
            return false;
        };
        let removed = root.remove(sequence.tokens());
        if root.is_empty() {
            self.scopes.remove(&scope);
        }
        tracing::debug!("unbind {} {} removed={}", scope.name(), sequence, removed);
        removed
    }

    /// Look up `sequence` against `hierarchy` (most specific scope first).
    ///
    /// The global scope is always consulted last, whether or not the caller
    /// included it. An exact match wins and never carries the prefix flag.
    /// Without one, the flag is set when any scope holds a longer binding
    /// starting with `sequence`.
    pub fn lookup(&self, hierarchy: &[ViewId], sequence: &KeySequence) -> Lookup {
        let mut is_prefix = false;

        let scopes = hierarchy
            .iter()
            .copied()
            .filter(|id| *id != ViewId::All)
            .chain(std::iter::once(ViewId::All));

        for scope in scopes {
            let Some(node) = self.scopes.get(&scope).and_then(|root| root.find(sequence)) else {
                continue;
            };
            if let Some(binding) = &node.binding {
                tracing::trace!("lookup {} -> {:?} in {}", sequence, binding, scope.name());
                return Lookup {
                    binding: Some(binding.clone()),
                    is_prefix: false,
                };
            }
            if !node.children.is_empty() {
                is_prefix = true;
            }
        }

        tracing::trace!("lookup {} -> no match (prefix={})", sequence, is_prefix);
        Lookup {
            binding: None,
            is_prefix,
        }
    }

    /// Every binding, ordered by scope name then key sequence.
    pub fn bindings(&self) -> Vec<(ViewId, KeySequence, Binding)> {
        let mut all = Vec::new();
        for (scope, root) in &self.scopes {
            let mut found = Vec::new();
            root.collect(&mut Vec::new(), &mut found);
            all.extend(found.into_iter().map(|(seq, b)| (*scope, seq, b)));
        }
        all.sort_by(|a, b| {
            (a.0.name(), a.1.to_string()).cmp(&(b.0.name(), b.1.to_string()))
        });
        all
    }

    /// Apply key binding entries from the configuration file.
    pub fn apply_config(&mut self, entries: &[KeyBindingConfig]) -> Result<(), ResolutionError> {
        for entry in entries {
            let scope = parse_scope(&entry.view)?;
            let binding = match (&entry.action, &entry.remap) {
                (Some(name), _) => Binding::Action(
                    ActionType::from_name(name)
                        .ok_or_else(|| ResolutionError::UnknownAction(name.clone()))?,
                ),
                (None, Some(target)) => Binding::Keystring(KeySequence::parse(target)),
                (None, None) => {
                    // Neither action nor remap: remove the binding
                    self.unbind(scope, &KeySequence::parse(&entry.keys));
                    continue;
                }
            };
            self.bind(scope, KeySequence::parse(&entry.keys), binding);
        }
        Ok(())
    }
}

/// Parse a scope name such as `RefView` or `All`.
pub fn parse_scope(name: &str) -> Result<ViewId, ResolutionError> {
    ViewId::from_name(name).ok_or_else(|| ResolutionError::UnknownScope(name.to_string()))
}

/// The default key map
const DEFAULT_BINDINGS: &[(ViewId, &str, ActionType)] = &[
    // Movement
    (ViewId::All, "j", ActionType::NextLine),
    (ViewId::All, "<Down>", ActionType::NextLine),
    (ViewId::All, "k", ActionType::PrevLine),
    (ViewId::All, "<Up>", ActionType::PrevLine),
    (ViewId::All, "<C-f>", ActionType::NextPage),
    (ViewId::All, "<PageDown>", ActionType::NextPage),
    (ViewId::All, "<C-b>", ActionType::PrevPage),
    (ViewId::All, "<PageUp>", ActionType::PrevPage),
    (ViewId::All, "<C-d>", ActionType::NextHalfPage),
    (ViewId::All, "<C-u>", ActionType::PrevHalfPage),
    (ViewId::All, "l", ActionType::ScrollRight),
    (ViewId::All, "<Right>", ActionType::ScrollRight),
    (ViewId::All, "h", ActionType::ScrollLeft),
    (ViewId::All, "<Left>", ActionType::ScrollLeft),
    (ViewId::All, "gg", ActionType::FirstLine),
    (ViewId::All, "<Home>", ActionType::FirstLine),
    (ViewId::All, "G", ActionType::LastLine),
    (ViewId::All, "<End>", ActionType::LastLine),
    (ViewId::All, "zz", ActionType::CenterView),
    (ViewId::All, "z.", ActionType::CenterView),
    (ViewId::All, "zt", ActionType::ScrollCursorTop),
    (ViewId::All, "z<Enter>", ActionType::ScrollCursorTop),
    (ViewId::All, "zb", ActionType::ScrollCursorBottom),
    (ViewId::All, "z-", ActionType::ScrollCursorBottom),
    (ViewId::All, "H", ActionType::CursorTopView),
    (ViewId::All, "M", ActionType::CursorMiddleView),
    (ViewId::All, "L", ActionType::CursorBottomView),
    (ViewId::All, "<Enter>", ActionType::Select),
    // Views
    (ViewId::All, "<Tab>", ActionType::NextView),
    (ViewId::All, "<C-w>w", ActionType::NextView),
    (ViewId::All, "<C-w><C-w>", ActionType::NextView),
    (ViewId::All, "<S-Tab>", ActionType::PrevView),
    (ViewId::All, "<C-w>W", ActionType::PrevView),
    (ViewId::All, "f", ActionType::FullScreenView),
    (ViewId::All, "<C-w>o", ActionType::FullScreenView),
    (ViewId::All, "<C-w>t", ActionType::ToggleViewLayout),
    (ViewId::All, "q", ActionType::RemoveView),
    // Tabs
    (ViewId::All, "gt", ActionType::NextTab),
    (ViewId::All, "gT", ActionType::PrevTab),
    (ViewId::All, "<C-w>c", ActionType::RemoveTab),
    // Prompts and search
    (ViewId::All, ":", ActionType::Prompt),
    (ViewId::All, "/", ActionType::SearchPrompt),
    (ViewId::All, "?", ActionType::ReverseSearchPrompt),
    (ViewId::All, "n", ActionType::SearchFindNext),
    (ViewId::All, "N", ActionType::SearchFindPrev),
    (ViewId::All, "<C-q>", ActionType::FilterPrompt),
    (ViewId::All, "<C-r>", ActionType::RemoveFilter),
    (ViewId::All, "<C-l>", ActionType::ClearSearch),
    // Popups and lifecycle
    (ViewId::All, "<C-Space>", ActionType::ShowContextMenu),
    (ViewId::All, "<F1>", ActionType::ShowHelpView),
    (ViewId::All, "R", ActionType::Refresh),
    (ViewId::All, "<C-z>", ActionType::Suspend),
    (ViewId::All, "Q", ActionType::Exit),
    (ViewId::ContextMenu, "<Esc>", ActionType::RemovePopup),
    (ViewId::ContextMenu, "q", ActionType::RemovePopup),
    (ViewId::Help, "<Esc>", ActionType::RemoveView),
];
