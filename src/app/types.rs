use crate::view::prompt::PromptKind;

/// What the handler loop must do after an action has been routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Nothing beyond what the dashboard already did
    Handled,
    /// Stop the engine
    Exit,
    /// Hand the terminal back to the shell until resumed
    Suspend,
    /// Run a line prompt of this kind
    Prompt(PromptKind),
}

impl RouteOutcome {
    pub fn is_handled(self) -> bool {
        self == RouteOutcome::Handled
    }
}
