//! Error taxonomy for the dashboard engine.
//!
//! Two classes of failure flow through the engine:
//!
//! - [`ResolutionError`]: wiring/configuration defects (unknown view scope,
//!   unknown action name, an action carrying the wrong argument type). These
//!   are fatal: the engine stops and the error is reported once the terminal
//!   has been restored.
//! - Runtime failures ([`EngineError::Runtime`], [`EngineError::Io`]): backend
//!   I/O problems, domain command failures, bad interactive commands. These
//!   go to the error channel and the loops keep running.

use crate::input::actions::ActionType;

/// A defect in how actions, scopes or bindings are wired together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// A binding or command named a view scope that does not exist
    UnknownScope(String),
    /// A binding or command named an action that does not exist
    UnknownAction(String),
    /// A known action was dispatched without a required argument
    MissingArgument {
        action: ActionType,
        index: usize,
        expected: &'static str,
    },
    /// A known action was dispatched with an argument of the wrong type
    WrongArgumentType {
        action: ActionType,
        index: usize,
        expected: &'static str,
    },
}

impl std::fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionError::UnknownScope(name) => write!(f, "Unknown view scope: {name}"),
            ResolutionError::UnknownAction(name) => write!(f, "Unknown action: {name}"),
            ResolutionError::MissingArgument {
                action,
                index,
                expected,
            } => write!(
                f,
                "Action {} is missing argument {index} (expected {expected})",
                action.name()
            ),
            ResolutionError::WrongArgumentType {
                action,
                index,
                expected,
            } => write!(
                f,
                "Action {} has wrong type for argument {index} (expected {expected})",
                action.name()
            ),
        }
    }
}

impl std::error::Error for ResolutionError {}

/// Errors raised while routing actions or running engine loops.
#[derive(Debug)]
pub enum EngineError {
    /// Fatal wiring defect
    Resolution(ResolutionError),
    /// Recoverable failure with a user-facing message
    Runtime(String),
    /// Recoverable I/O failure
    Io(std::io::Error),
}

impl EngineError {
    pub fn runtime(msg: impl Into<String>) -> Self {
        EngineError::Runtime(msg.into())
    }

    /// Whether this error must stop the engine instead of being displayed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Resolution(_))
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Resolution(e) => write!(f, "{e}"),
            EngineError::Runtime(msg) => write!(f, "{msg}"),
            EngineError::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Resolution(e) => Some(e),
            EngineError::Io(e) => Some(e),
            EngineError::Runtime(_) => None,
        }
    }
}

impl From<ResolutionError> for EngineError {
    fn from(e: ResolutionError) -> Self {
        EngineError::Resolution(e)
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_resolution_errors_are_fatal() {
        assert!(EngineError::from(ResolutionError::UnknownScope("Nope".into())).is_fatal());
        assert!(!EngineError::runtime("disk on fire").is_fatal());
        assert!(!EngineError::from(std::io::Error::other("eof")).is_fatal());
    }

    #[test]
    fn test_display_names_the_action() {
        let err = ResolutionError::WrongArgumentType {
            action: ActionType::SelectTabByName,
            index: 0,
            expected: "text",
        };
        assert_eq!(
            err.to_string(),
            "Action select-tab-by-name has wrong type for argument 0 (expected text)"
        );
    }
}
