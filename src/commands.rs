//! The command language used by the `:` prompt and startup commands.
//!
//! A command line is whitespace-separated words; single or double quotes
//! group words and `#` starts a comment. Built-in commands edit the key
//! binding registry or expand to actions; any action name is a command too,
//! taking its text arguments from the rest of the line.

use anyhow::Context;
use crate::app::{Dashboard, RouteOutcome};
use crate::error::ResolutionError;
use crate::input::actions::{Action, ActionArg, ActionType};
use crate::input::handler::ActionContext;
use crate::input::key::KeySequence;
use crate::input::keybindings::{parse_scope, Binding, KeyBindingRegistry};
use crate::view::{Orientation, ViewId};

/// A built-in command
#[derive(Debug, Clone, Copy)]
pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
}

/// Every built-in command, in help order
pub const COMMANDS: &[Command] = &[
    Command {
        name: "q",
        usage: "q",
        description: "Quit",
    },
    Command {
        name: "map",
        usage: "map <scope> <keys> <keys>",
        description: "Remap a key sequence to other keys",
    },
    Command {
        name: "unmap",
        usage: "unmap <scope> <keys>",
        description: "Remove a binding",
    },
    Command {
        name: "bind",
        usage: "bind <scope> <keys> <action>",
        description: "Bind a key sequence to an action",
    },
    Command {
        name: "addtab",
        usage: "addtab [name] [view]",
        description: "Open a tab",
    },
    Command {
        name: "rmtab",
        usage: "rmtab",
        description: "Close the current tab",
    },
    Command {
        name: "addview",
        usage: "addview <view> [argument]",
        description: "Add a view to the current tab",
    },
    Command {
        name: "split",
        usage: "split <view> [argument]",
        description: "Split the active view",
    },
    Command {
        name: "vsplit",
        usage: "vsplit <view> [argument]",
        description: "Split the active view side by side",
    },
    Command {
        name: "hsplit",
        usage: "hsplit <view> [argument]",
        description: "Split the active view top and bottom",
    },
    Command {
        name: "help",
        usage: "help",
        description: "Show key bindings",
    },
];

/// Why a command line could not be executed.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// The line is not well formed (unterminated quote)
    Parse(String),
    /// A known command with the wrong arguments
    Usage(&'static str),
    /// Unknown command, scope, view or action
    Resolution(ResolutionError),
    /// An action that needs arguments the command line cannot express
    NotACommand(String),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Parse(msg) => write!(f, "Parse error: {msg}"),
            CommandError::Usage(usage) => write!(f, "Usage: {usage}"),
            CommandError::Resolution(e) => write!(f, "{e}"),
            CommandError::NotACommand(name) => write!(f, "{name} cannot be run as a command"),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<ResolutionError> for CommandError {
    fn from(e: ResolutionError) -> Self {
        CommandError::Resolution(e)
    }
}

/// Split a command line into words.
pub fn tokenize(line: &str) -> Result<Vec<String>, CommandError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None => match c {
                '#' => break,
                '"' | '\'' => {
                    quote = Some(c);
                    in_word = true;
                }
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                c => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }

    if let Some(q) = quote {
        return Err(CommandError::Parse(format!("unterminated {q}")));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Execute one command line. Registry edits happen immediately; the
/// returned actions are for the router. A blank line or a comment does
/// nothing.
pub fn execute(
    line: &str,
    registry: &mut KeyBindingRegistry,
) -> Result<Vec<Action>, CommandError> {
    let words = tokenize(line)?;
    let Some((name, args)) = words.split_first() else {
        return Ok(Vec::new());
    };
    tracing::debug!("command {} {:?}", name, args);

    let action = match name.as_str() {
        "q" => Action::new(ActionType::Exit),
        "map" => {
            let [scope, keys, target] = args else {
                return Err(usage("map"));
            };
            registry.bind(
                parse_scope(scope)?,
                parse_keys(keys, "map")?,
                Binding::Keystring(parse_keys(target, "map")?),
            );
            return Ok(Vec::new());
        }
        "unmap" => {
            let [scope, keys] = args else {
                return Err(usage("unmap"));
            };
            let sequence = parse_keys(keys, "unmap")?;
            if registry.unbind(parse_scope(scope)?, &sequence) {
                return Ok(Vec::new());
            }
            Action::status(format!("No binding for {keys} in {scope}"))
        }
        "bind" => {
            let [scope, keys, action] = args else {
                return Err(usage("bind"));
            };
            let action_type = ActionType::from_name(action)
                .ok_or_else(|| ResolutionError::UnknownAction(action.clone()))?;
            registry.bind(
                parse_scope(scope)?,
                parse_keys(keys, "bind")?,
                Binding::Action(action_type),
            );
            return Ok(Vec::new());
        }
        "addtab" => new_tab(args)?,
        "rmtab" => Action::new(ActionType::RemoveTab),
        "addview" => add_view(args, "addview")?,
        "split" => split_view(args, "split", Orientation::Dynamic)?,
        "vsplit" => split_view(args, "vsplit", Orientation::Vertical)?,
        "hsplit" => split_view(args, "hsplit", Orientation::Horizontal)?,
        "help" => Action::new(ActionType::ShowHelpView),
        other => named_action(other, args)?,
    };
    Ok(vec![action])
}

/// Run the configured startup commands. Any failure is fatal at startup.
/// Returns false when a command asked to exit.
pub fn run_startup(
    lines: &[String],
    dashboard: &mut Dashboard,
    registry: &mut KeyBindingRegistry,
) -> anyhow::Result<bool> {
    for line in lines {
        let actions =
            execute(line, registry).with_context(|| format!("Startup command `{line}` failed"))?;
        for action in actions {
            let mut ctx = ActionContext::new();
            let outcome = dashboard
                .dispatch(action, registry, &mut ctx)
                .with_context(|| format!("Startup command `{line}` failed"))?;
            if outcome == RouteOutcome::Exit {
                tracing::info!("Startup command `{}` exits", line);
                return Ok(false);
            }
        }
    }
    Ok(true)
}

fn usage(name: &str) -> CommandError {
    let usage = COMMANDS
        .iter()
        .find(|c| c.name == name)
        .map(|c| c.usage)
        .unwrap_or("");
    CommandError::Usage(usage)
}

fn parse_keys(keys: &str, command: &str) -> Result<KeySequence, CommandError> {
    let sequence = KeySequence::parse(keys);
    if sequence.is_empty() {
        return Err(usage(command));
    }
    Ok(sequence)
}

fn parse_view(name: &str) -> Result<ViewId, CommandError> {
    ViewId::ALL
        .iter()
        .copied()
        .find(|v| v.is_creatable() && v.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| CommandError::Resolution(ResolutionError::UnknownScope(name.to_string())))
}

fn new_tab(args: &[String]) -> Result<Action, CommandError> {
    let mut action_args = Vec::new();
    match args {
        [] => {}
        [name] => action_args.push(ActionArg::Text(name.clone())),
        [name, view] => {
            action_args.push(ActionArg::Text(name.clone()));
            action_args.push(ActionArg::View(parse_view(view)?));
        }
        _ => return Err(usage("addtab")),
    }
    Ok(Action::with_args(ActionType::NewTab, action_args))
}

fn add_view(args: &[String], command: &str) -> Result<Action, CommandError> {
    let (view, rest) = args.split_first().ok_or_else(|| usage(command))?;
    let mut action_args = vec![ActionArg::View(parse_view(view)?)];
    match rest {
        [] => {}
        [arg] => action_args.push(ActionArg::Text(arg.clone())),
        _ => return Err(usage(command)),
    }
    Ok(Action::with_args(ActionType::AddView, action_args))
}

fn split_view(
    args: &[String],
    command: &'static str,
    orientation: Orientation,
) -> Result<Action, CommandError> {
    let (view, rest) = args.split_first().ok_or_else(|| usage(command))?;
    let mut action_args = vec![
        ActionArg::View(parse_view(view)?),
        ActionArg::Orientation(orientation),
    ];
    match rest {
        [] => {}
        [arg] => action_args.push(ActionArg::Text(arg.clone())),
        _ => return Err(usage(command)),
    }
    Ok(Action::with_args(ActionType::SplitView, action_args))
}

/// An action invoked by name. The typed forms of view and tab actions go
/// through their built-in commands.
fn named_action(name: &str, args: &[String]) -> Result<Action, CommandError> {
    let action_type = ActionType::from_name(name)
        .ok_or_else(|| ResolutionError::UnknownAction(name.to_string()))?;
    match action_type {
        ActionType::NewTab => new_tab(args),
        ActionType::AddView => add_view(args, "addview"),
        ActionType::SplitView => split_view(args, "split", Orientation::Dynamic),
        ActionType::CreateContextMenu
        | ActionType::SelectRow
        | ActionType::MouseSelect
        | ActionType::MouseScrollDown
        | ActionType::MouseScrollUp => Err(CommandError::NotACommand(name.to_string())),
        _ => Ok(Action::with_args(
            action_type,
            args.iter().cloned().map(ActionArg::Text).collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_quotes_and_comments() {
        assert_eq!(
            tokenize(r#"map All "a b" 'c'  # trailing"#).unwrap(),
            vec!["map", "All", "a b", "c"]
        );
        assert_eq!(tokenize("  # only a comment").unwrap(), Vec::<String>::new());
        assert_eq!(
            tokenize("x \"open").unwrap_err(),
            CommandError::Parse("unterminated \"".into())
        );
        assert_eq!(tokenize("\"\"").unwrap(), vec![""]);
    }

    #[test]
    fn test_map_and_unmap_edit_registry() {
        let mut registry = KeyBindingRegistry::new();
        assert!(execute("map RefView x jj", &mut registry).unwrap().is_empty());
        let lookup = registry.lookup(&[ViewId::Refs, ViewId::All], &KeySequence::parse("x"));
        assert_eq!(lookup.binding, Some(Binding::Keystring(KeySequence::parse("jj"))));

        assert!(execute("unmap RefView x", &mut registry).unwrap().is_empty());
        let actions = execute("unmap RefView x", &mut registry).unwrap();
        assert_eq!(actions[0].action_type, ActionType::ShowStatus);
    }

    #[test]
    fn test_bind_requires_known_names() {
        let mut registry = KeyBindingRegistry::new();
        execute("bind All Q exit", &mut registry).unwrap();
        let lookup = registry.lookup(&[ViewId::All], &KeySequence::parse("Q"));
        assert_eq!(lookup.binding, Some(Binding::Action(ActionType::Exit)));

        assert_eq!(
            execute("bind Nowhere Q exit", &mut registry).unwrap_err(),
            CommandError::Resolution(ResolutionError::UnknownScope("Nowhere".into()))
        );
        assert_eq!(
            execute("bind All Q explode", &mut registry).unwrap_err(),
            CommandError::Resolution(ResolutionError::UnknownAction("explode".into()))
        );
        assert_eq!(
            execute("bind All Q", &mut registry).unwrap_err(),
            CommandError::Usage("bind <scope> <keys> <action>")
        );
    }

    #[test]
    fn test_view_commands_build_typed_actions() {
        let mut registry = KeyBindingRegistry::new();
        let split = execute("vsplit previewview src/lib.rs", &mut registry).unwrap();
        assert_eq!(split[0].action_type, ActionType::SplitView);
        assert_eq!(split[0].view(0), Ok(ViewId::Preview));
        assert_eq!(split[0].orientation(1), Ok(Orientation::Vertical));
        assert_eq!(split[0].text(2), Ok("src/lib.rs"));

        let tab = execute("addtab Work FileView", &mut registry).unwrap();
        assert_eq!(tab[0].text(0), Ok("Work"));
        assert_eq!(tab[0].view(1), Ok(ViewId::Files));

        assert!(matches!(
            execute("addview StatusBarView", &mut registry),
            Err(CommandError::Resolution(_))
        ));
    }

    #[test]
    fn test_startup_commands_route_and_stop_on_error() {
        let mut dashboard = crate::app::tests::dashboard();
        let mut registry = KeyBindingRegistry::new();
        let lines = vec![
            "map All Z gg".to_string(),
            "addtab Work".to_string(),
            "select-tab-by-name Main".to_string(),
        ];
        assert!(run_startup(&lines, &mut dashboard, &mut registry).unwrap());
        assert_eq!(dashboard.tab_names(), vec!["Main", "Work"]);
        assert_eq!(dashboard.current_tab_index(), 0);

        assert!(!run_startup(&["q".to_string()], &mut dashboard, &mut registry).unwrap());
        let err = run_startup(&["bind All x nope".to_string()], &mut dashboard, &mut registry)
            .unwrap_err();
        assert!(err.to_string().contains("bind All x nope"));
    }

    #[test]
    fn test_action_names_are_commands() {
        let mut registry = KeyBindingRegistry::new();
        let actions = execute("select-tab-by-name Main", &mut registry).unwrap();
        assert_eq!(actions[0].action_type, ActionType::SelectTabByName);
        assert_eq!(actions[0].text(0), Ok("Main"));
        assert_eq!(execute("q", &mut registry).unwrap()[0].action_type, ActionType::Exit);
        assert!(execute("", &mut registry).unwrap().is_empty());
        assert_eq!(
            execute("mouse-select", &mut registry).unwrap_err(),
            CommandError::NotACommand("mouse-select".into())
        );
    }
}
