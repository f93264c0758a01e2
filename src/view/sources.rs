//! Row sources for the repository views and the factory that builds them.

use super::list_view::{ListView, Row, RowSource};
use super::{Orientation, Pane, ViewFactory, ViewId};
use crate::commands::COMMANDS;
use crate::error::EngineError;
use crate::input::actions::{Action, ActionArg, ActionType, MenuEntry};
use crate::input::keybindings::{Binding, KeyBindingRegistry};
use crate::model::repository::Repository;
use std::path::PathBuf;
use std::sync::Arc;

/// Lines read for a file preview
pub const PREVIEW_MAX_LINES: usize = 10_000;

/// Action that opens a preview of `path` next to the current view.
pub fn preview_action(path: &str) -> Action {
    Action::with_args(
        ActionType::SplitView,
        vec![
            ActionArg::View(ViewId::Preview),
            ActionArg::Orientation(Orientation::Dynamic),
            ActionArg::Text(path.to_string()),
        ],
    )
}

/// Branches, remotes and tags
pub struct RefsSource {
    repo: Arc<Repository>,
}

impl RefsSource {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }
}

impl RowSource for RefsSource {
    fn view_id(&self) -> ViewId {
        ViewId::Refs
    }

    fn title(&self) -> String {
        format!("Refs: {}", self.repo.name())
    }

    fn load(&mut self) -> Result<Vec<Row>, EngineError> {
        Ok(self
            .repo
            .refs()?
            .into_iter()
            .map(|r| {
                let target: String = r.target.chars().take(40).collect();
                Row::with_value(
                    format!("{:<7} {:<32} {}", r.kind.label(), r.short_name(), target),
                    r.name,
                )
            })
            .collect())
    }

    fn on_select(&self, row: &Row) -> Option<Action> {
        Some(Action::status(row.value.clone()))
    }

    fn context_menu(&self, row: &Row) -> Vec<MenuEntry> {
        vec![
            MenuEntry::new(format!("Show {}", row.value), Action::status(row.text.clone())),
            MenuEntry::new(
                "Browse files",
                Action::with_args(ActionType::AddView, vec![ActionArg::View(ViewId::Files)]),
            ),
        ]
    }
}

/// Work tree files
pub struct FilesSource {
    repo: Arc<Repository>,
}

impl FilesSource {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }
}

impl RowSource for FilesSource {
    fn view_id(&self) -> ViewId {
        ViewId::Files
    }

    fn title(&self) -> String {
        "Files".to_string()
    }

    fn load(&mut self) -> Result<Vec<Row>, EngineError> {
        Ok(self
            .repo
            .files()?
            .into_iter()
            .map(|path| Row::new(path.to_string_lossy()))
            .collect())
    }

    fn on_select(&self, row: &Row) -> Option<Action> {
        Some(preview_action(&row.value))
    }

    fn context_menu(&self, row: &Row) -> Vec<MenuEntry> {
        vec![
            MenuEntry::new("Preview", preview_action(&row.value)),
            MenuEntry::new(
                "Preview in this tab",
                Action::with_args(
                    ActionType::AddView,
                    vec![
                        ActionArg::View(ViewId::Preview),
                        ActionArg::Text(row.value.clone()),
                    ],
                ),
            ),
        ]
    }
}

/// Content of one file
pub struct PreviewSource {
    repo: Arc<Repository>,
    path: PathBuf,
}

impl PreviewSource {
    pub fn new(repo: Arc<Repository>, path: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            path: path.into(),
        }
    }
}

impl RowSource for PreviewSource {
    fn view_id(&self) -> ViewId {
        ViewId::Preview
    }

    fn title(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&mut self) -> Result<Vec<Row>, EngineError> {
        Ok(self
            .repo
            .read_file(&self.path, PREVIEW_MAX_LINES)?
            .into_iter()
            .map(Row::new)
            .collect())
    }

    fn tracks_content(&self) -> bool {
        true
    }
}

/// Every key binding, one per row
pub struct HelpSource {
    rows: Vec<Row>,
}

impl HelpSource {
    /// Rows for every binding, followed by the built-in commands.
    pub fn new(registry: &KeyBindingRegistry) -> Self {
        let mut rows: Vec<Row> = registry
            .bindings()
            .into_iter()
            .map(|(scope, keys, binding)| {
                let meaning = match binding {
                    Binding::Action(action) => {
                        format!("{:<22} {}", action.name(), action.description())
                    }
                    Binding::Keystring(target) => format!("remap to {target}"),
                };
                Row::with_value(
                    format!("{:<16} {:<12} {}", scope.name(), keys.to_string(), meaning),
                    keys.to_string(),
                )
            })
            .collect();
        rows.extend(COMMANDS.iter().map(|command| {
            Row::with_value(
                format!(":{:<28} {}", command.usage, command.description),
                command.name,
            )
        }));
        Self { rows }
    }
}

impl RowSource for HelpSource {
    fn view_id(&self) -> ViewId {
        ViewId::Help
    }

    fn title(&self) -> String {
        "Key bindings".to_string()
    }

    fn load(&mut self) -> Result<Vec<Row>, EngineError> {
        Ok(self.rows.clone())
    }
}

/// Builds the repository views.
pub struct RepositoryViewFactory {
    repo: Arc<Repository>,
}

impl RepositoryViewFactory {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }
}

impl ViewFactory for RepositoryViewFactory {
    fn create(&self, view: ViewId, arg: Option<&str>) -> Result<Box<dyn Pane>, EngineError> {
        tracing::debug!("create {} {:?}", view.name(), arg);
        match view {
            ViewId::Refs => Ok(Box::new(ListView::new(RefsSource::new(self.repo.clone()))?)),
            ViewId::Files => Ok(Box::new(ListView::new(FilesSource::new(self.repo.clone()))?)),
            ViewId::Preview => {
                let path = arg.ok_or_else(|| EngineError::runtime("PreviewView needs a file path"))?;
                Ok(Box::new(ListView::new(PreviewSource::new(
                    self.repo.clone(),
                    path,
                ))?))
            }
            other => Err(EngineError::runtime(format!(
                "{} cannot be created here",
                other.name()
            ))),
        }
    }
}
