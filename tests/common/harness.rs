// DashboardTestHarness - Virtual terminal environment for E2E testing

use super::git_test_helper::GitTestRepo;
use ratatui::{backend::TestBackend, Terminal};
use repodash::app::Dashboard;
use repodash::commands;
use repodash::config::Config;
use repodash::engine::{InputSession, StepOutcome};
use repodash::error::EngineError;
use repodash::input::actions::Action;
use repodash::input::keybindings::KeyBindingRegistry;
use repodash::model::repository::Repository;
use repodash::view::prompt::{PromptHistories, PromptKind};
use repodash::view::sources::RepositoryViewFactory;
use repodash::view::surface::RenderBackend;
use repodash::view::ViewId;
use std::io;
use std::sync::Arc;

/// Terminal layout constants
pub mod layout {
    /// Get the status bar row for a given terminal height
    #[inline]
    pub const fn status_bar_row(terminal_height: u16) -> u16 {
        terminal_height - 1
    }
}

/// Virtual dashboard environment for testing.
///
/// Keys go through the same [`InputSession`] the handler loop uses. What a
/// step hands back to the engine (exit, suspend, errors) is recorded here.
/// Without a search engine, searches run inline.
pub struct DashboardTestHarness {
    dashboard: Dashboard,
    session: InputSession,
    /// Virtual terminal backend
    terminal: Terminal<TestBackend>,
    /// Errors the engine would have shown in the error view
    errors: Vec<String>,
    exited: bool,
    suspends: usize,
    repo: GitTestRepo,
}

impl DashboardTestHarness {
    /// Harness over a repository with sample branches and files, using the
    /// default layout (one `Main` tab with the ref and file views)
    pub fn new(width: u16, height: u16) -> io::Result<Self> {
        Self::with_repo(GitTestRepo::with_sample_content(), width, height)
    }

    /// Harness over `repo` with the default layout
    pub fn with_repo(repo: GitTestRepo, width: u16, height: u16) -> io::Result<Self> {
        Self::with_config(repo, Config::default(), width, height)
    }

    /// Harness over `repo` with the tabs, key bindings and startup commands
    /// of `config`
    pub fn with_config(
        repo: GitTestRepo,
        config: Config,
        width: u16,
        height: u16,
    ) -> io::Result<Self> {
        let repository = Arc::new(Repository::open(&repo.path).map_err(io::Error::other)?);
        let mut registry = KeyBindingRegistry::with_defaults();
        registry
            .apply_config(&config.keybindings)
            .map_err(io::Error::other)?;

        let mut dashboard = Dashboard::new(Box::new(RepositoryViewFactory::new(repository)));
        dashboard
            .open_configured_tabs(&config.tabs, &registry)
            .map_err(io::Error::other)?;
        commands::run_startup(&config.commands, &mut dashboard, &mut registry)
            .map_err(io::Error::other)?;

        let terminal = Terminal::new(TestBackend::new(width, height))?;
        let mut harness = DashboardTestHarness {
            dashboard,
            session: InputSession::new(
                registry,
                config.input.max_remap_depth,
                PromptHistories::in_memory(),
            ),
            terminal,
            errors: Vec::new(),
            exited: false,
            suspends: 0,
            repo,
        };
        // Panes learn their page size from the first render
        harness.render()?;
        Ok(harness)
    }

    pub fn repo(&self) -> &GitTestRepo {
        &self.repo
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut Dashboard {
        &mut self.dashboard
    }

    pub fn registry(&self) -> &KeyBindingRegistry {
        self.session.registry()
    }

    /// Type keys in binding notation, e.g. `gg`, `<C-w>o` or `/main<Enter>`
    pub fn send_keys(&mut self, keys: &str) -> Result<(), EngineError> {
        let out = self.session.feed_raw(&mut self.dashboard, keys)?;
        self.record(out);
        Ok(())
    }

    /// Type keys and render
    pub fn type_keys(&mut self, keys: &str) -> io::Result<()> {
        self.send_keys(keys).map_err(io::Error::other)?;
        self.render()
    }

    /// Route an action and everything it leads to
    pub fn dispatch(&mut self, action: Action) -> Result<(), EngineError> {
        let out = self.session.dispatch(&mut self.dashboard, action)?;
        self.record(out);
        Ok(())
    }

    /// Close the open prompt the way SIGTSTP does
    pub fn cancel_prompt(&mut self) -> Result<bool, EngineError> {
        let out = self.session.cancel_prompt(&mut self.dashboard)?;
        let cancelled = out.is_some();
        if let Some(out) = out {
            self.record(out);
        }
        Ok(cancelled)
    }

    fn record(&mut self, out: StepOutcome) {
        self.errors.extend(out.errors);
        self.suspends += out.suspends;
        self.exited |= out.exit;
    }

    /// Render the dashboard to the virtual terminal
    pub fn render(&mut self) -> io::Result<()> {
        let area = RenderBackend::dimension(&self.terminal)?;
        let surfaces = self.dashboard.render(area);
        RenderBackend::draw(&mut self.terminal, &surfaces)
    }

    /// Resize the virtual terminal and render
    pub fn resize(&mut self, width: u16, height: u16) -> io::Result<()> {
        self.terminal.backend_mut().resize(width, height);
        self.render()
    }

    /// Get the current terminal buffer (what would be displayed)
    pub fn buffer(&self) -> &ratatui::buffer::Buffer {
        self.terminal.backend().buffer()
    }

    /// Get the style (color, modifiers) of a specific cell
    pub fn get_cell_style(&self, x: u16, y: u16) -> Option<ratatui::style::Style> {
        let buffer = self.buffer();
        let pos = buffer.index_of(x, y);
        buffer.content.get(pos).map(|cell| cell.style())
    }

    /// Get the text content of a specific screen row
    pub fn get_row_text(&self, y: u16) -> String {
        let buffer = self.buffer();
        let width = buffer.area.width;
        let mut row_text = String::new();

        for x in 0..width {
            let pos = buffer.index_of(x, y);
            if let Some(cell) = buffer.content.get(pos) {
                row_text.push_str(cell.symbol());
            }
        }

        row_text
    }

    /// Get entire screen as string (for debugging)
    pub fn screen_to_string(&self) -> String {
        let height = self.buffer().area.height;
        (0..height)
            .map(|y| self.get_row_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Text of the status bar row
    pub fn get_status_bar(&self) -> String {
        let height = self.buffer().area.height;
        self.get_row_text(layout::status_bar_row(height))
    }

    /// Verify text appears on screen
    pub fn assert_screen_contains(&self, text: &str) {
        let screen = self.screen_to_string();
        assert!(
            screen.contains(text),
            "Expected screen to contain '{text}'\nScreen content:\n{screen}"
        );
    }

    /// Verify text does not appear on screen
    pub fn assert_screen_not_contains(&self, text: &str) {
        let screen = self.screen_to_string();
        assert!(
            !screen.contains(text),
            "Expected screen to not contain '{text}'\nScreen content:\n{screen}"
        );
    }

    /// Binding scopes of the focused view, most specific first
    pub fn active_hierarchy(&self) -> Vec<ViewId> {
        self.dashboard.active_hierarchy()
    }

    /// Kind of the focused pane in the current tab
    pub fn active_view(&self) -> Option<ViewId> {
        self.dashboard
            .current_tab()
            .and_then(|tab| tab.root().active_pane())
            .map(|pane| pane.view_id())
    }

    pub fn tab_names(&self) -> Vec<String> {
        self.dashboard.tab_names()
    }

    pub fn popup_count(&self) -> usize {
        self.dashboard.popups().len()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.dashboard.status_bar().message()
    }

    pub fn is_prompting(&self) -> bool {
        self.session.is_prompting()
    }

    /// Errors reported to the error surface
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn should_quit(&self) -> bool {
        self.exited
    }

    pub fn suspend_count(&self) -> usize {
        self.suspends
    }

    /// Kind of the prompt currently open, if any
    pub fn prompt_kind(&self) -> Option<PromptKind> {
        self.session.prompt_kind()
    }
}
