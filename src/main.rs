use anyhow::{Context, Result as AnyhowResult};
use clap::Parser;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use repodash::app::Dashboard;
use repodash::commands;
use repodash::config::{Config, DirectoryContext};
use repodash::engine::{CrosstermEvents, Engine, EngineOptions, WatchOptions};
use repodash::input::keybindings::KeyBindingRegistry;
use repodash::model::repository::Repository;
use repodash::services::terminal_modes::{self, TerminalModes};
use repodash::services::tracing_setup;
use repodash::view::prompt::PromptHistories;
use repodash::view::sources::RepositoryViewFactory;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;

/// A terminal dashboard for browsing a repository
#[derive(Parser, Debug)]
#[command(name = "repodash")]
#[command(about = "Browse refs and files of a repository in the terminal", long_about = None)]
#[command(version)]
struct Args {
    /// Repository to open (default: the current directory)
    #[arg(value_name = "REPO")]
    repo: Option<PathBuf>,

    /// Configuration file layered over the user configuration
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Path to log file for diagnostics (default: system temp dir)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Do not watch the repository for changes
    #[arg(long)]
    no_watch: bool,

    /// Do not capture the mouse
    #[arg(long)]
    no_mouse: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();

    let dir_context = DirectoryContext::from_system()?;
    let config = Config::load(&dir_context, args.config.as_deref())
        .context("Failed to load configuration")?;

    // Handle --dump-config early (no terminal setup needed)
    if args.dump_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(tracing_setup::default_log_path);
    let tracing_handles = tracing_setup::init_global(&log_file);
    tracing::info!("repodash starting");

    let repo_path = args.repo.clone().unwrap_or_else(|| PathBuf::from("."));
    let repo = Arc::new(
        Repository::open(&repo_path)
            .with_context(|| format!("Cannot open repository at {}", repo_path.display()))?,
    );
    tracing::info!("Repository {} at {}", repo.name(), repo.root().display());

    let mut registry = KeyBindingRegistry::with_defaults();
    registry
        .apply_config(&config.keybindings)
        .context("Invalid key binding in configuration")?;

    let mut dashboard = Dashboard::new(Box::new(RepositoryViewFactory::new(repo.clone())));
    dashboard
        .open_configured_tabs(&config.tabs, &registry)
        .context("Failed to open the startup layout")?;
    if !commands::run_startup(&config.commands, &mut dashboard, &mut registry)? {
        return Ok(());
    }

    let histories = PromptHistories::load(dir_context.prompt_history_dir());
    let mut options = EngineOptions::from_config(&config);
    if args.no_mouse {
        options.mouse = false;
    }
    if config.watch.enabled && !args.no_watch {
        options.watch = Some(WatchOptions {
            repo: repo.clone(),
            debounce: config.watch.debounce(),
        });
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        terminal_modes::emergency_cleanup();
        original_hook(panic);
    }));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    let modes = Arc::new(TerminalModes::enable(options.mouse).context("Failed to set up the terminal")?);
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let size = terminal.size()?;
    tracing::info!("Terminal size: {}x{}", size.width, size.height);

    let suspend_modes = modes.clone();
    let engine = Engine::new(dashboard, registry, histories, options)
        .with_input(Box::new(CrosstermEvents))
        .with_suspend_hook(Box::new(move || suspend_modes.suspend_process()));
    let result = runtime.block_on(engine.run(terminal));

    // Restore terminal state
    modes.undo();

    if result.is_err() {
        if let Some(handles) = &tracing_handles {
            eprintln!("See {} for details", handles.log_path.display());
        }
    }
    result.context("Dashboard stopped with an error")
}
