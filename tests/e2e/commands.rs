use crate::common::harness::DashboardTestHarness;
use repodash::view::ViewId;

/// `:q` exits
#[test]
fn test_quit_command() {
    let mut harness = DashboardTestHarness::new(80, 24).unwrap();
    harness.type_keys(":q<Enter>").unwrap();
    assert!(harness.should_quit());
}

/// The prompt line is drawn in the status bar while typing
#[test]
fn test_prompt_is_drawn() {
    let mut harness = DashboardTestHarness::new(80, 24).unwrap();
    harness.type_keys(":addt").unwrap();
    assert!(harness.get_status_bar().starts_with(":addt"));

    harness.type_keys("<Esc>").unwrap();
    assert!(harness.get_status_bar().starts_with("[1:Main]"));
}

/// Unknown commands are reported and change nothing
#[test]
fn test_unknown_command_is_reported() {
    let mut harness = DashboardTestHarness::new(80, 24).unwrap();
    harness.type_keys(":bogus<Enter>").unwrap();

    assert_eq!(harness.errors().len(), 1);
    assert!(harness.errors()[0].starts_with("bogus:"));
    assert!(harness.errors()[0].contains("Unknown action"));
    assert!(!harness.should_quit());
    assert_eq!(harness.tab_names(), vec!["Main"]);
}

/// Commands missing arguments report their usage
#[test]
fn test_usage_error() {
    let mut harness = DashboardTestHarness::new(80, 24).unwrap();
    harness.type_keys(":map All<Enter>").unwrap();
    assert_eq!(harness.errors().len(), 1);
    assert!(harness.errors()[0].contains("map <scope> <keys> <keys>"));
}

/// `:bind` binds an action by name
#[test]
fn test_bind_command() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();
    harness.type_keys(":bind RefView e last-line<Enter>e").unwrap();
    harness.assert_screen_contains("(6/6)");

    // Only in the ref view
    harness.type_keys("<Tab>e").unwrap();
    harness.assert_screen_contains("Files (1/4)");
}

/// Action names run as commands, with their arguments
#[test]
fn test_action_name_as_command() {
    let mut harness = DashboardTestHarness::new(80, 24).unwrap();
    harness.type_keys(":show-status hello<Enter>").unwrap();
    assert_eq!(harness.status_message(), Some("hello"));

    harness.type_keys(":next-line<Enter>").unwrap();
    harness.assert_screen_contains("(2/6)");
}

/// `:split`, `:vsplit` and `:addview` add views to the current tab
#[test]
fn test_view_commands() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys(":vsplit PreviewView README.md<Enter>").unwrap();
    assert_eq!(harness.active_view(), Some(ViewId::Preview));
    harness.assert_screen_contains("# Sample");

    harness.type_keys(":addview filEview<Enter>").unwrap();
    assert_eq!(harness.active_view(), Some(ViewId::Files));
    let leaves = harness
        .dashboard()
        .current_tab()
        .unwrap()
        .root()
        .leaf_paths();
    assert_eq!(leaves.len(), 4);
}

/// Views that need an argument fail without one
#[test]
fn test_preview_without_path_fails() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();
    let result = harness.send_keys(":addview PreviewView<Enter>");
    assert!(result.is_err());
    assert_eq!(harness.active_view(), Some(ViewId::Refs));
}

/// Submitted commands are remembered; <Up> recalls them
#[test]
fn test_command_history() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();
    harness.type_keys(":next-line<Enter>").unwrap();
    harness.assert_screen_contains("(2/6)");

    harness.type_keys(":<Up><Enter>").unwrap();
    harness.assert_screen_contains("(3/6)");
}

/// `:rmtab` closes the current tab
#[test]
fn test_rmtab_command() {
    let mut harness = DashboardTestHarness::new(80, 24).unwrap();
    harness.type_keys(":addtab Other<Enter>:rmtab<Enter>").unwrap();
    assert_eq!(harness.tab_names(), vec!["Main"]);
    harness.type_keys(":rmtab<Enter>").unwrap();
    assert!(harness.should_quit());
}
