use crate::common::git_test_helper::GitTestRepo;
use crate::common::harness::DashboardTestHarness;
use repodash::config::{Config, TabConfig};
use repodash::view::ViewId;

/// `:addtab` opens a tab and switches to it; gt/gT cycle with wrap-around
#[test]
fn test_add_and_cycle_tabs() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys(":addtab Second FileView<Enter>").unwrap();
    assert_eq!(harness.tab_names(), vec!["Main", "Second"]);
    assert_eq!(harness.dashboard().current_tab_index(), 1);
    assert_eq!(harness.active_view(), Some(ViewId::Files));
    assert!(harness.get_status_bar().contains("[2:Second]"));

    harness.type_keys("gt").unwrap();
    assert_eq!(harness.dashboard().current_tab_index(), 0);
    assert_eq!(harness.active_view(), Some(ViewId::Refs));

    harness.type_keys("gt").unwrap();
    assert_eq!(harness.dashboard().current_tab_index(), 1);

    harness.type_keys("gT").unwrap();
    assert_eq!(harness.dashboard().current_tab_index(), 0);
}

/// Only the current tab is drawn
#[test]
fn test_hidden_tab_is_not_rendered() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys(":addtab Branches<Enter>").unwrap();
    // The new tab holds a single ref view
    harness.assert_screen_contains("Refs:");
    harness.assert_screen_not_contains("Files (");

    harness.type_keys("gT").unwrap();
    harness.assert_screen_contains("Files (");
}

/// Views keep their position while their tab is hidden
#[test]
fn test_tab_switch_keeps_view_state() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();
    harness.type_keys("jjj").unwrap();
    harness.assert_screen_contains("(4/6)");

    harness.type_keys(":addtab Other FileView<Enter>gt").unwrap();
    harness.assert_screen_contains("(4/6)");
}

/// <C-w>c closes the current tab; closing the last one exits
#[test]
fn test_remove_tab() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();
    harness.type_keys(":addtab Second<Enter>").unwrap();

    harness.type_keys("<C-w>c").unwrap();
    assert_eq!(harness.tab_names(), vec!["Main"]);
    assert_eq!(harness.dashboard().current_tab_index(), 0);
    assert!(!harness.should_quit());

    harness.type_keys("<C-w>c").unwrap();
    assert!(harness.should_quit());
}

/// Tabs from the configuration open in order with the first one focused
#[test]
fn test_configured_tabs() {
    let config = Config {
        tabs: vec![
            TabConfig {
                name: "Refs".to_string(),
                orientation: "vertical".to_string(),
                views: vec!["RefView".to_string()],
            },
            TabConfig {
                name: "Tree".to_string(),
                orientation: "horizontal".to_string(),
                views: vec!["FileView".to_string(), "RefView".to_string()],
            },
        ],
        ..Config::default()
    };
    let harness =
        DashboardTestHarness::with_config(GitTestRepo::with_sample_content(), config, 120, 30)
            .unwrap();

    assert_eq!(harness.tab_names(), vec!["Refs", "Tree"]);
    assert_eq!(harness.dashboard().current_tab_index(), 0);
    assert!(harness.get_status_bar().starts_with("[1:Refs] [2:Tree]"));
    harness.assert_screen_not_contains("Files (");
}

/// Startup commands run against the configured layout
#[test]
fn test_startup_commands() {
    let config = Config {
        commands: vec!["addtab Extra FileView".to_string()],
        ..Config::default()
    };
    let harness =
        DashboardTestHarness::with_config(GitTestRepo::with_sample_content(), config, 120, 30)
            .unwrap();

    assert_eq!(harness.tab_names(), vec!["Main", "Extra"]);
}
