use crate::common::harness::DashboardTestHarness;
use repodash::view::ViewId;

/// <F1> opens the key bindings in a Help tab
#[test]
fn test_help_tab_lists_bindings() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys("<F1>").unwrap();
    assert_eq!(harness.tab_names(), vec!["Main", "Help"]);
    assert_eq!(harness.active_view(), Some(ViewId::Help));
    harness.assert_screen_contains("Key bindings");
    harness.assert_screen_contains("search-prompt");
    harness.assert_screen_contains("next-page");

    // Built-in commands follow the bindings
    harness.type_keys("G").unwrap();
    harness.assert_screen_contains(":help");
}

/// Opening help twice reuses the tab
#[test]
fn test_help_tab_is_reused() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys("<F1>gt").unwrap();
    assert_eq!(harness.dashboard().current_tab_index(), 0);

    harness.type_keys(":help<Enter>").unwrap();
    assert_eq!(harness.tab_names(), vec!["Main", "Help"]);
    assert_eq!(harness.dashboard().current_tab_index(), 1);
}

/// The help view shows bindings added at runtime
#[test]
fn test_help_shows_runtime_bindings() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys(":map RefView zq G<Enter><F1>").unwrap();
    // The help list can be searched like any other view
    harness.type_keys("/remap to G<Enter>").unwrap();
    harness.assert_screen_contains("remap to G");
}

/// <Esc> closes the help view and its tab
#[test]
fn test_escape_closes_help() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys("<F1><Esc>").unwrap();
    assert_eq!(harness.tab_names(), vec!["Main"]);
    assert_eq!(harness.active_view(), Some(ViewId::Refs));
    assert!(!harness.should_quit());
}
