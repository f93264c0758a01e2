use crate::common::harness::DashboardTestHarness;
use repodash::input::actions::{Action, ActionArg, ActionType, MenuEntry};
use repodash::view::ViewId;

/// <C-Space> opens the context menu of the selected row
#[test]
fn test_context_menu_opens_over_the_view() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys("<C-Space>").unwrap();
    assert_eq!(harness.popup_count(), 1);
    assert_eq!(harness.active_hierarchy(), vec![ViewId::ContextMenu]);
    harness.assert_screen_contains(" Menu ");
    harness.assert_screen_contains("Show HEAD");
    harness.assert_screen_contains("Browse files");
    // The view below stays visible
    harness.assert_screen_contains("(1/6)");
}

/// While a popup is open, keys go to the popup and nothing below it
#[test]
fn test_popup_isolates_input() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();
    harness.type_keys("<C-Space>").unwrap();

    harness.type_keys("jG<Tab>").unwrap();
    harness.assert_screen_contains("(1/6)");
    assert_eq!(harness.active_view(), Some(ViewId::Refs));

    // Exit is swallowed by the menu too
    harness.type_keys("Q").unwrap();
    assert!(!harness.should_quit());
    assert_eq!(harness.popup_count(), 1);
}

/// <Esc> and q close the menu without running anything
#[test]
fn test_dismiss_popup() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys("<C-Space><Esc>").unwrap();
    assert_eq!(harness.popup_count(), 0);
    harness.assert_screen_not_contains(" Menu ");

    harness.type_keys("<C-Space>q").unwrap();
    assert_eq!(harness.popup_count(), 0);
    // `q` closed the menu, not the ref view
    assert_eq!(harness.active_view(), Some(ViewId::Refs));

    // Focus is back on the view
    harness.type_keys("j").unwrap();
    harness.assert_screen_contains("(2/6)");
}

/// Selecting an entry closes the menu, then runs the entry's action
#[test]
fn test_select_menu_entry() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys("<C-Space><Enter>").unwrap();
    assert_eq!(harness.popup_count(), 0);
    assert!(harness
        .status_message()
        .is_some_and(|m| m.starts_with("head")));

    // "Browse files" adds a focused file view to the tab
    harness.type_keys("<C-Space>j<Enter>").unwrap();
    assert_eq!(harness.popup_count(), 0);
    assert_eq!(harness.active_view(), Some(ViewId::Files));
    let leaves = harness
        .dashboard()
        .current_tab()
        .unwrap()
        .root()
        .leaf_paths();
    assert_eq!(leaves.len(), 3);
}

/// Popups stack; closing the top one gives focus to the one below
#[test]
fn test_nested_popups() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();
    harness.type_keys("<C-Space>").unwrap();

    let nested = Action::with_args(
        ActionType::CreateContextMenu,
        vec![ActionArg::Menu(vec![MenuEntry::new(
            "Nested entry",
            Action::status("from nested"),
        )])],
    );
    harness.dispatch(nested).unwrap();
    harness.render().unwrap();
    assert_eq!(harness.popup_count(), 2);
    harness.assert_screen_contains("Nested entry");

    harness.type_keys("<Esc>").unwrap();
    assert_eq!(harness.popup_count(), 1);
    harness.assert_screen_contains("Show HEAD");
    harness.assert_screen_not_contains("Nested entry");

    harness.type_keys("<Esc>").unwrap();
    assert_eq!(harness.popup_count(), 0);
    assert_eq!(harness.active_view(), Some(ViewId::Refs));
}

/// The prompt still opens while a popup is shown
#[test]
fn test_prompt_passes_popups() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();
    harness.type_keys("<C-Space>:").unwrap();
    assert!(harness.is_prompting());
    harness.assert_screen_contains(":");

    harness.type_keys("<Esc>").unwrap();
    assert!(!harness.is_prompting());
    assert_eq!(harness.popup_count(), 1);
}
