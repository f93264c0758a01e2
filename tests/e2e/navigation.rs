use crate::common::git_test_helper::GitTestRepo;
use crate::common::harness::DashboardTestHarness;
use repodash::view::ViewId;

/// j/k/G/gg move the selection in the focused view
#[test]
fn test_line_movement() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys("j").unwrap();
    harness.assert_screen_contains("(2/6)");

    harness.type_keys("G").unwrap();
    harness.assert_screen_contains("(6/6)");

    // Moving past the end stays on the last row
    harness.type_keys("jj").unwrap();
    harness.assert_screen_contains("(6/6)");

    harness.type_keys("k").unwrap();
    harness.assert_screen_contains("(5/6)");

    harness.type_keys("gg").unwrap();
    harness.assert_screen_contains("(1/6)");
}

/// A lone `g` waits for the rest of the chord and shows it in the status bar
#[test]
fn test_chord_prefix_waits_for_more_keys() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();
    harness.type_keys("G").unwrap();

    harness.type_keys("g").unwrap();
    harness.assert_screen_contains("(6/6)");
    assert!(
        harness.get_status_bar().trim_end().ends_with('g'),
        "status bar: {}",
        harness.get_status_bar()
    );

    harness.type_keys("g").unwrap();
    harness.assert_screen_contains("(1/6)");
    assert!(!harness.get_status_bar().trim_end().ends_with('g'));
}

/// An unbound key after a prefix does not run the prefix's bindings
#[test]
fn test_broken_chord_is_discarded() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();
    harness.type_keys("G").unwrap();

    // `gx` is not bound; neither `gg` nor anything else runs
    harness.type_keys("gx").unwrap();
    harness.assert_screen_contains("(6/6)");
    assert!(!harness.should_quit());
}

/// <Tab> cycles focus through the views of the tab and wraps around
#[test]
fn test_view_cycling_wraps() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();
    assert_eq!(harness.active_view(), Some(ViewId::Refs));

    harness.type_keys("<Tab>").unwrap();
    assert_eq!(harness.active_view(), Some(ViewId::Files));

    harness.type_keys("<Tab>").unwrap();
    assert_eq!(harness.active_view(), Some(ViewId::Refs));

    harness.type_keys("<S-Tab>").unwrap();
    assert_eq!(harness.active_view(), Some(ViewId::Files));
}

/// Movement goes to the focused view only
#[test]
fn test_movement_follows_focus() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys("<Tab>jj").unwrap();
    harness.assert_screen_contains("Files (3/4)");
    harness.assert_screen_contains("(1/6)");
}

/// The key hierarchy starts with the focused view and ends with the tab
#[test]
fn test_active_hierarchy() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();
    assert_eq!(harness.active_hierarchy().first(), Some(&ViewId::Refs));
    assert_eq!(harness.active_hierarchy().last(), Some(&ViewId::Main));

    harness.type_keys("<Tab>").unwrap();
    assert_eq!(harness.active_hierarchy().first(), Some(&ViewId::Files));
}

/// <Enter> on a file opens a preview next to the file list
#[test]
fn test_select_file_opens_preview() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys("<Tab><Enter>").unwrap();
    assert_eq!(harness.active_view(), Some(ViewId::Preview));
    harness.assert_screen_contains("README.md (1/3)");
    harness.assert_screen_contains("# Sample");

    // Closing the preview gives focus back to a remaining view
    harness.type_keys("q").unwrap();
    harness.assert_screen_not_contains("# Sample");
    assert_ne!(harness.active_view(), Some(ViewId::Preview));
}

/// Page movement keeps the selection on screen
#[test]
fn test_paging_through_a_long_preview() {
    let repo = GitTestRepo::new();
    repo.create_numbered_file("long.txt", 200);
    let mut harness = DashboardTestHarness::with_repo(repo, 80, 24).unwrap();

    harness.type_keys("<Tab><Enter>").unwrap();
    assert_eq!(harness.active_view(), Some(ViewId::Preview));
    harness.assert_screen_contains("line 1");

    harness.type_keys("G").unwrap();
    harness.assert_screen_contains("(200/200)");
    harness.assert_screen_contains("line 200");
    harness.assert_screen_not_contains("line 1 ");

    harness.type_keys("gg").unwrap();
    harness.assert_screen_contains("(1/200)");
    harness.assert_screen_not_contains("line 200");
}

/// <C-w>o shows only the focused view, and again restores the split
#[test]
fn test_full_screen_toggle() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys("<C-w>o").unwrap();
    harness.assert_screen_contains("Refs:");
    harness.assert_screen_not_contains("Files (");

    harness.type_keys("f").unwrap();
    harness.assert_screen_contains("Files (");
}
