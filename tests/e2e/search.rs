use crate::common::harness::DashboardTestHarness;
use repodash::view::prompt::PromptKind;

/// `/pattern<Enter>` selects the next matching row
#[test]
fn test_forward_search() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys("/release<Enter>").unwrap();
    assert!(!harness.is_prompting());
    harness.assert_screen_contains("(4/6)");
}

/// n and N repeat the last search in either direction, wrapping around
#[test]
fn test_repeat_search() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    // HEAD (row 1) points at refs/heads/main, so it matches too
    harness.type_keys("/main<Enter>").unwrap();
    harness.assert_screen_contains("(3/6)");

    harness.type_keys("n").unwrap();
    harness.assert_screen_contains("(5/6)");

    harness.type_keys("n").unwrap();
    harness.assert_screen_contains("(1/6)");

    harness.type_keys("N").unwrap();
    harness.assert_screen_contains("(5/6)");
}

/// `?pattern<Enter>` searches backwards
#[test]
fn test_reverse_search() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys("?feature<Enter>").unwrap();
    harness.assert_screen_contains("(2/6)");

    harness.type_keys("?tag<Enter>").unwrap();
    harness.assert_screen_contains("(6/6)");
}

/// A pattern with no match reports it and keeps the selection
#[test]
fn test_search_without_match() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();
    harness.type_keys("j").unwrap();

    harness.type_keys("/nothing-here<Enter>").unwrap();
    harness.assert_screen_contains("(2/6)");
    assert_eq!(
        harness.status_message(),
        Some("Pattern not found: nothing-here")
    );
}

/// An invalid pattern is an error, and the dashboard keeps working
#[test]
fn test_invalid_pattern() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    let result = harness.send_keys("/[unclosed<Enter>");
    assert!(result.is_err());
    assert!(!harness.is_prompting());

    harness.type_keys("j").unwrap();
    harness.assert_screen_contains("(2/6)");
}

/// Without a previous search, n says so
#[test]
fn test_repeat_without_search() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();
    harness.type_keys("n").unwrap();
    assert_eq!(harness.status_message(), Some("No previous search"));
}

/// Keys typed after the prompt key are read by the prompt, and the prompt
/// stays open until it is submitted
#[test]
fn test_prompt_reads_following_keys() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys("/rel").unwrap();
    assert_eq!(harness.prompt_kind(), Some(PromptKind::Search));
    assert!(harness.get_status_bar().starts_with("/rel"));
    // `j` is text while the prompt is open
    harness.type_keys("j").unwrap();
    assert!(harness.get_status_bar().starts_with("/relj"));

    harness.type_keys("<Backspace><Enter>").unwrap();
    assert!(!harness.is_prompting());
    harness.assert_screen_contains("(4/6)");
}

/// <Esc> cancels the prompt without searching
#[test]
fn test_cancel_prompt() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();
    harness.type_keys("/release<Esc>").unwrap();
    assert!(!harness.is_prompting());
    harness.assert_screen_contains("(1/6)");
    assert!(harness.get_status_bar().starts_with("[1:Main]"));
}

/// A prompt closed from outside (SIGTSTP) discards its line and later
/// keys resolve normally
#[test]
fn test_prompt_cancelled_from_outside() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();
    assert!(!harness.cancel_prompt().unwrap());

    harness.type_keys("/release").unwrap();
    assert!(harness.is_prompting());
    assert!(harness.cancel_prompt().unwrap());
    assert!(!harness.is_prompting());

    harness.type_keys("G").unwrap();
    harness.assert_screen_contains("(6/6)");
    harness.type_keys("n").unwrap();
    assert_eq!(harness.status_message(), Some("No previous search"));
}

/// A filter hides non-matching rows until it is removed
#[test]
fn test_filter() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys("<C-q>branch<Enter>").unwrap();
    harness.assert_screen_contains("(1/3)");
    harness.assert_screen_contains("filter: branch");
    harness.assert_screen_not_contains("origin/main");

    harness.type_keys("<C-r>").unwrap();
    harness.assert_screen_contains("(1/6)");
    harness.assert_screen_contains("origin/main");
}

/// Search runs over the filtered rows only
#[test]
fn test_search_within_filter() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys("<C-q>branch<Enter>/release<Enter>").unwrap();
    harness.assert_screen_contains("(3/3)");
}
