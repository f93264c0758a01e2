use crate::common::git_test_helper::GitTestRepo;
use crate::common::harness::DashboardTestHarness;
use repodash::config::{Config, KeyBindingConfig};

fn binding(view: &str, keys: &str, action: Option<&str>, remap: Option<&str>) -> KeyBindingConfig {
    KeyBindingConfig {
        view: view.to_string(),
        keys: keys.to_string(),
        action: action.map(str::to_string),
        remap: remap.map(str::to_string),
    }
}

fn harness_with(bindings: Vec<KeyBindingConfig>) -> DashboardTestHarness {
    let config = Config {
        keybindings: bindings,
        ..Config::default()
    };
    DashboardTestHarness::with_config(GitTestRepo::with_sample_content(), config, 120, 30).unwrap()
}

/// A remap expands to its keys, which resolve like typed keys
#[test]
fn test_remap_expands_to_keys() {
    let mut harness = harness_with(vec![binding("All", "J", None, Some("jj"))]);

    harness.type_keys("J").unwrap();
    harness.assert_screen_contains("(3/6)");
}

/// A remap can target a chord, and a chord can be remapped
#[test]
fn test_remap_to_and_from_chords() {
    let mut harness = harness_with(vec![
        binding("All", "T", None, Some("gt")),
        binding("All", "<C-w>j", None, Some("G")),
    ]);

    harness.type_keys(":addtab Second<Enter>T").unwrap();
    assert_eq!(harness.dashboard().current_tab_index(), 0);

    harness.type_keys("<C-w>j").unwrap();
    harness.assert_screen_contains("(6/6)");
}

/// Bindings in a view's own scope win over global ones
#[test]
fn test_view_scope_overrides_global() {
    let mut harness = harness_with(vec![binding("FileView", "j", Some("last-line"), None)]);

    // Global `j` in the ref view
    harness.type_keys("j").unwrap();
    harness.assert_screen_contains("(2/6)");

    // Scoped `j` in the file view
    harness.type_keys("<Tab>j").unwrap();
    harness.assert_screen_contains("Files (4/4)");
}

/// An entry with neither action nor remap removes a default binding
#[test]
fn test_config_removes_binding() {
    let mut harness = harness_with(vec![binding("All", "Q", None, None)]);
    harness.type_keys("Q").unwrap();
    assert!(!harness.should_quit());
}

/// Remaps that never terminate are cut off and the input is discarded
#[test]
fn test_remap_loop_is_bounded() {
    let mut harness = harness_with(vec![
        binding("All", "a", None, Some("b")),
        binding("All", "b", None, Some("a")),
    ]);

    harness.type_keys("aj").unwrap();
    assert_eq!(harness.errors().len(), 1);
    assert!(harness.errors()[0].starts_with("Remap limit exceeded for "));
    assert!(harness
        .status_message()
        .is_some_and(|m| m.starts_with("Remap limit exceeded")));
    // The `j` typed after the loop was discarded with it
    harness.assert_screen_contains("(1/6)");

    // Later input works again
    harness.type_keys("j").unwrap();
    harness.assert_screen_contains("(2/6)");
}

/// A remap whose expansion grows stays bounded as well
#[test]
fn test_growing_remap_is_bounded() {
    let mut harness = harness_with(vec![binding("All", "x", None, Some("xj"))]);

    harness.type_keys("x").unwrap();
    assert_eq!(harness.errors().len(), 1);
    assert!(harness.errors()[0].starts_with("Remap limit exceeded"));
    harness.assert_screen_contains("(1/6)");

    // Each overflow is reported once
    harness.type_keys("x").unwrap();
    assert_eq!(harness.errors().len(), 2);
}

/// `:map` adds a remap at runtime and `:unmap` removes it
#[test]
fn test_map_command() {
    let mut harness = DashboardTestHarness::new(120, 30).unwrap();

    harness.type_keys(":map All x G<Enter>x").unwrap();
    harness.assert_screen_contains("(6/6)");

    harness.type_keys(":unmap All x<Enter>gg").unwrap();
    harness.type_keys("x").unwrap();
    harness.assert_screen_contains("(1/6)");

    harness.type_keys(":unmap All x<Enter>").unwrap();
    assert_eq!(harness.status_message(), Some("No binding for x in All"));
}
