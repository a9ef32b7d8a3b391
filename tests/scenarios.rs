use std::fs;
use std::sync::Arc;

use sshq::app::AppState;
use sshq::settings::{MemorySettings, SettingsStore, TemplateKey, Templates};
use sshq::ssh::ConfigScanner;
use sshq::template::{DEFAULT_LOCAL_TEMPLATE, DEFAULT_REMOTE_TEMPLATE};
use tempfile::TempDir;

fn app_for(config: &str) -> (TempDir, AppState) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config");
    fs::write(&path, config).unwrap();

    let app = AppState::with_scanner(
        ConfigScanner::new().with_home(temp.path()),
        vec![path.to_string_lossy().into_owned()],
        Templates::in_memory(),
        None,
    );
    (temp, app)
}

// ============================================================================
// End-to-end queries
// ============================================================================

#[test]
fn test_web_prefix_without_trigger() {
    let (_temp, app) = app_for("Host web01 web02\nHost db01\n");

    let results = app.handle_query("web", false);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "web01");
    assert_eq!(results[1].id, "web02");
    assert_eq!(
        results[0].actions[0].command,
        r#"ssh -t web01 '$SHELL -i -c "true ; exec $SHELL" || true' || exec $SHELL"#
    );
    assert_eq!(
        results[1].actions[0].command,
        r#"ssh -t web02 '$SHELL -i -c "true ; exec $SHELL" || true' || exec $SHELL"#
    );
    assert!((results[0].score - 0.6).abs() < 1e-9);
}

#[test]
fn test_user_and_script_in_triggered_context() {
    let (_temp, app) = app_for("Host web01 web02\nHost db01\n");

    let results = app.handle_query("alice@web01 uptime", true);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "web01");
    assert_eq!(results[0].score, 1.0);
    let command = &results[0].actions[0].command;
    assert!(command.starts_with("ssh -t alice@web01 "));
    assert!(command.contains(r#""uptime ; exec $SHELL""#));
    assert!(!command.contains("true ; exec"));
}

#[test]
fn test_script_without_trigger_is_rejected() {
    let (_temp, app) = app_for("Host web01 web02\n");

    assert!(app.handle_query("web01 uptime", false).is_empty());
}

#[test]
fn test_uppercase_query_matches() {
    let (_temp, app) = app_for("Host web01\n");

    let results = app.handle_query("WEB", false);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "web01");
}

// ============================================================================
// Config scanning through the launcher
// ============================================================================

#[test]
fn test_hosts_from_home_relative_include() {
    let (temp, _) = app_for("");
    fs::create_dir_all(temp.path().join(".ssh")).unwrap();
    fs::write(temp.path().join(".ssh/extra"), "Host hidden01 build-*\n").unwrap();
    let path = temp.path().join("main");
    fs::write(&path, "Include ~/.ssh/extra\nHost visible\n").unwrap();

    let app = AppState::with_scanner(
        ConfigScanner::new().with_home(temp.path()),
        vec![path.to_string_lossy().into_owned()],
        Templates::in_memory(),
        None,
    );

    let hosts = app.hosts();
    assert!(hosts.contains("hidden01"));
    assert!(hosts.contains("visible"));
    assert!(!hosts.iter().any(|h| h.contains('*')));
}

// ============================================================================
// Template settings
// ============================================================================

#[test]
fn test_reset_round_trip_restores_defaults() {
    let store = Arc::new(MemorySettings::new());
    let templates = Templates::new(store.clone());

    templates.set(TemplateKey::Local, "custom %1 %2").unwrap();
    templates.set(TemplateKey::Remote, "custom %1").unwrap();
    templates.set(TemplateKey::Local, "").unwrap();
    templates.reset(TemplateKey::Remote).unwrap();

    assert_eq!(templates.get(TemplateKey::Local), DEFAULT_LOCAL_TEMPLATE);
    assert_eq!(templates.get(TemplateKey::Remote), DEFAULT_REMOTE_TEMPLATE);
    assert_eq!(store.get(TemplateKey::Local), None);
    assert_eq!(store.get(TemplateKey::Remote), None);
}
