//! End-to-end resolution tests.
//!
//! These tests build real config directories and check how the layers
//! combine:
//!
//! 1. Defaults
//! 2. Base file
//! 3. Mode file
//! 4. Local file
//! 5. Dotenv file
//! 6. Process environment

mod common;

use common::{CapturedEvents, Fixture};
use theta_config::{ConfigError, Environment, LayerOutcome, Source, ThetaConfig};
use tracing::Level;

// ============================================================================
// Concrete scenarios
// ============================================================================

#[test]
fn test_base_file_only() {
    let fixture = Fixture::with_base(r#"{"server": {"port": 8080}}"#);

    let config = fixture.resolver().resolve().unwrap();

    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.host, "localhost");
    assert_eq!(config.environment, Environment::Development);
}

#[test]
fn test_mode_file_beats_base_file() {
    let mut fixture = Fixture::with_base(r#"{"logger": {"level": "debug"}}"#);
    fixture.file("config.staging.json", r#"{"logger": {"level": "warn"}}"#);
    fixture.set_env("ENVIRONMENT", "staging");

    let config = fixture.resolver().resolve().unwrap();

    assert_eq!(config.logger.level, "warn");
    assert_eq!(config.environment, Environment::Staging);
}

#[test]
fn test_environment_beats_all_files() {
    let mut fixture = Fixture::with_base(r#"{"logger": {"level": "debug"}}"#);
    fixture
        .file("config.staging.json", r#"{"logger": {"level": "warn"}}"#)
        .file("config.local.json", r#"{"logger": {"level": "info"}}"#)
        .dotenv("SLOG_LEVEL=trace\n");
    fixture
        .set_env("ENVIRONMENT", "staging")
        .set_env("SLOG_LEVEL", "error");

    let resolution = fixture.resolver().resolve_with_report().unwrap();

    assert_eq!(resolution.config.logger.level, "error");
    assert_eq!(
        resolution.overrides.source_of("logger.level"),
        Some(Source::ProcessEnvironment)
    );
}

#[test]
fn test_dotenv_beats_base_file() {
    let fixture = Fixture::with_base(r#"{"server": {"port": 8080}}"#);
    fixture.dotenv("SERVER_PORT=9090\n");

    let resolution = fixture.resolver().resolve_with_report().unwrap();

    assert_eq!(resolution.config.server.port, 9090);
    assert_eq!(resolution.dotenv_entries, 1);
    assert_eq!(
        resolution.overrides.source_of("server.port"),
        Some(Source::DotenvFile)
    );
}

#[test]
fn test_bad_override_keeps_file_value_and_warns() {
    let mut fixture = Fixture::with_base(r#"{"server": {"port": 8080}}"#);
    fixture.set_env("SERVER_PORT", "not-a-number");
    let captured = CapturedEvents::default();

    let resolution = fixture
        .resolver()
        .with_dispatch(captured.dispatch())
        .resolve_with_report()
        .unwrap();

    assert_eq!(resolution.config.server.port, 8080);
    assert_eq!(resolution.overrides.rejected.len(), 1);
    assert_eq!(resolution.overrides.rejected[0].field, "server.port");

    let warning = captured
        .at(Level::WARN)
        .into_iter()
        .find(|event| event.fields.get("env").map(String::as_str) == Some("SERVER_PORT"))
        .expect("a warning naming SERVER_PORT");
    assert_eq!(warning.fields["field"], "server.port");
    assert_eq!(warning.fields["source"], "env");
    assert_eq!(warning.fields["value"], "not-a-number");
}

#[test]
fn test_missing_base_file_is_fatal() {
    let mut fixture = Fixture::new();
    fixture
        .file("config.development.json", r#"{"server": {"port": 1}}"#)
        .dotenv("SERVER_PORT=9090\n");
    fixture.set_env("SLOG_LEVEL", "error");

    let err = fixture.resolver().resolve().unwrap_err();

    assert!(matches!(err, ConfigError::FileNotFound { .. }));
    assert!(err.to_string().contains("config.json"));
}

// ============================================================================
// Layer handling
// ============================================================================

#[cfg(unix)]
#[test]
fn test_unreadable_base_file_is_fatal() {
    let fixture = Fixture::with_base("{}");
    if !fixture.make_unreadable("config.json") {
        return;
    }

    let err = fixture.resolver().resolve().unwrap_err();

    assert!(matches!(err, ConfigError::PermissionDenied { .. }));
    assert!(err.to_string().contains("config.json"));
}

#[cfg(unix)]
#[test]
fn test_unreadable_mode_file_is_skipped() {
    let mut fixture = Fixture::with_base(r#"{"server": {"port": 8080}}"#);
    fixture.file("config.staging.json", r#"{"server": {"port": 1}}"#);
    fixture.set_env("ENVIRONMENT", "staging");
    if !fixture.make_unreadable("config.staging.json") {
        return;
    }
    let captured = CapturedEvents::default();

    let resolution = fixture
        .resolver()
        .with_dispatch(captured.dispatch())
        .resolve_with_report()
        .unwrap();

    assert_eq!(resolution.mode, Environment::Staging);
    assert_eq!(resolution.config.server.port, 8080);
    assert!(matches!(
        resolution.layer(Source::EnvironmentFile).unwrap().outcome,
        LayerOutcome::Skipped { .. }
    ));
    let warning = captured
        .at(Level::WARN)
        .into_iter()
        .find(|event| event.fields.get("source").map(String::as_str) == Some("environment_file"))
        .expect("a warning for the mode file");
    assert_eq!(
        warning.message,
        "Skipping configuration file that could not be loaded"
    );
}

#[test]
fn test_malformed_base_file_is_fatal() {
    let fixture = Fixture::with_base(r#"{"server": {"port": 8080"#);
    let err = fixture.resolver().resolve().unwrap_err();
    assert!(err.is_parse_error());
}

#[test]
fn test_mistyped_base_file_is_fatal() {
    let fixture = Fixture::with_base(r#"{"server": {"port": "8080"}}"#);
    let err = fixture.resolver().resolve().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn test_malformed_mode_file_is_skipped() {
    let mut fixture = Fixture::with_base(r#"{"server": {"port": 8080}}"#);
    fixture.file("config.production.json", "{ not json");
    fixture.set_env("ENVIRONMENT", "production");
    let captured = CapturedEvents::default();

    let resolution = fixture
        .resolver()
        .with_dispatch(captured.dispatch())
        .resolve_with_report()
        .unwrap();

    assert_eq!(resolution.config.server.port, 8080);
    assert!(matches!(
        resolution.layer(Source::EnvironmentFile).unwrap().outcome,
        LayerOutcome::Skipped { .. }
    ));
    assert!(captured
        .at(Level::WARN)
        .iter()
        .any(|event| event.fields.get("source").map(String::as_str) == Some("environment_file")));
}

#[test]
fn test_mistyped_mode_file_does_not_partially_apply() {
    let mut fixture = Fixture::with_base("{}");
    fixture.file(
        "config.test.json",
        r#"{"logger": {"level": "info"}, "server": {"port": -1}}"#,
    );
    fixture.set_env("ENVIRONMENT", "test");

    let config = fixture.resolver().resolve().unwrap();

    assert_eq!(config.logger.level, "debug");
    assert_eq!(config.server.port, 8080);
}

#[test]
fn test_missing_optional_files() {
    let fixture = Fixture::with_base("{}");
    let captured = CapturedEvents::default();

    let resolution = fixture
        .resolver()
        .with_dispatch(captured.dispatch())
        .resolve_with_report()
        .unwrap();

    assert_eq!(
        resolution.layer(Source::EnvironmentFile).unwrap().outcome,
        LayerOutcome::NotFound
    );
    assert_eq!(
        resolution.layer(Source::LocalFile).unwrap().outcome,
        LayerOutcome::NotFound
    );

    // The local file is expected to be absent and is not worth a warning.
    let warned = captured.at(Level::WARN);
    assert!(warned
        .iter()
        .any(|event| event.fields.get("source").map(String::as_str) == Some("environment_file")));
    assert!(!warned
        .iter()
        .any(|event| event.fields.get("source").map(String::as_str) == Some("local_file")));
}

#[test]
fn test_local_file_beats_mode_file() {
    let mut fixture = Fixture::with_base(r#"{"test": {"label_def": "base"}}"#);
    fixture
        .file(
            "config.development.json",
            r#"{"test": {"label_def": "mode", "label_env": "mode"}}"#,
        )
        .file("config.local.json", r#"{"test": {"label_def": "local"}}"#);
    fixture.set_env("ENVIRONMENT", "development");

    let config = fixture.resolver().resolve().unwrap();

    assert_eq!(config.test.label_def, "local");
    assert_eq!(config.test.label_env, "mode");
}

#[test]
fn test_invalid_mode_falls_back_with_warning() {
    let mut fixture = Fixture::with_base("{}");
    fixture.file("config.development.json", r#"{"test": {"label_env": "dev"}}"#);
    fixture.set_env("ENVIRONMENT", "qa");
    let captured = CapturedEvents::default();

    let resolution = fixture
        .resolver()
        .with_dispatch(captured.dispatch())
        .resolve_with_report()
        .unwrap();

    assert_eq!(resolution.mode, Environment::Development);
    assert_eq!(resolution.config.test.label_env, "dev");
    assert!(captured
        .at(Level::WARN)
        .iter()
        .any(|event| event.fields.get("var").map(String::as_str) == Some("ENVIRONMENT")));
}

#[test]
fn test_mode_name_is_case_sensitive() {
    let mut fixture = Fixture::with_base("{}");
    fixture.file("config.production.json", r#"{"server": {"port": 1234}}"#);
    fixture.set_env("ENVIRONMENT", "PRODUCTION");
    let captured = CapturedEvents::default();

    let resolution = fixture
        .resolver()
        .with_dispatch(captured.dispatch())
        .resolve_with_report()
        .unwrap();

    assert_eq!(resolution.mode, Environment::Development);
    assert_eq!(resolution.config.server.port, 8080);
    let warning = captured
        .at(Level::WARN)
        .into_iter()
        .find(|event| event.fields.get("var").map(String::as_str) == Some("ENVIRONMENT"))
        .expect("a warning naming ENVIRONMENT");
    assert_eq!(warning.fields["value"], "PRODUCTION");
}

#[test]
fn test_file_cannot_select_mode() {
    let fixture = Fixture::with_base(r#"{"environment": "production"}"#);
    fixture.file("config.production.json", r#"{"server": {"port": 1}}"#);

    let config = fixture.resolver().resolve().unwrap();

    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.server.port, 8080);
}

#[test]
fn test_dispatch_receives_resolution_events() {
    let fixture = Fixture::with_base("{}");
    let captured = CapturedEvents::default();

    fixture
        .resolver()
        .with_dispatch(captured.dispatch())
        .resolve()
        .unwrap();

    let info = captured.at(Level::INFO);
    assert!(info.iter().any(|event| event.message == "Configuration resolved"));
}

#[test]
fn test_unset_override_logged_at_debug() {
    let fixture = Fixture::with_base("{}");
    let captured = CapturedEvents::default();

    fixture
        .resolver()
        .with_dispatch(captured.dispatch())
        .resolve()
        .unwrap();

    let debug = captured.at(Level::DEBUG);
    let event = debug
        .iter()
        .find(|event| {
            event.message == "No override found for field"
                && event.fields.get("env").map(String::as_str) == Some("SERVER_PORT")
        })
        .expect("a debug event for SERVER_PORT");
    assert_eq!(event.fields["field"], "server.port");
}

#[test]
fn test_secret_never_logged() {
    let mut fixture = Fixture::with_base("{}");
    fixture
        .set_env("DATABASE_PASSWORD", "hunter2")
        .set_env("DATABASE_USER", "admin");
    let captured = CapturedEvents::default();

    let config = fixture
        .resolver()
        .with_dispatch(captured.dispatch())
        .resolve()
        .unwrap();

    assert_eq!(config.database.password, "hunter2");
    for event in captured.events() {
        assert!(!event.message.contains("hunter2"));
        assert!(event.fields.values().all(|value| !value.contains("hunter2")));
    }
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_fallback_chain() {
    let mut fixture = Fixture::with_base(
        r#"{"test": {"label_def": "file", "label_env": "file", "label_override": "file"}}"#,
    );
    fixture.dotenv("TEST_LABEL_ENV=dotenv\nTEST_LABEL_OVERRIDE=dotenv\n");
    fixture.set_env("TEST_LABEL_OVERRIDE", "env");

    let config = fixture.resolver().resolve().unwrap();

    assert_eq!(config.test.label_def, "file");
    assert_eq!(config.test.label_env, "dotenv");
    assert_eq!(config.test.label_override, "env");
}

#[test]
fn test_omitted_keys_preserved_across_layers() {
    let mut fixture = Fixture::with_base(
        r#"{"server": {"port": 8181, "host": "base.local", "read_timeout": 5}}"#,
    );
    fixture.file("config.test.json", r#"{"server": {"host": "mode.local"}}"#);
    fixture.set_env("ENVIRONMENT", "test");

    let config = fixture.resolver().resolve().unwrap();

    assert_eq!(config.server.host, "mode.local");
    assert_eq!(config.server.port, 8181);
    assert_eq!(config.server.read_timeout, 5);
    assert_eq!(config.server.write_timeout, 30);
}

#[test]
fn test_resolution_is_idempotent() {
    let mut fixture = Fixture::with_base(r#"{"server": {"port": 8080}}"#);
    fixture
        .file("config.local.json", r#"{"database": {"atlas": {"enabled": true}}}"#)
        .dotenv("DATABASE_ATLAS_APP_NAME=theta\n");
    fixture.set_env("SLOG_FORMAT", "json");

    let resolver = fixture.resolver();
    let first = resolver.resolve().unwrap();
    let second = resolver.resolve().unwrap();

    assert_eq!(first, second);
    assert_ne!(first, ThetaConfig::default());
}
