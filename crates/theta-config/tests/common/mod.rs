//! Shared fixtures for resolution tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use theta_config::ConfigResolver;
use tracing::field::{Field, Visit};
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// A config directory plus an in-memory environment.
pub struct Fixture {
    dir: TempDir,
    env: HashMap<String, String>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            env: HashMap::new(),
        }
    }

    /// Fixture with a base file holding `base`.
    pub fn with_base(base: &str) -> Self {
        let fixture = Self::new();
        fixture.file("config.json", base);
        fixture
    }

    pub fn file(&self, name: &str, contents: &str) -> &Self {
        fs::write(self.dir.path().join(name), contents).unwrap();
        self
    }

    /// Remove every permission bit from `name`.
    ///
    /// Returns `false` if the file is still readable, as it is for root.
    #[cfg(unix)]
    pub fn make_unreadable(&self, name: &str) -> bool {
        use std::os::unix::fs::PermissionsExt;

        let path = self.dir.path().join(name);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();
        fs::read(&path).is_err()
    }

    pub fn dotenv(&self, contents: &str) -> &Self {
        self.file(".env", contents)
    }

    pub fn set_env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn resolver(&self) -> ConfigResolver {
        ConfigResolver::new()
            .with_config_dir(self.dir.path())
            .with_dotenv_path(self.dir.path().join(".env"))
            .with_env_source(self.env.clone())
    }
}

/// One recorded event.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: HashMap<String, String>,
}

/// Layer that records every event it sees.
#[derive(Clone, Default)]
pub struct CapturedEvents(Arc<Mutex<Vec<CapturedEvent>>>);

impl CapturedEvents {
    pub fn dispatch(&self) -> Dispatch {
        Dispatch::new(tracing_subscriber::registry().with(self.clone()))
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn at(&self, level: Level) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.level == level)
            .collect()
    }
}

impl<S: Subscriber> Layer<S> for CapturedEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut recorder = Recorder::default();
        event.record(&mut recorder);
        self.0.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: recorder.message,
            fields: recorder.fields,
        });
    }
}

#[derive(Default)]
struct Recorder {
    message: String,
    fields: HashMap<String, String>,
}

impl Visit for Recorder {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let rendered = format!("{value:?}");
        if field.name() == "message" {
            self.message = rendered;
        } else {
            self.fields.insert(field.name().to_string(), rendered);
        }
    }
}
