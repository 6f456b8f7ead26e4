//! Test helpers: build the router against a fake slicing engine.
//!
//! The engine is `/bin/sh` running a script from `SLICER_EXTRA_ARGS`, so the
//! tests never need a real slicer installed.

#![allow(dead_code)]

pub mod engines;
pub mod fixtures;

use axum_test::TestServer;
use printquote_api::constants;
use printquote_api::setup::{routes, services};
use printquote_api::AppState;
use printquote_core::Config;
use printquote_db::InMemoryUploadRepository;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus the resources it owns.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub repository: InMemoryUploadRepository,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn work_dir(&self) -> &Path {
        self.temp_dir.path()
    }
}

/// Settings for one test app.
pub struct TestAppOptions {
    /// Body of the fake engine script.
    pub engine_script: &'static str,
    /// Overrides `SLICER_PATH`; defaults to `/bin/sh`.
    pub slicer_path: Option<String>,
    pub extra_env: Vec<(&'static str, String)>,
}

impl Default for TestAppOptions {
    fn default() -> Self {
        Self {
            engine_script: engines::CUBE,
            slicer_path: None,
            extra_env: Vec::new(),
        }
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestAppOptions::default()).await
}

pub async fn setup_test_app_with(options: TestAppOptions) -> TestApp {
    let temp_dir = TempDir::new().expect("temp dir");
    let work = temp_dir.path().join("work");
    let profiles = temp_dir.path().join("profiles");
    std::fs::create_dir_all(&work).expect("work dir");
    fixtures::write_profiles(&profiles);

    let script = temp_dir.path().join("engine.sh");
    std::fs::write(&script, options.engine_script).expect("engine script");

    let mut vars: HashMap<String, String> = HashMap::from([
        ("TEMP_DIR".to_string(), work.display().to_string()),
        (
            "SLICER_PATH".to_string(),
            options.slicer_path.unwrap_or_else(|| "/bin/sh".to_string()),
        ),
        ("SLICER_EXTRA_ARGS".to_string(), script.display().to_string()),
        ("SLICER_PROFILES_DIR".to_string(), profiles.display().to_string()),
        ("SLICER_TIMEOUT_MS".to_string(), "10000".to_string()),
        ("SWEEP_INTERVAL_SECS".to_string(), "0".to_string()),
        ("MAX_UPLOAD_SIZE_MB".to_string(), "1".to_string()),
    ]);
    for (key, value) in options.extra_env {
        vars.insert(key.to_string(), value);
    }

    let config = Config::from_lookup(|key| vars.get(key).cloned()).expect("config");
    let repository = InMemoryUploadRepository::new();
    let state = services::initialize_services_with_repository(&config, Arc::new(repository.clone()))
        .await
        .expect("services");
    let router = routes::setup_routes(&config, state.clone()).expect("routes");
    let server = TestServer::new(router).expect("test server");

    TestApp {
        server,
        state,
        repository,
        temp_dir,
    }
}
