//! Shared helpers for CLI integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::{Value, json};
use tempfile::TempDir;

pub const TOKEN: &str = "jwt-session-token-0123456789";

/// Creates a temp ASSETDESK_HOME directory for test isolation.
pub fn temp_home() -> TempDir {
    TempDir::new().expect("create temp assetdesk home")
}

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

/// Writes a session file as a successful login would.
pub fn write_session(home: &Path, token: &str) {
    fs::write(
        home.join("session.json"),
        serde_json::to_string(&json!({ "token": token })).unwrap(),
    )
    .unwrap();
}

/// Returns the stored token, if any.
pub fn stored_token(home: &Path) -> Option<String> {
    let path = home.join("session.json");
    if !path.exists() {
        return None;
    }
    let session: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    session
        .get("token")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// `assetdesk` pointed at an isolated home and the given API.
pub fn assetdesk(home: &Path, base_url: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("assetdesk");
    cmd.env("ASSETDESK_HOME", home)
        .env("ASSETDESK_BASE_URL", base_url)
        .env_remove("ASSETDESK_LOG");
    cmd
}

pub fn locations() -> Value {
    json!([
        {"id": 1, "address": "Main office, room 101", "type": "office"},
        {"id": 2, "address": "Warehouse B", "type": "warehouse"}
    ])
}
