// SPDX-License-Identifier: MIT
//
// Persisted login identity. The chat core only ever reads this; it is
// written by `gitabot login` and removed by `gitabot logout`.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;

/// Display name used when nobody is logged in, matching the backend's
/// greeting persona.
pub(crate) const DEFAULT_USER_NAME: &str = "Parth";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Session {
    pub user_id: String,
    pub user_name: String,
    pub saved_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new(user_id: String, user_name: String) -> Self {
        Self {
            user_id,
            user_name,
            saved_at: Utc::now(),
        }
    }
}

fn session_path() -> Result<PathBuf> {
    Ok(Config::config_dir()?.join("session.json"))
}

/// Load the saved session, if any. Corrupt or missing files both read as
/// "not logged in".
pub(crate) fn load() -> Option<Session> {
    let path = session_path().ok()?;
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

pub(crate) fn save(session: &Session) -> Result<()> {
    let dir = Config::config_dir()?;
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }
    let content = serde_json::to_string_pretty(session)?;
    fs::write(session_path()?, content)?;
    Ok(())
}

pub(crate) fn clear() -> Result<()> {
    let path = session_path()?;
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}
