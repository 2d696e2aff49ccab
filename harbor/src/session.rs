//! Saved session state: where the user left off, restored on launch.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub path: String,
    pub sort_by_time: bool,
    pub show_preview: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            path: String::new(),
            sort_by_time: false,
            show_preview: true,
        }
    }
}

fn session_path() -> PathBuf {
    harborcore::storage::config_dir().join("session.json")
}

impl Session {
    pub fn load() -> Option<Session> {
        let text = fs::read_to_string(session_path()).ok()?;
        serde_json::from_str(&text).ok()
    }

    pub fn save(&self) {
        let path = session_path();
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(err) = fs::write(&path, json) {
                    log::warn!("failed to save session: {err}");
                }
            }
            Err(err) => log::warn!("failed to serialize session: {err}"),
        }
    }
}
