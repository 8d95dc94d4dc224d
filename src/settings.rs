use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// Per-user settings of the `directory-copy-step` binary.
#[derive(Serialize, Deserialize, Default, Debug)]
pub struct Settings {
    pub workflow_location: Option<PathBuf>,
}

impl Settings {
    fn path() -> Option<PathBuf> {
        ProjectDirs::from("org", "workflow", "DirectoryCopyStep")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    pub fn load() -> Self {
        if let Some(path) = Self::path() {
            if let Ok(data) = fs::read_to_string(&path) {
                match serde_json::from_str(&data) {
                    Ok(settings) => return settings,
                    Err(err) => warn!(path = %path.display(), error = %err, "ignoring unreadable settings"),
                }
            }
        }
        Self::default()
    }

    pub fn save(&self) {
        let Some(path) = Self::path() else {
            return;
        };
        let written = path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| {
                let data = serde_json::to_string_pretty(self)?;
                fs::write(&path, data)
            });
        if let Err(err) = written {
            warn!(path = %path.display(), error = %err, "could not save settings");
        }
    }
}
