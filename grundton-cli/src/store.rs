//! JSON store of saved session summaries.
//!
//! The whole store is one file holding `{ "sessions": [...] }`, newest
//! first. A missing file is an empty store; so is a file that cannot be read
//! or parsed, after a warning.

use anyhow::Context;
use grundton_core::{Aggregate, SessionSummary, aggregate_summaries};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "grundton";
const STORE_FILE: &str = "sessions.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStore {
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
}

impl SessionStore {
    /// `<data dir>/grundton/sessions.json`, or the working directory when
    /// the platform has no data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME)
            .join(STORE_FILE)
    }

    /// Loads the store, falling back to an empty one.
    pub fn load(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no session store yet");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "cannot read session store, starting empty"
                );
                return Self::default();
            }
        };
        match serde_json::from_str(&data) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "corrupt session store, starting empty"
                );
                Self::default()
            }
        }
    }

    /// Writes the store, creating its directory if needed.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            sessions = self.sessions.len(),
            "session store saved"
        );
        Ok(())
    }

    /// Adds a summary as the newest session.
    pub fn push(&mut self, summary: SessionSummary) {
        self.sessions.insert(0, summary);
    }

    /// Deletes the store file. Returns whether there was one.
    pub fn clear(path: &Path) -> anyhow::Result<bool> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
        }
    }

    /// Long-run estimate over every stored session.
    pub fn aggregate(&self) -> Option<Aggregate> {
        aggregate_summaries(&self.sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grundton_core::summarize;
    use tempfile::tempdir;

    fn summary(hz: f32, ts: u64) -> SessionSummary {
        summarize(&[hz; 10], ts, 200).unwrap()
    }

    #[test]
    fn missing_store_is_empty() {
        let dir = tempdir().unwrap();
        let store = SessionStore::load(&dir.path().join("sessions.json"));
        assert!(store.sessions.is_empty());
        assert_eq!(store.aggregate(), None);
    }

    #[test]
    fn saved_sessions_load_newest_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("sessions.json");

        let mut store = SessionStore::default();
        store.push(summary(200.0, 1));
        store.push(summary(220.0, 2));
        store.save(&path).unwrap();

        let loaded = SessionStore::load(&path);
        assert_eq!(loaded, store);
        assert_eq!(loaded.sessions[0].timestamp_ms, 2);
        assert_eq!(loaded.sessions[1].timestamp_ms, 1);
    }

    #[test]
    fn corrupt_store_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(SessionStore::load(&path).sessions.is_empty());
    }

    #[test]
    fn store_without_sessions_key_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(SessionStore::load(&path).sessions.is_empty());
    }

    #[test]
    fn clear_removes_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        let mut store = SessionStore::default();
        store.push(summary(200.0, 1));
        store.save(&path).unwrap();

        assert!(SessionStore::clear(&path).unwrap());
        assert!(!path.exists());
        assert!(!SessionStore::clear(&path).unwrap());
    }

    #[test]
    fn aggregate_pools_stored_samples() {
        let mut store = SessionStore::default();
        store.push(summary(200.0, 1));
        store.push(summary(300.0, 2));
        let aggregate = store.aggregate().unwrap();
        assert_eq!(aggregate.session_count, 2);
        assert_eq!(aggregate.sample_count, 20);
        assert!((aggregate.mean_hz - 250.0).abs() < 1e-3);
    }
}
