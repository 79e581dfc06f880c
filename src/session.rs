//! Persisted progress between runs
//!
//! Two numbers survive a session: the best score and the furthest stage
//! unlocked. The simulation owns a `Session` while running; the caller loads
//! it before and saves it after.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure writing (or strictly reading) a JSON file
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// High score and furthest stage reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub high_score: u64,
    /// 0-based index of the furthest stage the player may continue from
    pub max_level: usize,
}

impl Session {
    /// Fold a finished run (or cleared stage) into the record.
    /// Returns true if the high score improved.
    pub fn record(&mut self, score: u64, level: usize) -> bool {
        self.max_level = self.max_level.max(level);
        if score > self.high_score {
            self.high_score = score;
            return true;
        }
        false
    }

    /// Read a session file, reporting why it could not be used
    pub fn try_load(path: &Path) -> Result<Self, SaveError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Load a session file. A missing or corrupt file is treated as no prior save.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(session) => {
                log::info!(
                    "Loaded session: high score {}, stage {}",
                    session.high_score,
                    session.max_level + 1
                );
                session
            }
            Err(SaveError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No saved session at {}, starting fresh", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable session {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write the session as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), SaveError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Session saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("tank-strike-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_record_keeps_maximums() {
        let mut session = Session::default();
        assert!(session.record(500, 1));
        assert!(!session.record(200, 0));
        assert_eq!(session.high_score, 500);
        assert_eq!(session.max_level, 1);
        assert!(session.record(900, 3));
        assert_eq!(session.max_level, 3);
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch("nested/session.json");
        let session = Session {
            high_score: 4200,
            max_level: 2,
        };
        session.save(&path).expect("save");
        assert_eq!(Session::load(&path), session);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_or_corrupt_falls_back_to_default() {
        assert_eq!(Session::load(&scratch("does-not-exist.json")), Session::default());

        let path = scratch("corrupt.json");
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, "{ not json").expect("write");
        assert!(matches!(Session::try_load(&path), Err(SaveError::Json(_))));
        assert_eq!(Session::load(&path), Session::default());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let session: Session = serde_json::from_str(r#"{"high_score": 77}"#).expect("parse");
        assert_eq!(session.high_score, 77);
        assert_eq!(session.max_level, 0);
    }
}
