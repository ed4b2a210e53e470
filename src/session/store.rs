use crate::session::{StoredSession, SCHEMA_VERSION};
use std::fs;
use std::io;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Persists the single backend session identifier across restarts. Reads are
/// best-effort: anything unreadable or unrecognized is treated as absent.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn open_default() -> Self {
        Self {
            path: home_dir().join(".parley").join("session.json"),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn get(&self) -> Option<String> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                log::warn!("failed to read {}: {err}", self.path.display());
                return None;
            }
        };

        let stored: StoredSession = match serde_json::from_slice(&data) {
            Ok(stored) => stored,
            Err(err) => {
                log::warn!("failed to parse {}: {err}", self.path.display());
                return None;
            }
        };

        if stored.schema_version != SCHEMA_VERSION {
            log::warn!(
                "unknown schema_version in {}: {}",
                self.path.display(),
                stored.schema_version
            );
            return None;
        }

        Some(stored.session_id)
    }

    pub fn set(&self, session_id: &str) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let stored = StoredSession {
            schema_version: SCHEMA_VERSION,
            session_id: session_id.to_string(),
        };
        let bytes = serde_json::to_vec_pretty(&stored)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, bytes)?;
        match fs::rename(&tmp_path, &self.path) {
            Ok(()) => Ok(()),
            Err(rename_err) => {
                if self.path.exists() {
                    fs::remove_file(&self.path)?;
                    fs::rename(&tmp_path, &self.path)?;
                    Ok(())
                } else {
                    Err(rename_err)
                }
            }
        }
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}
