//! Best-score persistence.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub trait ScoreStore {
    /// Stored best, 0 when nothing has been stored yet.
    fn read(&self) -> u32;
    fn write(&mut self, best: u32);
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("best score file: {0}")]
    Io(#[from] io::Error),
    #[error("best score file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Record {
    best: u32,
}

/// Keeps the best score as a small JSON document.
pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `best.json` in the platform data directory.
    pub fn default_path() -> io::Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "flappy-gap").ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine data directory",
            )
        })?;
        Ok(dirs.data_dir().join("best.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<u32>, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: Record = serde_json::from_str(&json)?;
        Ok(Some(record.best))
    }

    pub fn save(&self, best: u32) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&Record { best })?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl ScoreStore for FileScoreStore {
    fn read(&self) -> u32 {
        match self.load() {
            Ok(best) => best.unwrap_or(0),
            Err(e) => {
                log::warn!("ignoring {}: {e}", self.path.display());
                0
            }
        }
    }

    fn write(&mut self, best: u32) {
        if let Err(e) = self.save(best) {
            log::error!("could not save best score to {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("flappy-gap-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_missing_file_reads_zero() {
        let store = FileScoreStore::new(scratch("missing/best.json"));
        assert!(store.load().unwrap().is_none());
        assert_eq!(store.read(), 0);
    }

    #[test]
    fn test_write_then_read() {
        let path = scratch("roundtrip/best.json");
        let mut store = FileScoreStore::new(&path);
        store.write(12);
        assert_eq!(store.read(), 12);
        assert_eq!(FileScoreStore::new(&path).read(), 12);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_reads_zero() {
        let path = scratch("corrupt/best.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        let store = FileScoreStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
        assert_eq!(store.read(), 0);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_default_path() {
        let result = FileScoreStore::default_path();
        if let Ok(path) = result {
            assert!(path.to_string_lossy().contains("best.json"));
        }
    }
}
