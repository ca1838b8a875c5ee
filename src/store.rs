use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("seen file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("seen file is not a JSON array of strings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to replace seen file: {0}")]
    Replace(#[from] tempfile::PersistError),
}

/// Durable set of already-alerted listing links, kept as a JSON array of
/// strings so the file stays hand-inspectable.
pub struct SeenStore {
    path: PathBuf,
}

impl SeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is a fresh start, not an error.
    pub fn load(&self) -> Result<HashSet<String>, StoreError> {
        if !self.path.exists() {
            debug!("No seen file at {}, starting empty", self.path.display());
            return Ok(HashSet::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        let links: Vec<String> = serde_json::from_str(&raw)?;
        Ok(links.into_iter().collect())
    }

    /// Overwrite the file with the full set. Written to a temp file in the
    /// same directory and renamed into place, so a crash mid-write leaves the
    /// previous file intact.
    pub fn save(&self, seen: &HashSet<String>) -> Result<(), StoreError> {
        let mut links: Vec<&String> = seen.iter().collect();
        links.sort();
        let json = serde_json::to_string(&links)?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}
