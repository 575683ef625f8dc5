//! Durable storage for the consumer cursor.
//!
//! The broker never persists its cursor. A consumer that wants to resume after a
//! restart stores it here after each handled batch and loads it at startup.
//! Resuming from an older checkpoint is safe: it only causes re-delivery.

use crate::cursor::{parse_cursor, Cursor};
use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// A cursor kept as one RFC 3339 line in a file.
#[derive(Debug, Clone)]
pub struct FileCheckpoint {
    path: PathBuf,
}

impl FileCheckpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored cursor. A missing file means no checkpoint yet.
    pub async fn load(&self) -> Result<Option<Cursor>> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let cursor = parse_cursor(&text)?;
        tracing::debug!("Loaded cursor {} from {}", cursor, self.path.display());
        Ok(Some(cursor))
    }

    /// Replace the stored cursor.
    ///
    /// Writes and syncs a sibling temp file, then renames it over the target,
    /// so a reader or a restart after a crash sees either the old or the new value.
    pub async fn store(&self, cursor: Cursor) -> Result<()> {
        let tmp = self.temp_path();

        let mut file = File::create(&tmp).await.map_err(|e| self.io_error(e))?;
        file.write_all(format!("{}\n", cursor).as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        file.sync_all().await.map_err(|e| self.io_error(e))?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    fn io_error(&self, source: std::io::Error) -> Error {
        Error::Checkpoint {
            path: self.path.display().to_string(),
            source,
        }
    }
}
