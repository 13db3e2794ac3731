use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use bytes::Bytes;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::errors::AppError;

/// One uploaded resume parked on disk while it is processed.
///
/// The file is removed by `release`, or by `Drop` if the request future is
/// torn down before `release` runs. Either way it is removed once.
#[derive(Debug)]
pub struct ResumeDocument {
    file: NamedTempFile,
    size: u64,
}

impl ResumeDocument {
    /// Writes the uploaded bytes to a fresh file under `dir`.
    pub async fn create(dir: &Path, bytes: Bytes) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create upload dir {}", dir.display()))?;

        let dir = dir.to_path_buf();
        let written = tokio::task::spawn_blocking(move || -> std::io::Result<Self> {
            let mut file = tempfile::Builder::new()
                .prefix("resume-")
                .suffix(".pdf")
                .tempfile_in(&dir)?;
            file.write_all(&bytes)?;
            file.flush()?;
            Ok(Self {
                file,
                size: bytes.len() as u64,
            })
        })
        .await
        .context("resume writer task failed")?;

        Ok(written.context("failed to write uploaded resume")?)
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Reads the stored bytes back. A file that disappeared in the meantime
    /// is reported as not found.
    pub async fn read(&self) -> Result<Vec<u8>, AppError> {
        let exists = tokio::fs::try_exists(self.path())
            .await
            .context("failed to stat uploaded resume")?;
        if !exists {
            return Err(AppError::NotFound("Uploaded file not found.".to_string()));
        }
        Ok(tokio::fs::read(self.path())
            .await
            .context("failed to read uploaded resume")?)
    }

    /// Deletes the file.
    pub fn release(self) {
        let path: PathBuf = self.path().to_path_buf();
        match self.file.close() {
            Ok(()) => debug!("Removed uploaded resume {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Uploaded resume {} was already gone", path.display())
            }
            Err(e) => warn!("Failed to remove uploaded resume {}: {e}", path.display()),
        }
    }
}
