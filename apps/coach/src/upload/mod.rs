pub mod validation;

use std::path::Path;

use anyhow::{Context, Result};
use bytes::Bytes;

use crate::upload::validation::MAX_FILE_SIZE;

/// A user-selected résumé file, held in memory until the backend has extracted
/// its text.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    /// Size as reported by the file system; may exceed `bytes.len()` when the
    /// contents were not loaded.
    pub size: u64,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// Reads a file from disk. Contents of files over the size limit are not
    /// loaded; validation rejects them from `size` alone.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("'{}' is not a file path", path.display()))?;

        let size = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Failed to stat '{}'", path.display()))?
            .len();

        if size > MAX_FILE_SIZE {
            return Ok(Self {
                name,
                size,
                bytes: Bytes::new(),
            });
        }

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read '{}'", path.display()))?;
        Ok(Self::new(name, bytes))
    }

    /// Lower-cased extension after the last dot, if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    pub fn mime_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("pdf") => "application/pdf",
            Some("txt") => "text/plain",
            _ => "application/octet-stream",
        }
    }
}
