mod extract;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use extract::{extract_text, is_pdf, ExtractError};

pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("no file selected")]
    EmptyFilename,
    #[error("invalid filename `{0}`")]
    InvalidFilename(String),
    #[error("failed writing {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Uploaded files, stored flat under one directory by their original file name.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed creating upload directory {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<String, UploadError> {
        let stored = sanitize_filename(filename)?;
        let path = self.root.join(&stored);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| UploadError::Write {
                path: path.clone(),
                source,
            })?;

        tracing::info!(file = %stored, bytes = bytes.len(), "upload stored");
        Ok(stored)
    }

    pub fn path_for(&self, filename: &str) -> Result<PathBuf, UploadError> {
        Ok(self.root.join(sanitize_filename(filename)?))
    }

    pub fn read_text(&self, filename: &str) -> Result<String, ExtractError> {
        let path = self
            .path_for(filename)
            .map_err(|err| ExtractError::Unsupported(err.to_string()))?;
        extract_text(&path)
    }
}

/// Keeps only the final path component so uploads cannot escape the store root.
pub fn sanitize_filename(raw: &str) -> Result<String, UploadError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UploadError::EmptyFilename);
    }

    let name = trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
        return Err(UploadError::InvalidFilename(raw.to_string()));
    }

    Ok(name.to_string())
}
