//! Local-directory backend, for running a study without cloud credentials.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::backend::{FileRef, Uploader};
use crate::error::{Result, UploadError};

pub struct LocalUploader {
    dir: PathBuf,
}

impl LocalUploader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Reject names that would escape the target directory. A name must be a
/// single path component; dots inside it (`ST..v2.csv`) are fine.
fn check_filename(filename: &str) -> Result<()> {
    if matches!(filename, "" | "." | "..") || filename.contains(['/', '\\']) {
        return Err(UploadError::InvalidData(format!(
            "unsafe file name '{filename}'"
        )));
    }
    Ok(())
}

impl Uploader for LocalUploader {
    async fn upload(&self, filename: &str, csv: &str) -> Result<FileRef> {
        check_filename(filename)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(filename);
        tokio::fs::write(&path, csv).await?;
        tracing::info!("wrote {}", path.display());

        Ok(FileRef {
            id: Uuid::new_v4().to_string(),
            name: filename.to_string(),
            folder_id: Some(self.dir.display().to_string()),
        })
    }
}
