use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::drive::DriveUploader;
use crate::error::Result;
use crate::local::LocalUploader;

/// Handle to a stored result file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub id: String,
    pub name: String,
    #[serde(rename = "folderId", skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
}

/// Stores one CSV document under a file name.
pub trait Uploader: Send + Sync {
    fn upload(&self, filename: &str, csv: &str) -> impl Future<Output = Result<FileRef>> + Send;
}

/// Backend chosen at runtime from settings.
pub enum Backend {
    Drive(DriveUploader),
    Local(LocalUploader),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Drive(_) => "drive",
            Backend::Local(_) => "local",
        }
    }
}

impl Uploader for Backend {
    async fn upload(&self, filename: &str, csv: &str) -> Result<FileRef> {
        match self {
            Backend::Drive(drive) => drive.upload(filename, csv).await,
            Backend::Local(local) => local.upload(filename, csv).await,
        }
    }
}
