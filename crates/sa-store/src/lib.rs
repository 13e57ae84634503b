pub mod backend;
pub mod drive;
pub mod error;
pub mod local;
pub mod settings;

pub use backend::{Backend, FileRef, Uploader};
pub use drive::{DriveCredentials, DriveUploader};
pub use error::{Result, UploadError};
pub use local::LocalUploader;
pub use settings::{BackendKind, Settings, UploadSettings, data_dir, default_base_dir};
