//! Settings file: study design, session layout and upload backend.
//!
//! ```toml
//! [design]
//! pairs = 4
//! singletons = 4
//! images_per_category = 12
//!
//! [layout]
//! learning_blocks = 2
//!
//! [upload]
//! backend = "local"
//! local_dir = "/srv/study/results"
//! ```

use std::path::{Path, PathBuf};
use std::{env, fs};

use sa_core::{Design, Layout};
use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::drive::{DriveCredentials, DriveUploader};
use crate::error::{Result, UploadError};
use crate::local::LocalUploader;

const SETTINGS_FILE: &str = "config.toml";

/// Default base directory for settings and locally stored results.
pub fn default_base_dir() -> PathBuf {
    dirs_home().join(".stimulus-assign")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// `$SA_DATA_DIR` if set, else the default base directory.
pub fn data_dir() -> PathBuf {
    env::var("SA_DATA_DIR")
        .ok()
        .map(PathBuf::from)
        .unwrap_or_else(default_base_dir)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Drive,
    Local,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub backend: BackendKind,
    /// Directory for the local backend; `<data dir>/results` when unset
    pub local_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub design: Design,
    pub layout: Layout,
    pub upload: UploadSettings,
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| UploadError::Config(e.to_string()))
    }

    /// Load an explicit settings file, or `<data dir>/config.toml` when it
    /// exists, or the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = data_dir().join(SETTINGS_FILE);
                if !candidate.is_file() {
                    tracing::debug!("no settings at {}, using defaults", candidate.display());
                    return Ok(Self::default());
                }
                candidate
            }
        };
        let content = fs::read_to_string(&path).map_err(|e| {
            UploadError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        tracing::debug!("loaded settings from {}", path.display());
        Self::from_toml(&content)
    }

    pub fn local_dir(&self) -> PathBuf {
        self.upload
            .local_dir
            .clone()
            .unwrap_or_else(|| data_dir().join("results"))
    }

    /// Construct the configured backend. Drive credentials come from the environment.
    pub fn backend(&self) -> Result<Backend> {
        match self.upload.backend {
            BackendKind::Drive => Ok(Backend::Drive(DriveUploader::new(
                DriveCredentials::from_env()?,
            ))),
            BackendKind::Local => Ok(Backend::Local(LocalUploader::new(self.local_dir()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.design.pairs, 4);
        assert_eq!(settings.layout.learning_blocks, 2);
        assert_eq!(settings.upload.backend, BackendKind::Drive);
    }

    #[test]
    fn test_partial_sections() {
        let settings = Settings::from_toml(
            r#"
            [design]
            images_per_category = 6
            repetitions = 5

            [upload]
            backend = "local"
            local_dir = "/tmp/results"
            "#,
        )
        .unwrap();
        assert_eq!(settings.design.images_per_category, 6);
        assert_eq!(settings.design.repetitions, Some(5));
        assert_eq!(settings.design.pairs, 4);
        assert_eq!(settings.upload.backend, BackendKind::Local);
        assert_eq!(settings.local_dir(), PathBuf::from("/tmp/results"));
    }

    #[test]
    fn test_local_backend_selected() {
        let settings = Settings::from_toml("[upload]\nbackend = \"local\"\nlocal_dir = \"out\"").unwrap();
        let backend = settings.backend().unwrap();
        assert_eq!(backend.name(), "local");
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = Settings::from_toml("[upload]\nbackend = \"ftp\"").unwrap_err();
        assert!(matches!(err, UploadError::Config(_)));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = Settings::load(Some(Path::new("/nonexistent/sa/config.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
