//! Build a catalog from a stimulus directory tree.
//!
//! Scenes live under `<scenes>/<MAJOR>/<minor>/` and may be nested further;
//! sounds are a flat (or nested) directory of audio files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use sa_core::{MajorCategory, RawCatalog};

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg"];
pub const SOUND_EXTENSIONS: &[&str] = &["wav", "mp3", "ogg"];

/// Alternate-stream side files (`k1.jpg:Zone.Identifier`) copied over from
/// NTFS carry a `:` in their name and are never stimuli.
pub fn is_side_stream(name: &str) -> bool {
    name.contains(':')
}

/// Case-insensitive extension match.
pub fn has_extension(name: &str, extensions: &[&str]) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)),
        None => false,
    }
}

/// Recursively collect matching files below `root` as `/`-separated paths
/// relative to `root`, sorted.
pub fn list_files(root: &Path, extensions: &[&str]) -> Result<Vec<String>> {
    let mut found = Vec::new();
    collect(root, "", extensions, &mut found)?;
    found.sort();
    Ok(found)
}

fn collect(dir: &Path, prefix: &str, extensions: &[&str], found: &mut Vec<String>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let name = entry.file_name().to_string_lossy().to_string();
        let relative = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };
        if file_type.is_dir() {
            collect(&entry.path(), &relative, extensions, found)?;
        } else if file_type.is_file() {
            if !is_side_stream(&name) && has_extension(&name, extensions) {
                found.push(relative);
            } else {
                tracing::debug!("skipping {}", entry.path().display());
            }
        }
    }
    Ok(())
}

/// Scan scenes (and optionally sounds) into a catalog.
///
/// Top-level directories that are not a major category are skipped with a warning.
pub fn scan_catalog(scenes: &Path, sounds: Option<&Path>) -> Result<RawCatalog> {
    let mut images: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();

    let majors = fs::read_dir(scenes)
        .with_context(|| format!("failed to read scenes directory {}", scenes.display()))?;
    for major_entry in majors {
        let major_entry = major_entry?;
        if !major_entry.file_type()?.is_dir() {
            continue;
        }
        let dir_name = major_entry.file_name().to_string_lossy().to_string();
        let major: MajorCategory = match dir_name.parse() {
            Ok(major) => major,
            Err(_) => {
                tracing::warn!("ignoring {dir_name}: not INDOOR or OUTDOOR");
                continue;
            }
        };

        let minors = images.entry(major.dir_name().to_string()).or_default();
        for minor_entry in fs::read_dir(major_entry.path())? {
            let minor_entry = minor_entry?;
            if !minor_entry.file_type()?.is_dir() {
                continue;
            }
            let minor = minor_entry.file_name().to_string_lossy().to_string();
            let files = list_files(&minor_entry.path(), IMAGE_EXTENSIONS)?;
            tracing::info!("{}/{minor}: {} images", major.dir_name(), files.len());
            minors.insert(minor, files);
        }
    }

    let sounds = match sounds {
        Some(dir) => list_files(dir, SOUND_EXTENSIONS)?,
        None => Vec::new(),
    };

    Ok(RawCatalog { sounds, images })
}
