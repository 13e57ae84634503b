//! Image and sound catalogs with path construction.
//!
//! A raw catalog names bare files; building it prefixes every file with its
//! location (`scenes/INDOOR/kitchen/k5.jpg`, `sounds/hu.wav`) and checks that
//! identifiers are unique.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{IMAGE_ROOT, SOUND_ROOT};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MajorCategory {
    Indoor,
    Outdoor,
}

impl MajorCategory {
    /// Directory name under the image root.
    pub fn dir_name(self) -> &'static str {
        match self {
            MajorCategory::Indoor => "INDOOR",
            MajorCategory::Outdoor => "OUTDOOR",
        }
    }
}

impl FromStr for MajorCategory {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "indoor" => Ok(MajorCategory::Indoor),
            "outdoor" => Ok(MajorCategory::Outdoor),
            _ => Err(CatalogError::UnknownCategory(s.to_string())),
        }
    }
}

impl fmt::Display for MajorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    UnknownCategory(String),
    DuplicateCategory { major: MajorCategory, minor: String },
    DuplicateImage { category: String, image: String },
    DuplicateSound(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::UnknownCategory(name) => {
                write!(f, "unknown major category '{name}' (expected INDOOR or OUTDOOR)")
            }
            CatalogError::DuplicateCategory { major, minor } => {
                write!(f, "category {major}/{minor} is listed twice")
            }
            CatalogError::DuplicateImage { category, image } => {
                write!(f, "image '{image}' appears twice in {category}")
            }
            CatalogError::DuplicateSound(sound) => write!(f, "sound '{sound}' appears twice"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Catalog as written on disk: `{major -> {minor -> [file]}}` plus a flat sound list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCatalog {
    #[serde(default)]
    pub sounds: Vec<String>,
    #[serde(default)]
    pub images: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl RawCatalog {
    pub fn build(&self) -> Result<(ImageCatalog, SoundCatalog), CatalogError> {
        let images = ImageCatalog::from_raw(&self.images)?;
        let sounds = SoundCatalog::from_raw(&self.sounds)?;
        Ok((images, sounds))
    }
}

/// One (major, minor) combination and its image identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinorCategory {
    pub major: MajorCategory,
    pub name: String,
    pub images: Vec<String>,
}

impl MinorCategory {
    /// `INDOOR/kitchen`
    pub fn label(&self) -> String {
        format!("{}/{}", self.major, self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageCatalog {
    categories: Vec<MinorCategory>,
}

impl ImageCatalog {
    /// Build from raw file names. Categories are ordered INDOOR before OUTDOOR,
    /// then by minor name; files keep their listed order.
    pub fn from_raw(
        raw: &BTreeMap<String, BTreeMap<String, Vec<String>>>,
    ) -> Result<Self, CatalogError> {
        let mut keyed: BTreeMap<(MajorCategory, String), Vec<String>> = BTreeMap::new();

        for (major_key, minors) in raw {
            let major: MajorCategory = major_key.parse()?;
            for (minor, files) in minors {
                let label = format!("{major}/{minor}");
                let mut seen = HashSet::new();
                let mut paths = Vec::with_capacity(files.len());
                for file in files {
                    if !seen.insert(file.as_str()) {
                        return Err(CatalogError::DuplicateImage {
                            category: label,
                            image: file.clone(),
                        });
                    }
                    paths.push(image_path(major, minor, file));
                }
                if keyed.insert((major, minor.clone()), paths).is_some() {
                    return Err(CatalogError::DuplicateCategory {
                        major,
                        minor: minor.clone(),
                    });
                }
            }
        }

        let categories = keyed
            .into_iter()
            .map(|((major, name), images)| MinorCategory {
                major,
                name,
                images,
            })
            .collect();
        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[MinorCategory] {
        &self.categories
    }

    /// Every image identifier, in category order.
    pub fn all_images(&self) -> impl Iterator<Item = &String> {
        self.categories.iter().flat_map(|c| c.images.iter())
    }

    /// Total image count across all categories.
    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.images.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoundCatalog {
    sounds: Vec<String>,
}

impl SoundCatalog {
    pub fn from_raw(files: &[String]) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        let mut sounds = Vec::with_capacity(files.len());
        for file in files {
            if !seen.insert(file.as_str()) {
                return Err(CatalogError::DuplicateSound(file.clone()));
            }
            sounds.push(sound_path(file));
        }
        Ok(Self { sounds })
    }

    pub fn sounds(&self) -> &[String] {
        &self.sounds
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }
}

pub fn image_path(major: MajorCategory, minor: &str, file: &str) -> String {
    format!("{IMAGE_ROOT}/{}/{minor}/{file}", major.dir_name())
}

pub fn sound_path(file: &str) -> String {
    format!("{SOUND_ROOT}/{file}")
}
