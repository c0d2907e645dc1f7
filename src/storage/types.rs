use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Text fields recovered from a poster file, keyed by PNG text keyword.
pub type PosterMetadata = BTreeMap<String, String>;

/// The three disjoint places an artifact can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    /// Posters served to users.
    Active,
    /// Soft-deleted posters.
    Trash,
    /// Pre-rendered gallery, populated out of band.
    Example,
}

impl StorageArea {
    /// URL prefix under which the area's files are served.
    pub fn url_prefix(&self) -> &'static str {
        match self {
            StorageArea::Active => "/posters",
            StorageArea::Trash => "/trashcan",
            StorageArea::Example => "/examples",
        }
    }

    pub fn public_path(&self, filename: &str) -> String {
        format!("{}/{}", self.url_prefix(), filename)
    }
}

impl fmt::Display for StorageArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageArea::Active => write!(f, "active"),
            StorageArea::Trash => write!(f, "trash"),
            StorageArea::Example => write!(f, "example"),
        }
    }
}

/// Directories backing each [`StorageArea`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    pub active: PathBuf,
    pub trash: PathBuf,
    pub examples: PathBuf,
}

impl StorageLayout {
    /// Layout with the conventional directory names below `root`.
    pub fn under<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self {
            active: root.join("posters"),
            trash: root.join("trashcan"),
            examples: root.join("examples"),
        }
    }

    pub fn dir(&self, area: StorageArea) -> &Path {
        match area {
            StorageArea::Active => &self.active,
            StorageArea::Trash => &self.trash,
            StorageArea::Example => &self.examples,
        }
    }
}

/// One listed artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PosterFile {
    pub filename: String,
    pub path: String,
    pub meta: PosterMetadata,
}
