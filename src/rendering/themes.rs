use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

/// Enumerates the themes the renderer understands.
pub trait ThemeCatalog: Send + Sync {
    /// Theme names, sorted.
    fn themes(&self) -> Vec<String>;

    fn contains(&self, theme: &str) -> bool {
        self.themes().iter().any(|t| t == theme)
    }
}

/// Themes defined as `<name>.json` files in a directory.
///
/// The directory is read on every call so themes added at runtime show up
/// without a restart.
#[derive(Debug, Clone)]
pub struct DirectoryThemeCatalog {
    dir: PathBuf,
}

impl DirectoryThemeCatalog {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl ThemeCatalog for DirectoryThemeCatalog {
    fn themes(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot read themes dir {}: {}", self.dir.display(), e);
                return Vec::new();
            }
        };
        let mut themes: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_owned))
            .collect();
        themes.sort();
        themes
    }
}

/// Fixed theme list.
#[derive(Debug, Clone, Default)]
pub struct StaticThemeCatalog {
    themes: Vec<String>,
}

impl StaticThemeCatalog {
    pub fn new<I, S>(themes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut themes: Vec<String> = themes.into_iter().map(Into::into).collect();
        themes.sort();
        Self { themes }
    }
}

impl ThemeCatalog for StaticThemeCatalog {
    fn themes(&self) -> Vec<String> {
        self.themes.clone()
    }
}
