use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, error, info, warn};

use crate::clock::Clock;
use crate::error_handling::types::LifecycleError;
use crate::storage::filename::{candidate, is_png, sanitize};
use crate::storage::metadata::read_metadata;
use crate::storage::types::{PosterFile, StorageArea, StorageLayout};

/// Upper bound on destination names tried for a single move.
const MAX_MOVE_ATTEMPTS: u32 = 64;

/// Moves poster files between the active, trash and example areas.
///
/// # Fields Overview
/// - `layout`: directories backing each area
/// - `clock`: source of the timestamp used to disambiguate colliding names
/// - `moves`: serializes the check-then-claim sequence of every move
pub struct FileLifecycleManager {
    layout: StorageLayout,
    clock: Arc<dyn Clock>,
    moves: Mutex<()>,
}

impl FileLifecycleManager {
    /// Creates the manager, creating any missing area directory.
    pub fn new(layout: StorageLayout, clock: Arc<dyn Clock>) -> Result<Self, LifecycleError> {
        for dir in [&layout.active, &layout.trash, &layout.examples] {
            fs::create_dir_all(dir).map_err(|e| {
                error!("Failed to create storage dir {}: {}", dir.display(), e);
                LifecycleError::Io(e)
            })?;
        }
        info!(
            "Storage ready: posters={} trash={} examples={}",
            layout.active.display(),
            layout.trash.display(),
            layout.examples.display()
        );
        Ok(Self {
            layout,
            clock,
            moves: Mutex::new(()),
        })
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Soft-deletes an active poster into the trash.
    ///
    /// Returns the name the file was stored under, which differs from
    /// `filename` when the trash already held that name.
    pub fn delete(&self, filename: &str) -> Result<String, LifecycleError> {
        self.relocate(filename, StorageArea::Active, StorageArea::Trash)
    }

    /// Moves a trashed poster back to the active area.
    pub fn restore(&self, filename: &str) -> Result<String, LifecycleError> {
        self.relocate(filename, StorageArea::Trash, StorageArea::Active)
    }

    /// Permanently removes a poster from the trash.
    pub fn purge(&self, filename: &str) -> Result<String, LifecycleError> {
        let name = sanitize(filename)?;
        let source = self.layout.trash.join(name);

        let _guard = self.moves.lock().unwrap_or_else(PoisonError::into_inner);
        if !source.is_file() {
            return Err(LifecycleError::NotFound);
        }
        fs::remove_file(&source).map_err(|e| {
            error!("Failed to purge {}: {}", source.display(), e);
            LifecycleError::Io(e)
        })?;
        info!("Purged {} from trash", name);
        Ok(name.to_string())
    }

    /// Lists the PNG files of `area` in lexicographic order.
    ///
    /// A missing area directory lists as empty; entries that are not `.png`
    /// files are skipped.
    pub fn list(&self, area: StorageArea) -> Result<Vec<PosterFile>, LifecycleError> {
        let dir = self.layout.dir(area);
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Area {} has no directory at {}", area, dir.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                error!("Failed to read {} dir {}: {}", area, dir.display(), e);
                return Err(LifecycleError::Io(e));
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                error!("Dir entry error in {}: {}", dir.display(), e);
                LifecycleError::Io(e)
            })?;
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if is_png(&name) && entry.path().is_file() {
                names.push(name);
            }
        }
        names.sort();

        let files = names
            .into_iter()
            .map(|filename| PosterFile {
                meta: read_metadata(&dir.join(&filename)),
                path: area.public_path(&filename),
                filename,
            })
            .collect::<Vec<_>>();
        debug!("Listed {} file(s) in {}", files.len(), area);
        Ok(files)
    }

    fn relocate(
        &self,
        filename: &str,
        from: StorageArea,
        to: StorageArea,
    ) -> Result<String, LifecycleError> {
        let name = sanitize(filename)?;
        let source = self.layout.dir(from).join(name);
        let target_dir = self.layout.dir(to);

        let _guard = self.moves.lock().unwrap_or_else(PoisonError::into_inner);
        if !source.is_file() {
            warn!("Cannot move {}: not present in {}", name, from);
            return Err(LifecycleError::NotFound);
        }

        let stamp = self.clock.now().timestamp();
        for attempt in 0..MAX_MOVE_ATTEMPTS {
            let stored = candidate(name, stamp, attempt);
            let target = target_dir.join(&stored);
            match claim(&source, &target) {
                Ok(()) => {
                    if let Err(e) = fs::remove_file(&source) {
                        error!("Could not remove {} from {}: {}", name, from, e);
                        if let Err(undo) = fs::remove_file(&target) {
                            error!("Left {} behind in {}: {}", stored, to, undo);
                        }
                        return Err(LifecycleError::Io(e));
                    }
                    info!("Moved {} from {} to {} as {}", name, from, to, stored);
                    return Ok(stored);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("{} already taken in {}, trying next name", stored, to);
                }
                Err(e) => {
                    error!("Failed to move {} to {}: {}", name, target.display(), e);
                    return Err(LifecycleError::Io(e));
                }
            }
        }

        error!("Gave up finding a free name for {} in {}", name, to);
        Err(LifecycleError::Io(io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free name for {name} in {to}"),
        )))
    }
}

/// Makes `target` a copy of `source` without ever replacing an existing file.
///
/// A hard link is tried first; when the areas live on different filesystems
/// the content is copied into a file opened with `create_new`.
fn claim(source: &Path, target: &Path) -> io::Result<()> {
    match fs::hard_link(source, target) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(e),
        Err(e) => {
            debug!("Hard link to {} failed ({}), copying instead", target.display(), e);
            copy_new(source, target)
        }
    }
}

fn copy_new(source: &Path, target: &Path) -> io::Result<()> {
    let mut out = OpenOptions::new().write(true).create_new(true).open(target)?;
    let copied = File::open(source)
        .and_then(|mut input| io::copy(&mut input, &mut out))
        .and_then(|_| out.sync_all());
    if let Err(e) = copied {
        drop(out);
        if let Err(undo) = fs::remove_file(target) {
            warn!("Could not remove partial copy {}: {}", target.display(), undo);
        }
        return Err(e);
    }
    Ok(())
}
