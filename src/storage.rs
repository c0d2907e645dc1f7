//! Storage subsystem
//!
//! Poster artifacts live as flat `.png` files in three directories:
//! the active area (`posters/`), the trash (`trashcan/`) and the read-only
//! example gallery (`examples/`). There is no database.
//!
//! Components:
//! - `types`: areas, directory layout and listing entries.
//! - `filename`: the basename check applied before any filesystem access.
//! - `metadata`: best-effort reader for PNG text chunks.
//! - `file_lifecycle`: delete / restore / purge / list over the areas.

pub mod file_lifecycle;
pub mod filename;
pub mod metadata;
pub mod types;

pub use file_lifecycle::FileLifecycleManager;
pub use types::{PosterFile, PosterMetadata, StorageArea, StorageLayout};
