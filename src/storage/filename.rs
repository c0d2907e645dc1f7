//! Filename checks and collision suffixes for artifact moves.

use std::path::{Component, Path};

use crate::error_handling::types::LifecycleError;

/// Accepts `name` only if it is a bare `.png` basename.
///
/// This runs before any filesystem access: a name carrying a directory part,
/// a separator of either flavour, a NUL byte, an empty stem or another
/// extension is rejected outright rather than reduced.
pub fn sanitize(name: &str) -> Result<&str, LifecycleError> {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return Err(LifecycleError::InvalidName);
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name => {}
        _ => return Err(LifecycleError::InvalidName),
    }

    let (stem, ext) = split_extension(name);
    if stem.is_empty() || !ext.eq_ignore_ascii_case(".png") {
        return Err(LifecycleError::InvalidName);
    }
    Ok(name)
}

/// True when `name` looks like a PNG file name (case-insensitive extension).
pub fn is_png(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".png")
}

/// Splits `poster.png` into (`poster`, `.png`). A name without a dot has an
/// empty extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    }
}

/// Candidate destination name for the `attempt`-th try of a move.
///
/// Attempt 0 keeps the name, attempt 1 inserts the timestamp before the
/// extension, later attempts add a counter after the timestamp.
pub fn candidate(name: &str, stamp: i64, attempt: u32) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    let (stem, ext) = split_extension(name);
    if attempt == 1 {
        format!("{stem}_{stamp}{ext}")
    } else {
        format!("{stem}_{stamp}_{}{ext}", attempt - 1)
    }
}
