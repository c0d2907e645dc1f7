use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-z0-9_-]").expect("slug pattern is valid")
});

/// Turns a place name into a filename-friendly ASCII slug.
///
/// Accents are folded (`Råcksta` -> `racksta`), other non-ASCII characters are
/// dropped, spaces become underscores and anything outside `[a-z0-9_-]` is
/// removed.
pub fn slugify(value: &str) -> String {
    let ascii: String = value.nfkd().filter(char::is_ascii).collect();
    let cleaned = ascii.trim().to_lowercase().replace(' ', "_");
    UNSAFE_CHARS.replace_all(&cleaned, "").into_owned()
}
