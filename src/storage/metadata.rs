//! Best-effort reader for the text chunks embedded in rendered posters.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;

use super::types::PosterMetadata;

/// Keywords written by the renderer that are surfaced in listings.
pub const METADATA_KEYS: [&str; 8] = [
    "Title",
    "City",
    "Country",
    "Theme",
    "DistanceMeters",
    "Latitude",
    "Longitude",
    "GeneratedAt",
];

/// Reads the recognized text fields of the PNG at `path`.
///
/// Never fails: a missing, truncated or non-PNG file yields an empty map, and
/// keys with empty values are left out.
pub fn read_metadata(path: &Path) -> PosterMetadata {
    match read_text_chunks(path) {
        Ok(chunks) => chunks
            .into_iter()
            .filter(|(key, value)| !value.is_empty() && METADATA_KEYS.contains(&key.as_str()))
            .collect(),
        Err(e) => {
            debug!("No metadata for {}: {}", path.display(), e);
            PosterMetadata::new()
        }
    }
}

/// Collects every tEXt, zTXt and iTXt chunk that precedes the image data.
fn read_text_chunks(path: &Path) -> Result<Vec<(String, String)>, png::DecodingError> {
    let file = File::open(path)?;
    let decoder = png::Decoder::new(BufReader::new(file));
    let reader = decoder.read_info()?;
    let info = reader.info();

    let mut chunks = Vec::new();
    for chunk in &info.uncompressed_latin1_text {
        chunks.push((chunk.keyword.clone(), chunk.text.clone()));
    }
    for chunk in &info.compressed_latin1_text {
        match chunk.get_text() {
            Ok(text) => chunks.push((chunk.keyword.clone(), text)),
            Err(e) => debug!("Skipping zTXt '{}' in {}: {}", chunk.keyword, path.display(), e),
        }
    }
    for chunk in &info.utf8_text {
        match chunk.get_text() {
            Ok(text) => chunks.push((chunk.keyword.clone(), text)),
            Err(e) => debug!("Skipping iTXt '{}' in {}: {}", chunk.keyword, path.display(), e),
        }
    }
    Ok(chunks)
}

/// Writes a tiny PNG carrying the given text chunks. Test fixture helper.
#[cfg(test)]
pub(crate) fn write_fixture(path: &Path, text: &[(&str, &str)]) {
    use std::io::BufWriter;

    let file = File::create(path).unwrap();
    let mut encoder = png::Encoder::new(BufWriter::new(file), 2, 2);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    for (key, value) in text {
        encoder
            .add_text_chunk(key.to_string(), value.to_string())
            .unwrap();
    }
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(&[0u8; 12]).unwrap();
}
