use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::shared::constants::{ALLOWED_PHOTO_EXTENSIONS, PHOTO_HASH_LEN};
use crate::shared::validation::file_extension;

/// Photo file received with a submission
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Whether an upload name carries one of the accepted image extensions
pub fn is_allowed_photo(file_name: &str) -> bool {
    file_extension(file_name)
        .map(|ext| ALLOWED_PHOTO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Build the storage name for an uploaded photo.
///
/// SHA-256 over `"{epoch_seconds}_{uuid}_{original}"`, truncated to
/// 16 hex chars, plus the lower-cased original extension.
pub fn generate_photo_filename(original: &str, now: DateTime<Utc>, nonce: Uuid) -> String {
    let hash_input = format!("{}_{}_{}", epoch_seconds(now), nonce, original);

    let digest = hex::encode(Sha256::digest(hash_input.as_bytes()));
    let file_hash = &digest[..PHOTO_HASH_LEN];

    match file_extension(original) {
        Some(ext) => format!("{}.{}", file_hash, ext),
        None => file_hash.to_string(),
    }
}

/// Fractional epoch seconds, always rendered with a decimal point
fn epoch_seconds(at: DateTime<Utc>) -> String {
    let rendered = (at.timestamp_micros() as f64 / 1_000_000.0).to_string();
    if rendered.contains('.') {
        rendered
    } else {
        format!("{}.0", rendered)
    }
}

/// MIME type served for a stored photo name
pub fn content_type_for(file_name: &str) -> &'static str {
    match file_extension(file_name).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
