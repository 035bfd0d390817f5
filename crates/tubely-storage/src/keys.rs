//! Shared naming for storage backends.
//!
//! Random names are 32 bytes from the thread-local CSPRNG, base64url-encoded
//! without padding (43 characters). Extensions come from the declared media
//! subtype, so `image/png` becomes `.png` and `video/mp4` becomes `.mp4`.

use crate::traits::{StorageError, StorageResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use tubely_core::AssetKind;
use uuid::Uuid;

const RANDOM_NAME_BYTES: usize = 32;
const FALLBACK_EXTENSION: &str = "bin";

/// Generate an opaque, unguessable asset name.
pub fn random_name() -> String {
    let bytes: [u8; RANDOM_NAME_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// File extension for a declared content type.
///
/// Parameters and structured-syntax suffixes are dropped (`image/svg+xml` gives
/// `svg`), the result is lowercased and reduced to ASCII alphanumerics.
pub fn extension_for(content_type: &str) -> String {
    let subtype = match content_type.trim().parse::<mime::Mime>() {
        Ok(parsed) => parsed.subtype().as_str().to_string(),
        Err(_) => content_type
            .split(';')
            .next()
            .and_then(|essence| essence.split('/').nth(1))
            .and_then(|subtype| subtype.split('+').next())
            .unwrap_or_default()
            .to_string(),
    };

    let extension: String = subtype
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    if extension.is_empty() {
        FALLBACK_EXTENSION.to_string()
    } else {
        extension
    }
}

/// `<random>.<ext>`
pub fn asset_filename(content_type: &str) -> String {
    format!("{}.{}", random_name(), extension_for(content_type))
}

/// `[prefix]<random>.<ext>`, used as an object key.
pub fn object_key(prefix: Option<&str>, content_type: &str) -> String {
    format!("{}{}", prefix.unwrap_or_default(), asset_filename(content_type))
}

/// Memory-table key: the record identifier, namespaced by asset kind.
pub fn memory_key(kind: AssetKind, record_id: Uuid) -> String {
    format!("{}/{}", kind.route_segment(), record_id)
}

/// Content type implied by a stored name's extension.
pub fn content_type_for(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Reject keys that could escape a backend's namespace.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
