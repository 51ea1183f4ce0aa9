//! Uploaded image persistence.
//!
//! Registration requests may carry a `data:image/...;base64,` payload.
//! This module decodes it and writes it under the uploads directory.
//! Failures are logged and reported as `None`, never raised — a broken
//! image must not block registration.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use uuid::Uuid;

/// Decode a base64 data-URL image and write it under `dir`.
///
/// The file is named after `id_hint` when given, otherwise a fresh UUID.
/// Recognizes png and jpeg tags; any other image tag falls back to png.
/// Returns the public reference path, or None on any failure.
pub fn save_data_url(dir: &Path, data: &str, id_hint: Option<&str>) -> Option<String> {
    if !data.starts_with("data:image/") {
        tracing::warn!("image payload is not a data:image/ URL");
        return None;
    }
    let (meta, b64) = match data.split_once(";base64,") {
        Some(parts) => parts,
        None => {
            tracing::warn!("image payload has no base64 marker");
            return None;
        }
    };

    let ext = if meta.contains("data:image/png") {
        "png"
    } else if meta.contains("data:image/jpeg") {
        "jpg"
    } else {
        "png"
    };

    let bytes = match STANDARD.decode(b64) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!("image decode failed: {err}");
            return None;
        }
    };

    let stem = match id_hint {
        Some(id) => id.to_string(),
        None => Uuid::new_v4().to_string(),
    };
    let file_name = format!("{stem}.{ext}");
    let path = dir.join(&file_name);
    if let Err(err) = std::fs::write(&path, &bytes) {
        tracing::warn!("image write failed for {}: {err}", path.display());
        return None;
    }

    Some(format!("/public/uploads/{file_name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use tempfile::tempdir;

    fn data_url(mime: &str, bytes: &[u8]) -> String {
        format!("data:{mime};base64,{}", STANDARD.encode(bytes))
    }

    #[test]
    fn saves_png_with_hint() {
        let dir = tempdir().unwrap();
        let url = save_data_url(dir.path(), &data_url("image/png", b"png-bytes"), Some("p1"));

        assert_eq!(url.as_deref(), Some("/public/uploads/p1.png"));
        let written = std::fs::read(dir.path().join("p1.png")).unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[test]
    fn saves_jpeg_with_generated_name() {
        let dir = tempdir().unwrap();
        let url = save_data_url(dir.path(), &data_url("image/jpeg", b"jpg-bytes"), None).unwrap();

        assert!(url.starts_with("/public/uploads/"));
        assert!(url.ends_with(".jpg"));
    }

    #[test]
    fn unknown_image_tag_falls_back_to_png() {
        let dir = tempdir().unwrap();
        let url = save_data_url(dir.path(), &data_url("image/webp", b"webp"), Some("x"));
        assert_eq!(url.as_deref(), Some("/public/uploads/x.png"));
    }

    #[test]
    fn rejects_non_image_payloads() {
        let dir = tempdir().unwrap();
        assert!(save_data_url(dir.path(), "not a data url", None).is_none());
        assert!(save_data_url(dir.path(), &data_url("text/plain", b"hi"), None).is_none());
    }

    #[test]
    fn rejects_missing_marker_and_bad_base64() {
        let dir = tempdir().unwrap();
        assert!(save_data_url(dir.path(), "data:image/png,plain", None).is_none());
        assert!(save_data_url(dir.path(), "data:image/png;base64,!!!not-b64!!!", None).is_none());
    }

    #[test]
    fn write_failure_yields_none() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("no-such-dir");
        assert!(save_data_url(&missing, &data_url("image/png", b"x"), Some("p1")).is_none());
    }
}
