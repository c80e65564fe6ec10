//! Saving rendered logos to disk (the download action).

use std::path::{Path, PathBuf};

use base64::Engine;

use crate::brand::Concept;
use crate::error::StudioError;

/// Sanitize a string for use in a filename.
///
/// Converts to lowercase, replaces non-alphanumeric chars with hyphens,
/// collapses consecutive hyphens, and trims to max length.
#[must_use]
pub fn sanitize_for_filename(input: &str, max_len: usize) -> String {
    let mut result = String::with_capacity(max_len);
    let mut last_was_hyphen = true; // Prevents leading hyphen

    for ch in input.chars() {
        if result.len() >= max_len {
            break;
        }
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            result.push('-');
            last_was_hyphen = true;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        "concept".to_string()
    } else {
        result
    }
}

/// File extension for an image MIME type.
#[must_use]
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/svg+xml" => "svg",
        _ => "png",
    }
}

/// Split a `data:<mime>;base64,<payload>` URI into MIME type and bytes.
///
/// # Errors
///
/// Returns [`StudioError::InvalidDataUri`] if the URI is not base64 image data.
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>), StudioError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| StudioError::InvalidDataUri("missing 'data:' prefix".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| StudioError::InvalidDataUri("missing ',' separator".into()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| StudioError::InvalidDataUri("payload is not base64".into()))?;
    if !mime.starts_with("image/") {
        return Err(StudioError::InvalidDataUri(format!("not an image: {mime}")));
    }
    let data = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| StudioError::InvalidDataUri(format!("bad base64: {e}")))?;
    Ok((mime.to_string(), data))
}

/// Save a concept's logo into `dir` as `<title>-logo.<ext>`.
///
/// Returns `Ok(None)` if the concept has no image. An existing file with the
/// same name is not overwritten; a numeric suffix is added instead.
///
/// # Errors
///
/// Returns an error if the image cannot be decoded or written.
pub fn download_concept(concept: &Concept, dir: &Path) -> Result<Option<PathBuf>, StudioError> {
    let Some(uri) = concept.image_url.as_deref() else {
        return Ok(None);
    };
    let (mime, data) = decode_data_uri(uri)?;

    std::fs::create_dir_all(dir)?;
    let stem = format!("{}-logo", sanitize_for_filename(&concept.title, 50));
    let path = unique_path(dir, &stem, extension_for_mime(&mime));
    std::fs::write(&path, data)?;
    Ok(Some(path))
}

fn unique_path(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let first = dir.join(format!("{stem}.{ext}"));
    if !first.exists() {
        return first;
    }
    (2..)
        .map(|n| dir.join(format!("{stem}-{n}.{ext}")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concept(title: &str, image_url: Option<&str>) -> Concept {
        Concept {
            id: "concept-1-0".into(),
            title: title.into(),
            rationale: "r".into(),
            color_palette: vec!["#000000".into()],
            typography_suggestion: "t".into(),
            image_prompt: "p".into(),
            image_url: image_url.map(str::to_string),
            image_loading: false,
        }
    }

    #[test]
    fn sanitize_basic() {
        assert_eq!(sanitize_for_filename("The Orbit Mark", 50), "the-orbit-mark");
    }

    #[test]
    fn sanitize_special_chars() {
        assert_eq!(sanitize_for_filename("Peak & Pine!! (v2)", 50), "peak-pine-v2");
    }

    #[test]
    fn sanitize_truncates() {
        let long = "a".repeat(100);
        assert!(sanitize_for_filename(&long, 10).len() <= 10);
    }

    #[test]
    fn sanitize_empty() {
        assert_eq!(sanitize_for_filename("", 50), "concept");
        assert_eq!(sanitize_for_filename("!!!", 50), "concept");
    }

    #[test]
    fn extensions() {
        assert_eq!(extension_for_mime("image/png"), "png");
        assert_eq!(extension_for_mime("image/jpeg"), "jpg");
        assert_eq!(extension_for_mime("image/webp"), "webp");
        assert_eq!(extension_for_mime("application/unknown"), "png");
    }

    #[test]
    fn decode_valid_uri() {
        let (mime, data) = decode_data_uri("data:image/png;base64,AQID").unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[test]
    fn decode_rejects_malformed_uris() {
        assert!(decode_data_uri("https://example.com/logo.png").is_err());
        assert!(decode_data_uri("data:image/png;base64").is_err());
        assert!(decode_data_uri("data:image/png,AQID").is_err());
        assert!(decode_data_uri("data:text/plain;base64,AQID").is_err());
        assert!(decode_data_uri("data:image/png;base64,***").is_err());
    }

    #[test]
    fn download_writes_titled_file_without_clobbering() {
        let dir = std::env::temp_dir().join("brandgen_download_test");
        let _ = std::fs::remove_dir_all(&dir);

        let c = concept("Orbit Mark", Some("data:image/jpeg;base64,AQID"));
        let first = download_concept(&c, &dir).unwrap().unwrap();
        assert_eq!(first.file_name().unwrap(), "orbit-mark-logo.jpg");
        assert_eq!(std::fs::read(&first).unwrap(), vec![1, 2, 3]);

        let second = download_concept(&c, &dir).unwrap().unwrap();
        assert_eq!(second.file_name().unwrap(), "orbit-mark-logo-2.jpg");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn download_skips_concepts_without_image() {
        let dir = std::env::temp_dir().join("brandgen_download_none_test");
        assert!(download_concept(&concept("Blank", None), &dir).unwrap().is_none());
    }
}
