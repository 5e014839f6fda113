//! Image Acquisition Layer
//!
//! Produces a single candidate image from either the camera or a local file,
//! normalized to a [`SelectedImage`]. File candidates pass through the
//! validator before they are committed; camera captures are already bounded
//! by the capture encoding and skip the size rule, but share the same commit
//! path in the scan controller.

pub mod camera;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::path::Path;
use thiserror::Error;

/// Maximum accepted upload size: 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Errors raised while acquiring a candidate image
#[derive(Debug, Error)]
pub enum AcquireError {
    /// File exceeds the upload size cap
    #[error("File size must be less than 10MB")]
    Oversized { size: u64 },

    /// File is not an image type the backend can decode
    #[error("Please choose an image file")]
    NotAnImage { mime_type: String },

    /// File could not be read from disk
    #[error("Could not read file: {0}")]
    Io(#[from] std::io::Error),
}

/// An accepted image, held until a new acquisition starts, a scan completes,
/// or the user resets.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedImage {
    /// Raw image bytes as they will be submitted
    pub bytes: Vec<u8>,
    /// MIME type of the payload
    pub mime_type: String,
    /// File name sent alongside the multipart payload
    pub file_name: String,
    /// Base64 data URI for preview rendering
    pub preview: String,
}

impl SelectedImage {
    /// Wrap raw image bytes, building the preview encoding.
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        let preview = format!("data:{};base64,{}", mime_type, BASE64.encode(&bytes));
        Self {
            bytes,
            mime_type,
            file_name: file_name.into(),
            preview,
        }
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A user-chosen file, not yet validated
#[derive(Debug, Clone)]
pub struct FileCandidate {
    /// File name as chosen by the user
    pub file_name: String,
    /// MIME type inferred from the file extension
    pub mime_type: String,
    /// Size in bytes
    pub size: u64,
    /// File contents
    pub bytes: Vec<u8>,
}

impl FileCandidate {
    /// Build a candidate from in-memory bytes.
    pub fn from_bytes(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }
}

/// Read a user-chosen file into a candidate, inferring its MIME type from
/// the extension.
pub fn load_candidate(path: &Path) -> Result<FileCandidate, AcquireError> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let mime_type = mime_for_path(path).to_string();

    tracing::debug!(
        "Loaded candidate {:?} ({} bytes, {})",
        file_name,
        bytes.len(),
        mime_type
    );

    Ok(FileCandidate {
        file_name,
        mime_type,
        size: bytes.len() as u64,
        bytes,
    })
}

/// Gatekeep a candidate before it becomes a [`SelectedImage`].
///
/// Rejects oversized files and non-image types; the caller leaves any prior
/// selection untouched on rejection.
pub fn validate_candidate(candidate: &FileCandidate) -> Result<(), AcquireError> {
    if candidate.size > MAX_UPLOAD_BYTES {
        return Err(AcquireError::Oversized {
            size: candidate.size,
        });
    }
    if !candidate.mime_type.starts_with("image/") {
        return Err(AcquireError::NotAnImage {
            mime_type: candidate.mime_type.clone(),
        });
    }
    Ok(())
}

/// Guess a MIME type from a file extension, defaulting to a binary type that
/// the validator will reject.
fn mime_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_oversized_candidate_rejected_with_exact_message() {
        let candidate = FileCandidate {
            file_name: "big.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            size: MAX_UPLOAD_BYTES + 1,
            bytes: Vec::new(),
        };

        let err = validate_candidate(&candidate).unwrap_err();
        assert_eq!(err.to_string(), "File size must be less than 10MB");
    }

    #[test]
    fn test_candidate_at_cap_accepted() {
        let candidate = FileCandidate {
            file_name: "exact.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            size: MAX_UPLOAD_BYTES,
            bytes: Vec::new(),
        };

        assert!(validate_candidate(&candidate).is_ok());
    }

    #[test]
    fn test_non_image_candidate_rejected() {
        let candidate = FileCandidate::from_bytes("notes.txt", "text/plain", b"hello".to_vec());
        let err = validate_candidate(&candidate).unwrap_err();
        assert!(matches!(err, AcquireError::NotAnImage { .. }));
    }

    #[test]
    fn test_selected_image_preview_is_data_uri() {
        let image = SelectedImage::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg", "label.jpg");
        assert!(image.preview.starts_with("data:image/jpeg;base64,"));
        assert_eq!(image.len(), 3);
    }

    #[test]
    fn test_load_candidate_infers_mime_from_extension() {
        let mut temp = NamedTempFile::with_suffix(".jpg").unwrap();
        temp.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

        let candidate = load_candidate(temp.path()).unwrap();
        assert_eq!(candidate.mime_type, "image/jpeg");
        assert_eq!(candidate.size, 4);
    }

    #[test]
    fn test_load_candidate_unknown_extension_fails_validation() {
        let mut temp = NamedTempFile::with_suffix(".bin").unwrap();
        temp.write_all(b"not an image").unwrap();

        let candidate = load_candidate(temp.path()).unwrap();
        assert!(validate_candidate(&candidate).is_err());
    }

    #[test]
    fn test_load_candidate_missing_file() {
        let result = load_candidate(Path::new("/nonexistent/label.jpg"));
        assert!(matches!(result, Err(AcquireError::Io(_))));
    }
}
