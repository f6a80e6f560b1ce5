//! Image resource → transport-ready base64 payload.
//!
//! The Gemini wire format wants inline image data as bare base64 plus a MIME
//! type. Input arrives in one of three shapes: a file path, a raw byte
//! buffer from the camera/gallery layer, or an already-encoded
//! `data:` URL (web clients hand those over). All three converge on
//! [`EncodedImage`].
//!
//! There is no retry here — an encoding failure aborts the current input
//! step and the session returns to input selection.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;

// ---------------------------------------------------------------------------
// EncodingError
// ---------------------------------------------------------------------------

/// Errors that can occur while preparing an image payload.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The image resource could not be read.
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    /// The string was not a `data:<mime>;base64,<payload>` URL.
    #[error("not a base64 data URL")]
    InvalidDataUrl,

    /// The data-URL payload does not decode as base64 — the input is not a
    /// usable encoded image and must be rejected, not passed through.
    #[error("data URL payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

// ---------------------------------------------------------------------------
// EncodedImage
// ---------------------------------------------------------------------------

/// A base64-encoded image ready for the model request body.
///
/// `data` is always the bare payload — any data-URL prefix has been
/// stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Bare base64 payload (no `data:` prefix).
    pub data: String,
    /// MIME type tagged onto the inline data part (e.g. `"image/jpeg"`).
    pub mime_type: String,
}

impl EncodedImage {
    /// Encode a raw image byte buffer.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            data: BASE64.encode(bytes),
            mime_type: mime_type.into(),
        }
    }

    /// Read an image file fully into memory and encode it. The MIME type is
    /// sniffed from the file extension, defaulting to JPEG.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EncodingError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let mime = mime_from_extension(path);
        log::debug!(
            "media: encoded {} ({} bytes, {mime})",
            path.display(),
            bytes.len()
        );
        Ok(Self::from_bytes(&bytes, mime))
    }

    /// Accept an already-encoded `data:<mime>;base64,<payload>` URL,
    /// stripping the prefix and validating that the payload actually
    /// decodes. Non-decodable input is rejected rather than silently
    /// forwarded to the model.
    pub fn from_data_url(url: &str) -> Result<Self, EncodingError> {
        let rest = url.strip_prefix("data:").ok_or(EncodingError::InvalidDataUrl)?;
        let (header, payload) = rest.split_once(',').ok_or(EncodingError::InvalidDataUrl)?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or(EncodingError::InvalidDataUrl)?;

        // Round-trip through the decoder; keeps only input a model can use.
        BASE64.decode(payload)?;

        Ok(Self {
            data: payload.to_string(),
            mime_type: if mime.is_empty() {
                "image/jpeg".into()
            } else {
                mime.to_string()
            },
        })
    }
}

fn mime_from_extension(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        // jpg / jpeg / unknown — the original client always sent JPEG.
        _ => "image/jpeg",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn from_bytes_encodes_standard_base64() {
        let img = EncodedImage::from_bytes(b"hello", "image/png");
        assert_eq!(img.data, "aGVsbG8=");
        assert_eq!(img.mime_type, "image/png");
    }

    #[test]
    fn from_file_reads_and_sniffs_mime() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("photo.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let img = EncodedImage::from_file(&path).expect("encode");
        assert_eq!(img.mime_type, "image/png");
        assert!(!img.data.is_empty());
    }

    #[test]
    fn from_file_unknown_extension_defaults_to_jpeg() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("snapshot.raw");
        std::fs::write(&path, b"bytes").unwrap();

        let img = EncodedImage::from_file(&path).expect("encode");
        assert_eq!(img.mime_type, "image/jpeg");
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let err = EncodedImage::from_file("/no/such/file.jpg").unwrap_err();
        assert!(matches!(err, EncodingError::Io(_)));
    }

    #[test]
    fn data_url_prefix_is_stripped() {
        let img = EncodedImage::from_data_url("data:image/png;base64,aGVsbG8=").expect("parse");
        assert_eq!(img.data, "aGVsbG8=");
        assert_eq!(img.mime_type, "image/png");
    }

    #[test]
    fn data_url_without_prefix_is_rejected() {
        let err = EncodedImage::from_data_url("aGVsbG8=").unwrap_err();
        assert!(matches!(err, EncodingError::InvalidDataUrl));
    }

    #[test]
    fn data_url_without_base64_marker_is_rejected() {
        let err = EncodedImage::from_data_url("data:text/plain,hello").unwrap_err();
        assert!(matches!(err, EncodingError::InvalidDataUrl));
    }

    #[test]
    fn data_url_with_garbage_payload_is_rejected() {
        let err = EncodedImage::from_data_url("data:image/jpeg;base64,!!!not-base64!!!")
            .unwrap_err();
        assert!(matches!(err, EncodingError::InvalidBase64(_)));
    }

    #[test]
    fn data_url_empty_mime_defaults_to_jpeg() {
        let img = EncodedImage::from_data_url("data:;base64,aGVsbG8=").expect("parse");
        assert_eq!(img.mime_type, "image/jpeg");
    }
}
