//! Conversion of user-selected image files into transportable form
//!
//! The model endpoint accepts images as base64 text plus a declared media
//! type. This module sniffs the media type from the file content rather
//! than trusting the extension, mirroring content-based detection on load.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::{BgRemovalError, Result};

/// An uploaded image in transportable form: base64 payload, sniffed media
/// type, and the original file name (used to derive the output name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Base64-encoded image bytes, without any data-URI prefix
    pub data: String,
    /// MIME string detected from the image content (e.g. `image/jpeg`)
    pub media_type: String,
    /// Display name of the source file
    pub file_name: String,
}

impl EncodedImage {
    /// Encode raw image bytes for transport.
    ///
    /// # Errors
    /// Returns [`BgRemovalError::Decode`] if the bytes are empty or not a
    /// recognizable image format.
    pub fn from_bytes(bytes: &[u8], file_name: impl Into<String>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(BgRemovalError::decode("empty image data"));
        }
        let format = image::guess_format(bytes)
            .map_err(|e| BgRemovalError::decode(format!("unrecognized image content: {e}")))?;
        Ok(Self {
            data: BASE64.encode(bytes),
            media_type: format.to_mime_type().to_string(),
            file_name: file_name.into(),
        })
    }

    /// Read and encode an image file.
    ///
    /// # Errors
    /// Returns [`BgRemovalError::Decode`] if the file cannot be read or its
    /// content is not a recognizable image.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            BgRemovalError::decode(format!("failed to read '{}': {e}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Self::from_bytes(&bytes, file_name)
    }

    /// Render as a data URI directly usable as an image source.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Wrap base64 PNG data as a `data:image/png;base64,...` URI.
#[must_use]
pub fn png_data_uri(data: &str) -> String {
    format!("data:image/png;base64,{data}")
}

/// Strip a `data:<type>;base64,` prefix if present.
///
/// Callers sometimes hand over a full data URI instead of the bare payload;
/// the wire format wants only the payload.
#[must_use]
pub fn strip_data_uri_prefix(data: &str) -> &str {
    match data.split_once(',') {
        Some((prefix, payload)) if prefix.starts_with("data:") => payload,
        _ => data,
    }
}
