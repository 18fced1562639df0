//! Output file operations
//!
//! Separates disk I/O from the removal logic so the session and client
//! stay testable without touching the filesystem.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::warn;

use crate::encoder::strip_data_uri_prefix;
use crate::error::{BgRemovalError, Result};

/// Service for writing processed results to disk.
pub struct OutputService;

impl OutputService {
    /// Derive the download name for a processed image:
    /// `<originalBaseName>-no-bg.png`, next to the input.
    #[must_use]
    pub fn output_path_for(input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        input.with_file_name(format!("{stem}-no-bg.png"))
    }

    /// Decode a processed result (bare base64 or a full data URI) and
    /// write it as a PNG file.
    ///
    /// # Errors
    /// - [`BgRemovalError::Internal`] if the payload is not valid base64
    /// - [`BgRemovalError::Io`] if the file cannot be written
    pub fn save_png(processed: &str, path: &Path) -> Result<()> {
        let payload = strip_data_uri_prefix(processed);
        let bytes = BASE64
            .decode(payload)
            .map_err(|e| BgRemovalError::internal(format!("invalid base64 in result: {e}")))?;
        if image::guess_format(&bytes).is_err() {
            // The model is trusted to return PNG; a non-image payload is
            // still written so the user can inspect it.
            warn!(path = %path.display(), "processed result does not look like an image");
        }
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
