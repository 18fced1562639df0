//! # Gemini Background Removal Library
//!
//! Removes image backgrounds by delegating to Google's Gemini image model:
//! the input image is base64-encoded and sent to the `generateContent`
//! endpoint with a fixed instruction requesting background removal with
//! transparency, and the first inline image part of the response is the
//! PNG result.
//!
//! The crate is built around three pieces:
//!
//! - [`EncodedImage`]: converts an image file or byte buffer into the
//!   transportable base64-plus-media-type form, sniffing the media type
//!   from content.
//! - [`GeminiClient`]: issues the single removal request. It is used
//!   through the [`BackgroundRemover`] trait so tests (and alternative
//!   backends) can substitute their own implementation.
//! - [`RemovalSession`]: the state controller driving the
//!   idle → loaded → processing → done/error lifecycle, with sequence
//!   fencing so stale responses never clobber fresh state.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gemini_bgremove::{remove_background_from_path, GeminiClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = GeminiClient::from_env()?; // reads GEMINI_API_KEY
//! let output = remove_background_from_path("cat.jpg", &client).await?;
//! println!("wrote {}", output.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Driving the session directly
//!
//! ```rust,no_run
//! use gemini_bgremove::{GeminiClient, RemovalSession, SessionState};
//!
//! # async fn example(bytes: Vec<u8>) -> anyhow::Result<()> {
//! let client = GeminiClient::from_env()?;
//! let mut session = RemovalSession::new();
//! session.load_bytes(&bytes, "upload.png");
//! if session.remove_background(&client).await == SessionState::Done {
//!     let data_uri = session.processed().unwrap();
//!     // render or persist the data URI
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Library vs CLI usage
//!
//! All core functionality is available by default; enable the `cli`
//! feature (on by default) for the command-line interface:
//!
//! ```toml
//! [dependencies]
//! gemini-bgremove = { version = "0.1", default-features = false }
//! ```

pub mod client;
#[cfg(feature = "cli")]
pub mod cli;
pub mod encoder;
pub mod error;
pub mod services;
pub mod session;
#[cfg(feature = "cli")]
pub mod tracing_config;

use std::path::{Path, PathBuf};

// Public API exports
pub use client::{BackgroundRemover, GeminiClient, API_KEY_ENV, DEFAULT_MODEL};
pub use encoder::{png_data_uri, strip_data_uri_prefix, EncodedImage};
pub use error::{BgRemovalError, Result, LOAD_FAILED_MESSAGE, REMOVAL_FAILED_MESSAGE};
pub use services::OutputService;
pub use session::{RemovalSession, RemovalTicket, SessionState};

#[cfg(feature = "cli")]
pub use tracing_config::TracingConfig;

/// Remove the background from in-memory image bytes.
///
/// Encodes the bytes, issues one removal request through the given
/// remover, and returns the processed result as a
/// `data:image/png;base64,...` URI.
///
/// # Errors
/// - [`BgRemovalError::Decode`] if the bytes are not a recognizable image
/// - [`BgRemovalError::Upstream`] / [`BgRemovalError::NoImageInResponse`]
///   if the removal request fails
pub async fn remove_background_from_bytes(
    image_bytes: &[u8],
    remover: &dyn BackgroundRemover,
) -> Result<String> {
    let encoded = EncodedImage::from_bytes(image_bytes, "image")?;
    let data = remover
        .remove_background(&encoded.data, &encoded.media_type)
        .await?;
    Ok(png_data_uri(&data))
}

/// Remove the background from an image file and write the result next to
/// it as `<base>-no-bg.png`. Returns the output path.
///
/// # Errors
/// - [`BgRemovalError::Decode`] if the file cannot be read as an image
/// - [`BgRemovalError::Upstream`] / [`BgRemovalError::NoImageInResponse`]
///   if the removal request fails
/// - [`BgRemovalError::Io`] if the output cannot be written
pub async fn remove_background_from_path(
    path: impl AsRef<Path>,
    remover: &dyn BackgroundRemover,
) -> Result<PathBuf> {
    let path = path.as_ref();
    let encoded = EncodedImage::from_file(path).await?;
    let data = remover
        .remove_background(&encoded.data, &encoded.media_type)
        .await?;
    let output = OutputService::output_path_for(path);
    OutputService::save_png(&data, &output)?;
    Ok(output)
}
