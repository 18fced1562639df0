//! Removal session state controller
//!
//! Holds the four state fields of an image session (original, processed
//! result, loading flag, error message) and the transitions between them.
//! The session is the single writer; views read through the accessors.
//!
//! Each removal attempt carries a sequence number. A response is applied
//! only if its ticket still matches the session's current sequence, so a
//! reset or a newer upload makes in-flight responses land as no-ops
//! instead of clobbering fresh state.

use tracing::{debug, warn};

use crate::client::BackgroundRemover;
use crate::encoder::{png_data_uri, EncodedImage};
use crate::error::Result;

/// Observable state of a removal session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No image loaded
    Empty,
    /// Original loaded, no removal attempted or in flight
    Ready,
    /// A removal request is in flight
    Processing,
    /// A processed result is available
    Done,
    /// The last action failed; the original (if any) is retained
    Error,
}

/// Token tying one removal attempt to the session state it started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalTicket {
    seq: u64,
}

/// State controller for one image session.
#[derive(Debug, Default)]
pub struct RemovalSession {
    original: Option<EncodedImage>,
    processed: Option<String>,
    loading: bool,
    error: Option<String>,
    seq: u64,
}

impl RemovalSession {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state. `Processing` and `Error` retain the original image;
    /// an encoder failure leaves the session `Empty` with a message.
    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.loading {
            SessionState::Processing
        } else if self.error.is_some() {
            if self.original.is_some() {
                SessionState::Error
            } else {
                SessionState::Empty
            }
        } else if self.processed.is_some() {
            SessionState::Done
        } else if self.original.is_some() {
            SessionState::Ready
        } else {
            SessionState::Empty
        }
    }

    /// The loaded original image, if any.
    #[must_use]
    pub fn original(&self) -> Option<&EncodedImage> {
        self.original.as_ref()
    }

    /// The processed result as a `data:image/png;base64,...` URI, if any.
    #[must_use]
    pub fn processed(&self) -> Option<&str> {
        self.processed.as_deref()
    }

    /// The current user-facing error message, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a removal request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Discard all fields unconditionally and return to the initial state.
    ///
    /// Also invalidates any in-flight removal: its response will no longer
    /// match the current sequence and is dropped on arrival.
    pub fn reset(&mut self) {
        self.original = None;
        self.processed = None;
        self.loading = false;
        self.error = None;
        self.seq += 1;
    }

    /// Load a new original image from raw bytes.
    ///
    /// All four fields reset together first, so no processed result or
    /// message from a previous image survives. On encoder failure the
    /// session stays empty with the fixed load-failure message.
    pub fn load_bytes(&mut self, bytes: &[u8], file_name: impl Into<String>) -> SessionState {
        self.reset();
        match EncodedImage::from_bytes(bytes, file_name) {
            Ok(image) => {
                debug!(file_name = %image.file_name, media_type = %image.media_type, "image loaded");
                self.original = Some(image);
            },
            Err(e) => {
                warn!("failed to load image: {e}");
                self.error = Some(e.user_message().to_string());
            },
        }
        self.state()
    }

    /// Load a new original image from a file path.
    pub async fn load_file(&mut self, path: impl AsRef<std::path::Path>) -> SessionState {
        self.reset();
        match EncodedImage::from_file(path).await {
            Ok(image) => {
                debug!(file_name = %image.file_name, media_type = %image.media_type, "image loaded");
                self.original = Some(image);
            },
            Err(e) => {
                warn!("failed to load image: {e}");
                self.error = Some(e.user_message().to_string());
            },
        }
        self.state()
    }

    /// Start a removal attempt: clears any previous result and message,
    /// raises the loading flag, and hands back the ticket the eventual
    /// outcome must present.
    ///
    /// Returns `None` when no original is loaded (trigger is a no-op then,
    /// matching the disabled-control gating at the interaction layer).
    pub fn begin_removal(&mut self) -> Option<RemovalTicket> {
        self.original.as_ref()?;
        self.processed = None;
        self.error = None;
        self.loading = true;
        self.seq += 1;
        Some(RemovalTicket { seq: self.seq })
    }

    /// Apply the outcome of a removal attempt.
    ///
    /// Returns `false` if the ticket is stale (a reset or newer attempt
    /// superseded it); the outcome is then discarded without touching any
    /// field.
    pub fn complete_removal(&mut self, ticket: RemovalTicket, outcome: Result<String>) -> bool {
        if ticket.seq != self.seq {
            debug!(
                ticket_seq = ticket.seq,
                current_seq = self.seq,
                "dropping stale removal outcome"
            );
            return false;
        }
        self.loading = false;
        match outcome {
            Ok(data) => {
                self.processed = Some(png_data_uri(&data));
            },
            Err(e) => {
                warn!("background removal failed: {e}");
                self.error = Some(e.user_message().to_string());
            },
        }
        true
    }

    /// Run one removal attempt against the given remover and apply its
    /// outcome. Re-running from `Done` is permitted and independent of the
    /// prior result.
    pub async fn remove_background(&mut self, remover: &dyn BackgroundRemover) -> SessionState {
        // Clone out what the request needs; the session stays borrowable
        // by interaction handling while the call is in flight.
        let (data, media_type) = match self.original.as_ref() {
            Some(original) => (original.data.clone(), original.media_type.clone()),
            None => return self.state(),
        };
        let Some(ticket) = self.begin_removal() else {
            return self.state();
        };
        let outcome = remover.remove_background(&data, &media_type).await;
        self.complete_removal(ticket, outcome);
        self.state()
    }
}
