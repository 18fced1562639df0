//! Integration tests for the removal session lifecycle
//!
//! These tests drive the full upload → process → done/error flow against
//! stub removers, without any network access.

use async_trait::async_trait;
use gemini_bgremove::{
    BackgroundRemover, BgRemovalError, RemovalSession, Result, SessionState,
    LOAD_FAILED_MESSAGE, REMOVAL_FAILED_MESSAGE,
};

/// Remover that always returns the same base64 payload
struct FixedRemover(&'static str);

#[async_trait]
impl BackgroundRemover for FixedRemover {
    async fn remove_background(&self, _data: &str, _media_type: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// Remover that simulates a response with zero inline image parts
struct NoImageRemover;

#[async_trait]
impl BackgroundRemover for NoImageRemover {
    async fn remove_background(&self, _data: &str, _media_type: &str) -> Result<String> {
        Err(BgRemovalError::NoImageInResponse)
    }
}

/// Remover that simulates a network-level failure
struct FailingRemover;

#[async_trait]
impl BackgroundRemover for FailingRemover {
    async fn remove_background(&self, _data: &str, _media_type: &str) -> Result<String> {
        Err(BgRemovalError::upstream("connection refused"))
    }
}

fn valid_jpeg() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(2, 2, image::Rgb([200, 100, 50]));
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Jpeg,
    )
    .unwrap();
    bytes
}

#[tokio::test]
async fn upload_then_removal_reaches_done_with_data_uri() {
    let mut session = RemovalSession::new();

    assert_eq!(session.load_bytes(&valid_jpeg(), "cat.jpg"), SessionState::Ready);
    let original = session.original().unwrap();
    assert_eq!(original.file_name, "cat.jpg");
    assert_eq!(original.media_type, "image/jpeg");

    let state = session.remove_background(&FixedRemover("QUJD")).await;
    assert_eq!(state, SessionState::Done);
    assert_eq!(session.processed(), Some("data:image/png;base64,QUJD"));
    assert!(session.error_message().is_none());
    assert!(!session.is_loading());
}

#[tokio::test]
async fn empty_upstream_response_sets_generic_error_and_keeps_original() {
    let mut session = RemovalSession::new();
    session.load_bytes(&valid_jpeg(), "cat.jpg");

    let state = session.remove_background(&NoImageRemover).await;
    assert_eq!(state, SessionState::Error);
    assert_eq!(session.error_message(), Some(REMOVAL_FAILED_MESSAGE));
    assert!(session.original().is_some());
    assert!(session.processed().is_none());
}

#[tokio::test]
async fn network_failure_and_empty_response_surface_the_same_message() {
    let mut session = RemovalSession::new();
    session.load_bytes(&valid_jpeg(), "cat.jpg");
    session.remove_background(&FailingRemover).await;
    let network_message = session.error_message().map(str::to_owned);

    session.load_bytes(&valid_jpeg(), "cat.jpg");
    session.remove_background(&NoImageRemover).await;
    assert_eq!(session.error_message().map(str::to_owned), network_message);
}

#[tokio::test]
async fn unreadable_upload_reports_load_failure_without_original() {
    let mut session = RemovalSession::new();
    let state = session.load_bytes(b"this is not an image", "cat.jpg");

    assert_eq!(state, SessionState::Empty);
    assert_eq!(session.error_message(), Some(LOAD_FAILED_MESSAGE));
    assert!(session.original().is_none());
}

#[tokio::test]
async fn new_upload_clears_previous_result_and_error() {
    let mut session = RemovalSession::new();

    // Reach Done, then upload again
    session.load_bytes(&valid_jpeg(), "first.jpg");
    session.remove_background(&FixedRemover("QUJD")).await;
    assert_eq!(session.state(), SessionState::Done);

    assert_eq!(session.load_bytes(&valid_jpeg(), "second.jpg"), SessionState::Ready);
    assert!(session.processed().is_none());
    assert!(session.error_message().is_none());
    assert_eq!(session.original().unwrap().file_name, "second.jpg");

    // Reach Error, then upload again
    session.remove_background(&FailingRemover).await;
    assert_eq!(session.state(), SessionState::Error);
    assert_eq!(session.load_bytes(&valid_jpeg(), "third.jpg"), SessionState::Ready);
    assert!(session.error_message().is_none());
}

#[tokio::test]
async fn reset_from_any_state_matches_initial_state() {
    let initial = RemovalSession::new();

    let mut from_done = RemovalSession::new();
    from_done.load_bytes(&valid_jpeg(), "cat.jpg");
    from_done.remove_background(&FixedRemover("QUJD")).await;
    from_done.reset();

    let mut from_error = RemovalSession::new();
    from_error.load_bytes(&valid_jpeg(), "cat.jpg");
    from_error.remove_background(&FailingRemover).await;
    from_error.reset();

    for session in [&from_done, &from_error] {
        assert_eq!(session.state(), initial.state());
        assert!(session.original().is_none());
        assert!(session.processed().is_none());
        assert!(session.error_message().is_none());
        assert!(!session.is_loading());
    }
}

#[tokio::test]
async fn rerunning_removal_from_done_is_permitted() {
    let mut session = RemovalSession::new();
    session.load_bytes(&valid_jpeg(), "cat.jpg");

    session.remove_background(&FixedRemover("RklSU1Q=")).await;
    assert_eq!(session.processed(), Some("data:image/png;base64,RklSU1Q="));

    // The second run is independent of the first result
    let state = session.remove_background(&FixedRemover("U0VDT05E")).await;
    assert_eq!(state, SessionState::Done);
    assert_eq!(session.processed(), Some("data:image/png;base64,U0VDT05E"));

    // A failing re-run replaces the result with the error
    session.remove_background(&FailingRemover).await;
    assert_eq!(session.state(), SessionState::Error);
    assert!(session.processed().is_none());
}

#[tokio::test]
async fn removal_without_upload_is_a_noop() {
    let mut session = RemovalSession::new();
    let state = session.remove_background(&FixedRemover("QUJD")).await;
    assert_eq!(state, SessionState::Empty);
    assert!(session.processed().is_none());
    assert!(session.error_message().is_none());
}
