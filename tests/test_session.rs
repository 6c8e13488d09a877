//! Integration tests for the image upload session.
//!
//! Tests cover:
//! - Submitting with and without a selected image
//! - Discarding stale detection responses
//! - Health results, hover clamping and reset
//! - Opening images from disk

mod common;

use std::sync::Arc;

use common::*;
use roadcount::session::{API_UNHEALTHY, NO_IMAGE_SELECTED, RequestSequencer, SelectedImage};

fn selected(name: &str) -> anyhow::Result<SelectedImage> {
    SelectedImage::from_bytes(name, png_bytes(32, 24))
}

#[tokio::test]
async fn test_submit_requires_an_image() -> anyhow::Result<()> {
    let mut session = UploadSession::new();
    assert!(!session.can_submit());
    assert!(session.begin_submit().is_none());
    assert_eq!(session.error(), Some(NO_IMAGE_SELECTED));
    assert!(!session.is_loading());
    Ok(())
}

#[tokio::test]
async fn test_submit_and_finish() -> anyhow::Result<()> {
    let mut session = UploadSession::new();
    session.select_image(selected("road.png")?);

    let pending = session.begin_submit().expect("image is selected");
    assert_eq!(pending.file_name, "road.png");
    assert!(session.is_loading());
    assert!(!session.can_submit());

    assert!(session.finish_submit(pending.id, Ok::<_, ClientError>(sample_detections())));
    assert!(!session.is_loading());
    assert_eq!(session.detections(), sample_detections().as_slice());
    assert_eq!(session.error(), None);
    Ok(())
}

#[tokio::test]
async fn test_stale_response_is_discarded() -> anyhow::Result<()> {
    let mut session = UploadSession::new();
    session.select_image(selected("first.png")?);
    let first = session.begin_submit().expect("image is selected");

    session.select_image(selected("second.png")?);
    let second = session.begin_submit().expect("image is selected");

    assert!(!session.finish_submit(first.id, Ok::<_, ClientError>(sample_detections())));
    assert!(session.detections().is_empty());
    assert!(session.is_loading());

    let only_car = vec![make_detection(2, "car", 0.5, [0.0, 0.0, 10.0, 10.0])];
    assert!(session.finish_submit(second.id, Ok::<_, ClientError>(only_car.clone())));
    assert_eq!(session.detections(), only_car.as_slice());
    Ok(())
}

#[tokio::test]
async fn test_new_image_clears_previous_results() -> anyhow::Result<()> {
    let mut session = UploadSession::new();
    session.select_image(selected("first.png")?);
    let pending = session.begin_submit().expect("image is selected");
    session.finish_submit(pending.id, Ok::<_, ClientError>(sample_detections()));
    assert!(session.set_hover(Some(1)));

    session.select_image(selected("second.png")?);
    assert!(session.detections().is_empty());
    assert_eq!(session.hover(), None);
    assert_eq!(session.selected().map(|s| s.file_name.as_str()), Some("second.png"));
    Ok(())
}

#[tokio::test]
async fn test_failed_submit_sets_error() -> anyhow::Result<()> {
    let mut session = UploadSession::new();
    session.select_image(selected("road.png")?);
    let pending = session.begin_submit().expect("image is selected");

    let err = Arc::new(ClientError::Api("model not loaded".to_string()));
    assert!(session.finish_submit(pending.id, Err(err)));
    assert_eq!(session.error(), Some("model not loaded"));
    assert!(session.detections().is_empty());
    assert!(session.can_submit());
    Ok(())
}

#[tokio::test]
async fn test_hover_is_clamped_to_detections() -> anyhow::Result<()> {
    let mut session = UploadSession::new();
    session.select_image(selected("road.png")?);
    assert!(!session.set_hover(Some(0)));
    assert_eq!(session.hover(), None);

    let pending = session.begin_submit().expect("image is selected");
    session.finish_submit(pending.id, Ok::<_, ClientError>(sample_detections()));
    assert!(session.set_hover(Some(1)));
    assert!(!session.set_hover(Some(1)));
    assert!(session.set_hover(Some(5)));
    assert_eq!(session.hover(), None);
    Ok(())
}

#[tokio::test]
async fn test_health_results() -> anyhow::Result<()> {
    let mut session = UploadSession::new();

    session.record_health(Ok::<_, ClientError>(HealthStatus::Unhealthy("loading".to_string())));
    assert_eq!(session.error(), Some(API_UNHEALTHY));

    session.record_health(Ok::<_, ClientError>(HealthStatus::Healthy));
    assert_eq!(session.error(), None);

    session.record_health(Err(ClientError::TunnelWarning));
    assert!(session.error().is_some_and(|e| e.starts_with("เชื่อมต่อไม่ได้")));
    Ok(())
}

#[tokio::test]
async fn test_reset_forgets_everything() -> anyhow::Result<()> {
    let mut session = UploadSession::new();
    session.select_image(selected("road.png")?);
    let pending = session.begin_submit().expect("image is selected");

    session.reset();
    assert!(session.selected().is_none());
    assert!(!session.is_loading());
    assert!(!session.finish_submit(pending.id, Ok::<_, ClientError>(sample_detections())));
    assert!(session.detections().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_sequencer_only_accepts_latest() -> anyhow::Result<()> {
    let mut sequencer = RequestSequencer::default();
    let a = sequencer.next();
    let b = sequencer.next();
    assert!(a < b);
    assert!(!sequencer.is_latest(a));
    assert!(sequencer.is_latest(b));
    sequencer.invalidate();
    assert!(!sequencer.is_latest(b));
    Ok(())
}

#[tokio::test]
async fn test_open_reads_image_from_disk() -> anyhow::Result<()> {
    let file = create_test_image();
    let image = SelectedImage::open(file.path().to_path_buf()).await?;
    assert_eq!(image.image.width(), 100);
    assert!(image.file_name.ends_with(".png"));
    assert!(SelectedImage::from_bytes("broken.png", vec![1, 2, 3]).is_err());
    Ok(())
}
