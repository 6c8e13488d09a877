//! Integration tests for the detection API client.
//!
//! Tests cover:
//! - Image upload and detection parsing
//! - Endpoint normalization and empty endpoints
//! - API, HTTP and transport failures and their error kinds
//! - Health checks, including tunnel warning pages
//! - GPU status and the MJPEG video feed

mod common;

use axum::http::StatusCode;
use common::*;
use futures::StreamExt;
use serde_json::json;

#[tokio::test]
async fn test_submit_image_returns_detections() -> anyhow::Result<()> {
    let base = spawn_server(predict_router(StatusCode::OK, predict_success_body())).await;
    let client = DetectionClient::new()?;

    let detections = client.submit_image(&base, "road.png", png_bytes(64, 48)).await?;
    assert_eq!(detections, sample_detections());

    Ok(())
}

#[tokio::test]
async fn test_trailing_slash_endpoint_is_accepted() -> anyhow::Result<()> {
    let base = spawn_server(predict_router(StatusCode::OK, predict_success_body())).await;
    let client = DetectionClient::new()?;

    let detections = client
        .submit_image(&format!("  {base}/ "), "road.png", png_bytes(8, 8))
        .await?;
    assert_eq!(detections.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_success_without_detections_is_empty() -> anyhow::Result<()> {
    let base = spawn_server(predict_router(StatusCode::OK, json!({ "success": true }))).await;
    let client = DetectionClient::new()?;

    let detections = client.submit_image(&base, "road.png", png_bytes(8, 8)).await?;
    assert!(detections.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_reported_failure_is_api_error() -> anyhow::Result<()> {
    let body = json!({ "success": false, "error": "model not loaded" });
    let base = spawn_server(predict_router(StatusCode::OK, body)).await;
    let client = DetectionClient::new()?;

    let err = client
        .submit_image(&base, "road.png", png_bytes(8, 8))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(err.user_message(), "model not loaded");

    Ok(())
}

#[tokio::test]
async fn test_failure_without_message_uses_default() -> anyhow::Result<()> {
    let base = spawn_server(predict_router(StatusCode::OK, json!({ "success": false }))).await;
    let client = DetectionClient::new()?;

    let err = client
        .submit_image(&base, "road.png", png_bytes(8, 8))
        .await
        .unwrap_err();
    assert!(matches!(&err, ClientError::Api(msg) if msg == roadcount::client::DEFAULT_API_ERROR));

    Ok(())
}

#[tokio::test]
async fn test_server_error_is_network_error() -> anyhow::Result<()> {
    let body = json!({ "success": true, "detections": [] });
    let base = spawn_server(predict_router(StatusCode::INTERNAL_SERVER_ERROR, body)).await;
    let client = DetectionClient::new()?;

    let err = client
        .submit_image(&base, "road.png", png_bytes(8, 8))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Http(s) if s == StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(err.user_message().contains("HTTP 500"));

    Ok(())
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    let client = DetectionClient::new()?;

    let err = client
        .submit_image(&format!("http://{addr}"), "road.png", png_bytes(8, 8))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert_eq!(err.kind(), ErrorKind::Network);

    Ok(())
}

#[tokio::test]
async fn test_empty_endpoint_is_rejected() -> anyhow::Result<()> {
    let client = DetectionClient::new()?;

    let err = client.check_health("   ").await.unwrap_err();
    assert!(matches!(err, ClientError::EmptyEndpoint));
    assert_eq!(err.kind(), ErrorKind::Network);

    Ok(())
}

#[tokio::test]
async fn test_health_reports_status() -> anyhow::Result<()> {
    let client = DetectionClient::new()?;

    let healthy = spawn_server(health_router("healthy")).await;
    assert_eq!(client.check_health(&healthy).await?, HealthStatus::Healthy);

    let degraded = spawn_server(health_router("loading")).await;
    let status = client.check_health(&degraded).await?;
    assert_eq!(status, HealthStatus::Unhealthy("loading".to_string()));
    assert!(!status.is_healthy());

    Ok(())
}

#[tokio::test]
async fn test_html_health_is_tunnel_warning() -> anyhow::Result<()> {
    let base = spawn_server(html_health_router()).await;
    let client = DetectionClient::new()?;

    let err = client.check_health(&base).await.unwrap_err();
    assert!(matches!(err, ClientError::TunnelWarning));
    assert_eq!(err.kind(), ErrorKind::Parse);

    Ok(())
}

#[tokio::test]
async fn test_gpu_status_reports_memory_in_mb() -> anyhow::Result<()> {
    let base = spawn_server(gpu_router()).await;
    let client = DetectionClient::new()?;

    let gpu = client.gpu_status(&base).await?;
    assert!(gpu.gpu_available);
    assert_eq!(gpu.gpu_name.as_deref(), Some("Test GPU"));
    assert_eq!(gpu.allocated_mb().as_deref(), Some("100.0 MB"));
    assert_eq!(gpu.reserved_mb().as_deref(), Some("200.0 MB"));

    Ok(())
}

#[tokio::test]
async fn test_video_feed_yields_frames() -> anyhow::Result<()> {
    let frames = vec![fake_jpeg(0x11, 32), fake_jpeg(0x22, 64), fake_jpeg(0x33, 16)];
    let base = spawn_server(video_router(frames.clone())).await;
    let client = DetectionClient::new()?;

    let received: Vec<Vec<u8>> = client
        .video_frames(&base)
        .await?
        .map(|frame| frame.expect("frame"))
        .collect()
        .await;
    assert_eq!(received, frames);

    Ok(())
}
