//! Integration tests for settings loading.
//!
//! Tests cover:
//! - Defaults when no file is given
//! - Partial TOML files overriding defaults
//! - Rejecting invalid or missing files

mod common;

use std::path::PathBuf;

use common::*;
use roadcount::config::{DEFAULT_DETECTION_ENDPOINT, DEFAULT_STREAM_ENDPOINT};
use roadcount::render::DEFAULT_MAX_DISPLAY_WIDTH;

#[tokio::test]
async fn test_defaults() -> anyhow::Result<()> {
    let settings = Settings::load_or_default(None)?;
    assert_eq!(settings.detection_endpoint, DEFAULT_DETECTION_ENDPOINT);
    assert_eq!(settings.stream_endpoint, DEFAULT_STREAM_ENDPOINT);
    assert_eq!(settings.max_display_width, DEFAULT_MAX_DISPLAY_WIDTH);
    assert_eq!(settings.font_path, None);
    assert_eq!(settings.export_dir, PathBuf::from("."));
    Ok(())
}

#[tokio::test]
async fn test_partial_file_overrides_defaults() -> anyhow::Result<()> {
    let settings = Settings::from_toml_str(
        r#"
        detection_endpoint = "https://example.ngrok-free.app"
        max_display_width = 800
        "#,
    )?;
    assert_eq!(settings.detection_endpoint, "https://example.ngrok-free.app");
    assert_eq!(settings.max_display_width, 800);
    assert_eq!(settings.stream_endpoint, DEFAULT_STREAM_ENDPOINT);
    Ok(())
}

#[tokio::test]
async fn test_load_from_file() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("roadcount.toml");
    tokio::fs::write(&path, "stream_endpoint = \"http://10.0.0.5:8000\"\nexport_dir = \"out\"\n").await?;

    let settings = Settings::load_or_default(Some(&path))?;
    assert_eq!(settings.stream_endpoint, "http://10.0.0.5:8000");
    assert_eq!(settings.export_dir, PathBuf::from("out"));
    Ok(())
}

#[tokio::test]
async fn test_invalid_settings_are_rejected() -> anyhow::Result<()> {
    assert!(Settings::from_toml_str("max_display_width = 0").is_err());
    assert!(Settings::from_toml_str("max_display_width = \"wide\"").is_err());

    let dir = tempfile::TempDir::new()?;
    assert!(Settings::load(&dir.path().join("missing.toml")).is_err());
    Ok(())
}
