//! State of the image-upload flow, independent of any GUI toolkit.

use std::borrow::Borrow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use image::DynamicImage;

use crate::client::ClientError;
use crate::models::{Detection, HealthStatus};

pub const NO_IMAGE_SELECTED: &str = "กรุณาเลือกรูปภาพก่อน";
pub const API_UNHEALTHY: &str = "⚠️ API ไม่ปกติ";

/// Identifies one submission. Only the newest id may update the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

/// Hands out monotonically increasing request ids.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn next(&mut self) -> RequestId {
        self.latest += 1;
        RequestId(self.latest)
    }

    pub fn is_latest(&self, id: RequestId) -> bool {
        id.0 == self.latest
    }

    /// Make every id handed out so far stale.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }
}

/// An image picked by the user, kept both encoded (for upload) and decoded
/// (for rendering).
#[derive(Debug, Clone)]
pub struct SelectedImage {
    pub file_name: String,
    pub bytes: Arc<Vec<u8>>,
    pub image: Arc<DynamicImage>,
}

impl SelectedImage {
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> anyhow::Result<Self> {
        let file_name = file_name.into();
        let image = image::load_from_memory(&bytes)
            .with_context(|| format!("Failed to decode image {file_name}"))?;
        Ok(Self {
            file_name,
            bytes: Arc::new(bytes),
            image: Arc::new(image),
        })
    }

    pub async fn open(path: PathBuf) -> anyhow::Result<Self> {
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {:?}", path))?;
        let file_name = file_name_of(&path);
        tokio::task::spawn_blocking(move || Self::from_bytes(file_name, bytes)).await?
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

/// A submission the caller must perform and report back with
/// [`UploadSession::finish_submit`].
#[derive(Debug, Clone)]
pub struct PendingSubmit {
    pub id: RequestId,
    pub file_name: String,
    pub bytes: Arc<Vec<u8>>,
}

#[derive(Debug, Default)]
pub struct UploadSession {
    selected: Option<SelectedImage>,
    detections: Vec<Detection>,
    hover: Option<usize>,
    error: Option<String>,
    loading: bool,
    sequencer: RequestSequencer,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&SelectedImage> {
        self.selected.as_ref()
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn hover(&self) -> Option<usize> {
        self.hover
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn can_submit(&self) -> bool {
        self.selected.is_some() && !self.loading
    }

    /// Replace the current image. Detections of the previous image are
    /// dropped and any in-flight request for it becomes stale.
    pub fn select_image(&mut self, image: SelectedImage) {
        self.selected = Some(image);
        self.clear_results();
    }

    /// Start a submission, or record an error if nothing is selected.
    pub fn begin_submit(&mut self) -> Option<PendingSubmit> {
        let Some(selected) = &self.selected else {
            self.error = Some(NO_IMAGE_SELECTED.to_string());
            return None;
        };
        let pending = PendingSubmit {
            id: self.sequencer.next(),
            file_name: selected.file_name.clone(),
            bytes: selected.bytes.clone(),
        };
        self.loading = true;
        self.error = None;
        Some(pending)
    }

    /// Apply a response. Returns `false` when the response was stale and
    /// ignored.
    pub fn finish_submit<E: Borrow<ClientError>>(
        &mut self,
        id: RequestId,
        result: Result<Vec<Detection>, E>,
    ) -> bool {
        if !self.sequencer.is_latest(id) {
            tracing::debug!(?id, "discarding stale detection response");
            return false;
        }
        self.loading = false;
        self.hover = None;
        match result {
            Ok(detections) => {
                self.detections = detections;
                self.error = None;
            }
            Err(e) => {
                let e = e.borrow();
                tracing::warn!("detection request failed: {e}");
                self.error = Some(e.user_message());
            }
        }
        true
    }

    pub fn record_health<E: Borrow<ClientError>>(&mut self, result: Result<HealthStatus, E>) {
        self.error = match result {
            Ok(HealthStatus::Healthy) => None,
            Ok(HealthStatus::Unhealthy(status)) => {
                tracing::warn!(%status, "detection API reports unhealthy");
                Some(API_UNHEALTHY.to_string())
            }
            Err(e) => Some(format!("เชื่อมต่อไม่ได้: {}", e.borrow())),
        };
    }

    /// Set the highlighted detection. Returns whether it changed.
    pub fn set_hover(&mut self, hover: Option<usize>) -> bool {
        let hover = hover.filter(|&i| i < self.detections.len());
        let changed = self.hover != hover;
        self.hover = hover;
        changed
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Forget the image, its detections and any in-flight request.
    pub fn reset(&mut self) {
        self.selected = None;
        self.clear_results();
    }

    fn clear_results(&mut self) {
        self.detections.clear();
        self.hover = None;
        self.error = None;
        self.loading = false;
        self.sequencer.invalidate();
    }
}
