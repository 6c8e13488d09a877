pub mod client;
pub mod config;
pub mod dataset;
pub mod log;
pub mod models;
pub mod render;
pub mod session;

pub use client::{ClientError, DetectionClient, ErrorKind};
pub use config::Settings;
pub use dataset::{Dataset, DateFilter, IdFilter, RecordFilter};
pub use models::{Detection, GpuStatus, HealthStatus};
pub use render::OverlayRenderer;
pub use session::{RequestId, RequestSequencer, SelectedImage, UploadSession};

#[cfg(feature = "gui")]
pub mod gui;
