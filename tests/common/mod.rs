mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from roadcount for tests
pub use roadcount::{
    ClientError, Dataset, DateFilter, Detection, DetectionClient, ErrorKind, GpuStatus, HealthStatus,
    IdFilter, OverlayRenderer, RecordFilter, Settings, UploadSession,
};
