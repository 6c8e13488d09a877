use serde::{Deserialize, Serialize};

/// One object instance predicted by the detection service.
///
/// `bbox` is `[x1, y1, x2, y2]` in the pixel space of the uploaded image,
/// never in display space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class: u32,
    pub class_name: String,
    pub confidence: f32,
    pub bbox: [f32; 4],
}

impl Detection {
    pub fn width(&self) -> f32 {
        self.bbox[2] - self.bbox[0]
    }

    pub fn height(&self) -> f32 {
        self.bbox[3] - self.bbox[1]
    }

    /// Box corners rounded to whole pixels, halves away from zero, e.g.
    /// `[12, 40, 300, 211]`.
    pub fn rounded_bbox(&self) -> String {
        let parts: Vec<String> = self.bbox.iter().map(|v| format!("{}", v.round())).collect();
        format!("[{}]", parts.join(", "))
    }
}

/// Body of `POST /predict`.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    pub success: bool,
    #[serde(default)]
    pub detections: Option<Vec<Detection>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

impl From<HealthResponse> for HealthStatus {
    fn from(response: HealthResponse) -> Self {
        if response.status == "healthy" {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy(response.status)
        }
    }
}

/// Body of `GET /gpu_status` on the stream service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuStatus {
    pub gpu_available: bool,
    #[serde(default)]
    pub gpu_name: Option<String>,
    /// Bytes allocated by the model runtime.
    #[serde(default)]
    pub gpu_memory_allocated: Option<f64>,
    #[serde(default)]
    pub gpu_memory_reserved: Option<f64>,
}

impl GpuStatus {
    pub fn allocated_mb(&self) -> Option<String> {
        self.gpu_memory_allocated.map(format_mb)
    }

    pub fn reserved_mb(&self) -> Option<String> {
        self.gpu_memory_reserved.map(format_mb)
    }
}

fn format_mb(bytes: f64) -> String {
    format!("{:.1} MB", bytes / 1024.0 / 1024.0)
}

/// Count detections per class name, in order of first appearance.
pub fn class_summary(detections: &[Detection]) -> Vec<(String, usize)> {
    let mut summary: Vec<(String, usize)> = Vec::new();
    for det in detections {
        match summary.iter_mut().find(|(name, _)| *name == det.class_name) {
            Some((_, count)) => *count += 1,
            None => summary.push((det.class_name.clone(), 1)),
        }
    }
    summary
}
