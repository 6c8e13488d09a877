//! HTTP client for the detection and stream services.
//!
//! Every call is a single request: no retries, no timeouts, no
//! cancellation. Callers decide what to do with a stale answer.

mod error;
pub mod mjpeg;

use futures::{Stream, StreamExt, stream};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::multipart::{Form, Part};

use crate::models::{Detection, GpuStatus, HealthResponse, HealthStatus, PredictResponse};

pub use error::{ClientError, DEFAULT_API_ERROR, ErrorKind};
use mjpeg::FrameSplitter;

/// Form field the service reads the uploaded image from.
pub const IMAGE_FIELD: &str = "image";

const TUNNEL_SKIP_HEADER: &str = "ngrok-skip-browser-warning";

#[derive(Debug, Clone)]
pub struct DetectionClient {
    http: reqwest::Client,
}

impl DetectionClient {
    pub fn new() -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(TUNNEL_SKIP_HEADER, HeaderValue::from_static("any"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))),
        );
        let http = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self { http })
    }

    /// Upload one image to `POST {endpoint}/predict`.
    pub async fn submit_image(
        &self,
        endpoint: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Vec<Detection>, ClientError> {
        let url = endpoint_url(endpoint, "predict")?;
        let mut part = Part::bytes(bytes).file_name(file_name.to_string());
        if let Ok(format) = image::ImageFormat::from_path(file_name) {
            part = part.mime_str(format.to_mime_type())?;
        }
        let form = Form::new().part(IMAGE_FIELD, part);

        tracing::debug!(%url, file_name, "submitting image");
        let response = self.http.post(&url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http(status));
        }

        let body = response.bytes().await?;
        let parsed: PredictResponse = serde_json::from_slice(&body)?;
        if parsed.success {
            let detections = parsed.detections.unwrap_or_default();
            tracing::info!(count = detections.len(), "received detections");
            Ok(detections)
        } else {
            Err(ClientError::Api(
                parsed.error.unwrap_or_else(|| DEFAULT_API_ERROR.to_string()),
            ))
        }
    }

    /// `GET {endpoint}/health`.
    ///
    /// An HTML response is reported as [`ClientError::TunnelWarning`] without
    /// looking at the body.
    pub async fn check_health(&self, endpoint: &str) -> Result<HealthStatus, ClientError> {
        let url = endpoint_url(endpoint, "health")?;
        let response = self.http.get(&url).send().await?;

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("text/html"));
        if is_html {
            tracing::warn!(%url, "health check returned an HTML page");
            return Err(ClientError::TunnelWarning);
        }

        let body = response.bytes().await?;
        let health: HealthResponse = serde_json::from_slice(&body)?;
        Ok(health.into())
    }

    /// `GET {endpoint}/gpu_status` on the stream service.
    pub async fn gpu_status(&self, endpoint: &str) -> Result<GpuStatus, ClientError> {
        let url = endpoint_url(endpoint, "gpu_status")?;
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http(status));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Open `GET {endpoint}/video_feed` and yield each JPEG frame as it
    /// completes. The stream ends when the server closes the connection.
    pub async fn video_frames(
        &self,
        endpoint: &str,
    ) -> Result<impl Stream<Item = Result<Vec<u8>, ClientError>> + Send + 'static + use<>, ClientError> {
        let url = video_feed_url(endpoint)?;
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http(status));
        }
        tracing::info!(%url, "video feed opened");

        let mut splitter = FrameSplitter::new();
        let frames = response
            .bytes_stream()
            .map(move |chunk| match chunk {
                Ok(bytes) => splitter.push(&bytes).into_iter().map(Ok).collect::<Vec<_>>(),
                Err(e) => vec![Err(ClientError::from(e))],
            })
            .flat_map(stream::iter);
        Ok(frames)
    }
}

pub fn video_feed_url(endpoint: &str) -> Result<String, ClientError> {
    endpoint_url(endpoint, "video_feed")
}

/// Join a user-typed base URL and a path. The base only has to be non-empty.
pub fn endpoint_url(endpoint: &str, path: &str) -> Result<String, ClientError> {
    let base = endpoint.trim().trim_end_matches('/');
    if base.is_empty() {
        return Err(ClientError::EmptyEndpoint);
    }
    Ok(format!("{base}/{path}"))
}
