use std::io::Cursor;

use axum::{
    Json, Router,
    extract::Multipart,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use image::{ImageBuffer, ImageFormat, Rgb};
use roadcount::Detection;
use serde_json::{Value, json};
use tempfile::NamedTempFile;

/// Encodes a solid-color image of the given size as PNG bytes.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |_, _| Rgb([40u8, 40u8, 40u8]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .expect("Failed to encode test image");
    out.into_inner()
}

/// Creates a 100x100 test image on disk and returns the temp file.
/// The file will be automatically cleaned up when dropped.
pub fn create_test_image() -> NamedTempFile {
    let img = ImageBuffer::from_fn(100, 100, |_, _| Rgb([255u8, 0u8, 0u8]));
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

pub fn make_detection(class: u32, class_name: &str, confidence: f32, bbox: [f32; 4]) -> Detection {
    Detection {
        class,
        class_name: class_name.to_string(),
        confidence,
        bbox,
    }
}

/// The two-detection payload the mock service answers with.
pub fn sample_detections() -> Vec<Detection> {
    vec![
        make_detection(2, "car", 0.873, [12.4, 40.0, 300.6, 211.2]),
        make_detection(3, "motorcycle", 0.61, [320.0, 80.0, 380.0, 160.0]),
    ]
}

/// Serves `router` on an ephemeral localhost port and returns its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let addr = listener.local_addr().expect("Mock server has no address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{addr}")
}

/// `POST /predict` answering `body` with `status`, after checking the upload
/// arrived in the `image` field.
pub fn predict_router(status: StatusCode, body: Value) -> Router {
    Router::new().route(
        "/predict",
        post(move |mut multipart: Multipart| {
            let body = body.clone();
            async move {
                let mut has_image = false;
                while let Ok(Some(field)) = multipart.next_field().await {
                    if field.name() == Some("image") {
                        has_image = field.bytes().await.is_ok_and(|b| !b.is_empty());
                    }
                }
                if !has_image {
                    return (StatusCode::BAD_REQUEST, Json(json!({"success": false, "error": "no image"})));
                }
                (status, Json(body))
            }
        }),
    )
}

pub fn predict_success_body() -> Value {
    json!({ "success": true, "detections": sample_detections() })
}

pub fn health_router(status: &'static str) -> Router {
    Router::new().route("/health", get(move || async move { Json(json!({ "status": status })) }))
}

/// A tunnel interstitial: HTML content type, even though the body looks
/// like JSON.
pub fn html_health_router() -> Router {
    Router::new().route(
        "/health",
        get(|| async {
            (
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                r#"{"status": "healthy"}"#,
            )
        }),
    )
}

pub fn gpu_router() -> Router {
    Router::new().route(
        "/gpu_status",
        get(|| async {
            Json(json!({
                "gpu_available": true,
                "gpu_name": "Test GPU",
                "gpu_memory_allocated": 104857600.0,
                "gpu_memory_reserved": 209715200.0
            }))
        }),
    )
}

/// A minimal byte sequence framed by JPEG start and end markers.
pub fn fake_jpeg(fill: u8, len: usize) -> Vec<u8> {
    let mut frame = vec![0xFF, 0xD8];
    frame.extend(std::iter::repeat_n(fill, len));
    frame.extend([0xFF, 0xD9]);
    frame
}

/// Wraps frames the way an MJPEG server does.
pub fn mjpeg_body(frames: &[Vec<u8>]) -> Vec<u8> {
    let mut body = Vec::new();
    for frame in frames {
        body.extend_from_slice(b"--frame\r\nContent-Type: image/jpeg\r\n\r\n");
        body.extend_from_slice(frame);
        body.extend_from_slice(b"\r\n");
    }
    body
}

pub fn video_router(frames: Vec<Vec<u8>>) -> Router {
    Router::new().route(
        "/video_feed",
        get(move || {
            let body = mjpeg_body(&frames);
            async move {
                (
                    [(header::CONTENT_TYPE, "multipart/x-mixed-replace; boundary=frame")],
                    body,
                )
                    .into_response()
            }
        }),
    )
}

/// Encodes a real JPEG of the given size.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| Rgb([(x * 7) as u8, (y * 5) as u8, 90u8]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Jpeg)
        .expect("Failed to encode test JPEG");
    out.into_inner()
}

/// A JPEG whose APP1 segment embeds a complete thumbnail JPEG, the way
/// camera EXIF data does.
pub fn jpeg_with_thumbnail() -> Vec<u8> {
    let main = jpeg_bytes(48, 32);
    let thumbnail = jpeg_bytes(8, 8);

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&thumbnail);
    let len = u16::try_from(payload.len() + 2).expect("thumbnail fits in one segment");

    let mut frame = main[..2].to_vec();
    frame.extend_from_slice(&[0xFF, 0xE1]);
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&payload);
    frame.extend_from_slice(&main[2..]);
    frame
}
