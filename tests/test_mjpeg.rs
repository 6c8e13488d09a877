//! Integration tests for MJPEG frame splitting.
//!
//! Tests cover:
//! - Splitting a multipart body into JPEG frames
//! - Frames arriving split across network chunks
//! - Holding back an incomplete frame
//! - Frames whose metadata embeds a thumbnail JPEG

mod common;

use common::*;
use roadcount::client::mjpeg::FrameSplitter;

#[tokio::test]
async fn test_whole_body_in_one_chunk() -> anyhow::Result<()> {
    let frames = vec![fake_jpeg(0x10, 20), fake_jpeg(0x20, 5)];
    let mut splitter = FrameSplitter::new();

    assert_eq!(splitter.push(&mjpeg_body(&frames)), frames);
    assert_eq!(splitter.pending(), 0);
    Ok(())
}

#[tokio::test]
async fn test_frames_split_across_chunks() -> anyhow::Result<()> {
    let frames = vec![fake_jpeg(0x10, 50), fake_jpeg(0x20, 70), fake_jpeg(0x30, 3)];
    let body = mjpeg_body(&frames);

    for chunk_size in [1, 2, 3, 7, 64] {
        let mut splitter = FrameSplitter::new();
        let received: Vec<Vec<u8>> = body
            .chunks(chunk_size)
            .flat_map(|chunk| splitter.push(chunk))
            .collect();
        assert_eq!(received, frames, "chunk size {chunk_size}");
    }
    Ok(())
}

#[tokio::test]
async fn test_incomplete_frame_is_held_back() -> anyhow::Result<()> {
    let frame = fake_jpeg(0x44, 10);
    let mut splitter = FrameSplitter::new();

    assert!(splitter.push(b"--frame\r\nContent-Type: image/jpeg\r\n\r\n").is_empty());
    assert_eq!(splitter.pending(), 0);

    assert!(splitter.push(&frame[..6]).is_empty());
    assert_eq!(splitter.pending(), 6);

    assert_eq!(splitter.push(&frame[6..]), vec![frame]);
    Ok(())
}

#[tokio::test]
async fn test_embedded_thumbnail_does_not_end_frame() -> anyhow::Result<()> {
    let frame = jpeg_with_thumbnail();
    // The thumbnail's end marker sits well before the real one.
    let first_eoi = frame.windows(2).position(|w| w == [0xFF, 0xD9]).expect("thumbnail EOI");
    assert!(first_eoi + 2 < frame.len());

    let next = jpeg_bytes(16, 16);
    let body = mjpeg_body(&[frame.clone(), next.clone()]);

    for chunk_size in [1, 5, 4096] {
        let mut splitter = FrameSplitter::new();
        let received: Vec<Vec<u8>> = body
            .chunks(chunk_size)
            .flat_map(|chunk| splitter.push(chunk))
            .collect();
        assert_eq!(received, vec![frame.clone(), next.clone()], "chunk size {chunk_size}");
    }
    Ok(())
}
