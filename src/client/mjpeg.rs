//! Splits a `multipart/x-mixed-replace` MJPEG body into JPEG frames.
//!
//! Part headers and boundaries are skipped by scanning for the JPEG start
//! marker (`FF D8`), so the splitter does not depend on the boundary string
//! the server picked. The end of a frame is found by walking its segments,
//! which steps over metadata such as an EXIF thumbnail carrying its own
//! start and end markers.

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];

/// Frames larger than this are treated as a corrupt stream and dropped.
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Default)]
pub struct FrameSplitter {
    buf: Vec<u8>,
}

impl FrameSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk and return every frame it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();

        loop {
            let Some(start) = find(&self.buf, &SOI, 0) else {
                // Keep a trailing 0xFF, it may be the first half of a marker.
                let keep = usize::from(self.buf.last() == Some(&0xFF));
                let drop_to = self.buf.len() - keep;
                self.buf.drain(..drop_to);
                break;
            };
            self.buf.drain(..start);

            match frame_end(&self.buf) {
                Some(end) => {
                    let frame: Vec<u8> = self.buf.drain(..end).collect();
                    frames.push(frame);
                }
                None => {
                    if self.buf.len() > MAX_FRAME_BYTES {
                        tracing::warn!(buffered = self.buf.len(), "dropping oversized MJPEG frame");
                        self.buf.clear();
                    }
                    break;
                }
            }
        }

        frames
    }

    /// Bytes held back waiting for the rest of a frame.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

fn find(haystack: &[u8], needle: &[u8; 2], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(2)
        .position(|w| w == needle)
        .map(|pos| pos + from)
}

/// Length of the JPEG at the start of `buf`, or `None` while it is still
/// incomplete.
fn frame_end(buf: &[u8]) -> Option<usize> {
    let mut pos = SOI.len();
    loop {
        let marker = match buf.get(pos..pos + 2)? {
            [0xFF, marker] => *marker,
            // Not a segment boundary: fall back to the first end marker.
            _ => return find(buf, &EOI, pos).map(|end| end + EOI.len()),
        };
        match marker {
            0xFF => pos += 1,
            0xD9 => return Some(pos + EOI.len()),
            0x01 | 0xD0..=0xD7 => pos += 2,
            _ => {
                let len = buf.get(pos + 2..pos + 4)?;
                pos += 2 + usize::from(u16::from_be_bytes([len[0], len[1]]));
                if marker == 0xDA {
                    pos = skip_scan_data(buf, pos)?;
                }
            }
        }
    }
}

/// Position of the first marker after entropy-coded data starting at `pos`.
/// Stuffed `FF 00` bytes and restart markers belong to the scan.
fn skip_scan_data(buf: &[u8], mut pos: usize) -> Option<usize> {
    loop {
        pos += buf.get(pos..)?.iter().position(|&b| b == 0xFF)?;
        match *buf.get(pos + 1)? {
            0x00 | 0xD0..=0xD7 => pos += 2,
            _ => return Some(pos),
        }
    }
}
