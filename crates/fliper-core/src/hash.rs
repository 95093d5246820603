//! Content hashing of rendered frame sequences.
//!
//! The engine is deterministic: the same script and the same input images
//! always produce byte-identical frames. A SHA-256 digest over the sequence
//! makes that checkable from the CLI and from tests.

use sha2::{Digest, Sha256};

use crate::frame::FrameBuffer;

/// A SHA-256 digest of frame content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Lowercase hex rendering (64 chars).
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// First 12 hex chars, for log lines.
    pub fn short(&self) -> String {
        self.to_hex()[..12].to_string()
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// Dimensions go in first so equal bytes at different sizes differ.
fn feed(hasher: &mut Sha256, frame: &FrameBuffer) {
    hasher.update(frame.width.to_le_bytes());
    hasher.update(frame.height.to_le_bytes());
    hasher.update(&frame.data);
}

fn finish(hasher: Sha256) -> ContentHash {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hasher.finalize());
    ContentHash(bytes)
}

/// Hash of a single frame.
pub fn hash_frame(frame: &FrameBuffer) -> ContentHash {
    let mut hasher = Sha256::new();
    feed(&mut hasher, frame);
    finish(hasher)
}

/// Hash of an ordered frame sequence; frame count and order both matter.
pub fn hash_frames<'a>(frames: impl IntoIterator<Item = &'a FrameBuffer>) -> ContentHash {
    let mut hasher = Sha256::new();
    let mut count: u64 = 0;
    for frame in frames {
        feed(&mut hasher, frame);
        count += 1;
    }
    hasher.update(count.to_le_bytes());
    finish(hasher)
}
