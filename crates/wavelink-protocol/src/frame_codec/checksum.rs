//! CRC-32 computation and verification.

use crc32fast::Hasher;

use wavelink_core::constants::{CRC_SIZE, MIN_FRAME_SIZE};

/// Computes the IEEE CRC-32 of the given bytes.
pub fn compute(bytes: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    hasher.finalize()
}

/// Appends the big-endian CRC-32 of the buffer to the buffer.
pub fn append_in_place(frame: &mut Vec<u8>) {
    let crc = compute(frame);
    frame.extend_from_slice(&crc.to_be_bytes());
}

/// Recomputes the CRC over everything but the trailing 4 bytes and compares
/// it to the stored big-endian value.
pub fn verify(frame: &[u8]) -> bool {
    if frame.len() < MIN_FRAME_SIZE {
        return false;
    }
    let (covered, stored) = frame.split_at(frame.len() - CRC_SIZE);
    let stored = u32::from_be_bytes([stored[0], stored[1], stored[2], stored[3]]);
    compute(covered) == stored
}
