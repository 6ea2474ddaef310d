//! Control-field construction and frame layout.

use wavelink_core::constants::{
    HEADER_SIZE, MAX_SEQUENCE, MIN_FRAME_SIZE, RETRANSMISSION_SHIFT, TYPE_SHIFT,
};

use super::checksum;
use crate::frame::FrameType;

/// Packs the frame type, retransmission flag, and sequence number into the
/// 16-bit control field. Sequence numbers are masked to 12 bits.
pub fn control_field(frame_type: FrameType, retransmission: bool, sequence: u16) -> u16 {
    (frame_type.code() << TYPE_SHIFT)
        | ((retransmission as u16) << RETRANSMISSION_SHIFT)
        | (sequence & MAX_SEQUENCE)
}

/// Lays out a complete frame and appends its CRC-32.
///
/// The CRC covers the first `6 + payload.len()` bytes. The caller's payload
/// buffer is copied, never aliased.
pub fn encode(
    frame_type: FrameType,
    retransmission: bool,
    sequence: u16,
    dest_addr: u16,
    src_addr: u16,
    payload: &[u8],
) -> Vec<u8> {
    let control = control_field(frame_type, retransmission, sequence);

    let mut frame = Vec::with_capacity(MIN_FRAME_SIZE + payload.len());
    frame.extend_from_slice(&control.to_be_bytes());
    frame.extend_from_slice(&dest_addr.to_be_bytes());
    frame.extend_from_slice(&src_addr.to_be_bytes());
    frame.extend_from_slice(payload);
    debug_assert_eq!(frame.len(), HEADER_SIZE + payload.len());

    checksum::append_in_place(&mut frame);
    frame
}
