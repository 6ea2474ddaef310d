//! Header parsing and payload extraction.

use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};

use wavelink_core::{
    constants::{CRC_SIZE, HEADER_SIZE, MAX_SEQUENCE, MIN_FRAME_SIZE, RETRANSMISSION_SHIFT, TYPE_SHIFT},
    error::{ErrorKind, Result},
};

use crate::frame::{Frame, FrameType};

/// Parses received bytes into a [`Frame`].
///
/// Only the length is validated here; a frame with a bad CRC parses fine and
/// is weeded out by `Frame::checksum_valid`. Keeping validation separate lets
/// the receiver trace corrupt frames without an error path in the hot loop.
pub fn decode(bytes: &[u8]) -> Result<Frame> {
    if bytes.len() < MIN_FRAME_SIZE {
        return Err(ErrorKind::MalformedFrame);
    }

    let mut cursor = Cursor::new(bytes);
    let control = cursor.read_u16::<BigEndian>().map_err(|_| ErrorKind::MalformedFrame)?;
    let dest_addr = cursor.read_u16::<BigEndian>().map_err(|_| ErrorKind::MalformedFrame)?;
    let src_addr = cursor.read_u16::<BigEndian>().map_err(|_| ErrorKind::MalformedFrame)?;

    let payload = bytes[HEADER_SIZE..bytes.len() - CRC_SIZE].to_vec();

    Ok(Frame {
        frame_type: FrameType::from_code(control >> TYPE_SHIFT),
        retransmission: (control >> RETRANSMISSION_SHIFT) & 0b1 == 1,
        sequence: control & MAX_SEQUENCE,
        dest_addr,
        src_addr,
        payload,
        bytes: bytes.to_vec(),
    })
}
