//! Frame type and the owned frame structure.

use std::fmt;

use wavelink_core::{constants::BROADCAST_ADDR, error::Result};

use crate::frame_codec::{checksum, decoder, encoder};

/// The 3-bit frame type carried in the control field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameType {
    /// User data.
    Data,
    /// Positive acknowledgement of a unicast data frame.
    Ack,
    /// Broadcast time-synchronization frame.
    Beacon,
    /// Clear-to-send (decoded but not exchanged by this engine).
    Cts,
    /// Request-to-send (decoded but not exchanged by this engine).
    Rts,
}

impl FrameType {
    /// Returns the wire code for this type.
    pub fn code(self) -> u16 {
        match self {
            FrameType::Data => 0b000,
            FrameType::Ack => 0b001,
            FrameType::Beacon => 0b010,
            FrameType::Cts => 0b100,
            FrameType::Rts => 0b101,
        }
    }

    /// Maps a wire code onto a type. Unknown codes decode as [`FrameType::Data`]
    /// so that a garbled control field never aborts reception; the CRC check
    /// is what decides whether the frame survives.
    pub fn from_code(code: u16) -> Self {
        match code {
            0b000 => FrameType::Data,
            0b001 => FrameType::Ack,
            0b010 => FrameType::Beacon,
            0b100 => FrameType::Cts,
            0b101 => FrameType::Rts,
            _ => FrameType::Data,
        }
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameType::Data => "DATA",
            FrameType::Ack => "ACK",
            FrameType::Beacon => "BEACON",
            FrameType::Cts => "CTS",
            FrameType::Rts => "RTS",
        };
        f.write_str(name)
    }
}

/// An owned link-layer frame: parsed header fields plus the encoded bytes.
///
/// Outgoing frames are encoded eagerly by [`Frame::new`]; incoming frames
/// keep the received bytes so [`Frame::checksum_valid`] can verify them
/// without re-encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub(crate) frame_type: FrameType,
    pub(crate) retransmission: bool,
    pub(crate) sequence: u16,
    pub(crate) dest_addr: u16,
    pub(crate) src_addr: u16,
    pub(crate) payload: Vec<u8>,
    pub(crate) bytes: Vec<u8>,
}

impl Frame {
    /// Builds and encodes an outgoing frame. The payload is copied.
    pub fn new(
        frame_type: FrameType,
        retransmission: bool,
        sequence: u16,
        dest_addr: u16,
        src_addr: u16,
        payload: &[u8],
    ) -> Self {
        let bytes =
            encoder::encode(frame_type, retransmission, sequence, dest_addr, src_addr, payload);
        Self {
            frame_type,
            retransmission,
            sequence,
            dest_addr,
            src_addr,
            payload: payload.to_vec(),
            bytes,
        }
    }

    /// Parses received bytes into a frame.
    ///
    /// Parsing is infallible for any input of at least 10 bytes; shorter
    /// inputs fail with [`wavelink_core::error::ErrorKind::MalformedFrame`].
    /// A parsed frame may still carry a bad CRC; check
    /// [`Frame::checksum_valid`] before trusting it.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        decoder::decode(bytes)
    }

    /// Builds the acknowledgement for a received unicast data frame: same
    /// sequence number, swapped addresses, empty payload.
    pub fn ack_for(frame: &Frame) -> Self {
        Frame::new(
            FrameType::Ack,
            false,
            frame.sequence,
            frame.src_addr,
            frame.dest_addr,
            &[],
        )
    }

    /// Recomputes the CRC over everything but the trailing 4 bytes and
    /// compares it to the stored value.
    pub fn checksum_valid(&self) -> bool {
        checksum::verify(&self.bytes)
    }

    /// Consumes the frame and re-encodes it with the retransmission flag set.
    /// The sequence number is unchanged.
    pub fn into_retransmission(self) -> Self {
        Frame::new(
            self.frame_type,
            true,
            self.sequence,
            self.dest_addr,
            self.src_addr,
            &self.payload,
        )
    }

    /// The frame type.
    pub fn frame_type(&self) -> FrameType {
        self.frame_type
    }

    /// True if this is not the first transmission of this frame.
    pub fn is_retransmission(&self) -> bool {
        self.retransmission
    }

    /// The 12-bit frame sequence number.
    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    /// Destination MAC address.
    pub fn dest_addr(&self) -> u16 {
        self.dest_addr
    }

    /// Source MAC address.
    pub fn src_addr(&self) -> u16 {
        self.src_addr
    }

    /// The frame payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The complete encoded frame, header through CRC.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// True if the frame is addressed to every station.
    pub fn is_broadcast(&self) -> bool {
        self.dest_addr == BROADCAST_ADDR
    }

    /// True if the transmitter must wait for an acknowledgement. Broadcast
    /// frames (beacons included) are never acknowledged.
    pub fn expects_ack(&self) -> bool {
        !self.is_broadcast()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} r={} seq={} {:#06x}->{:#06x} {}b]",
            self.frame_type,
            self.retransmission as u8,
            self.sequence,
            self.src_addr,
            self.dest_addr,
            self.payload.len(),
        )
    }
}
