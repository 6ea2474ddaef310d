//! Frame serialization and deserialization.
//!
//! The wire layout is `| control (2) | dest (2) | src (2) | payload | crc (4) |`,
//! all fields big-endian. The control field packs the frame type (bits
//! 15..13), the retransmission flag (bit 12), and the 12-bit sequence number.
//!
//! # Module Organization
//!
//! - [`encoder`] - control-field construction and frame layout
//! - [`decoder`] - header parsing and payload extraction
//! - [`checksum`] - CRC-32 computation and verification

pub mod checksum;
pub mod decoder;
pub mod encoder;
