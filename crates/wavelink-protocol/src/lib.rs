#![warn(missing_docs)]

//! wavelink-protocol: frame types and the wire codec.

/// Frame type and the owned frame structure.
pub mod frame;
/// Frame serialization and deserialization.
pub mod frame_codec;
/// Per-destination sequence number bookkeeping.
pub mod sequence;

pub use frame::{Frame, FrameType};
pub use sequence::SequenceMap;
