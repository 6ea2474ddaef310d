//! The record `recv` fills for the host.

/// One delivered data frame, as seen by the host.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transmission {
    /// Address the frame was sent to: the local MAC, or broadcast.
    pub dest_addr: u16,
    /// Address of the station that sent the frame.
    pub src_addr: u16,
    /// The frame payload.
    pub buf: Vec<u8>,
}
