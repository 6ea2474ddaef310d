//! Host-visible status codes.

use std::sync::atomic::{AtomicI32, Ordering};

/// Status of the most recent link-layer operation.
///
/// The integer values are part of the host contract and must not change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum Status {
    /// Initialization completed without error.
    Success = 1,
    /// General error code.
    UnspecifiedError = 2,
    /// The RF layer could not be initialized.
    RfInitFailed = 3,
    /// The last transmission was acknowledged.
    TxDelivered = 4,
    /// The last transmission was abandoned after repeated delivery attempts.
    TxFailed = 5,
    /// A negative buffer size was supplied.
    BadBufSize = 6,
    /// A buffer or address argument was missing.
    BadAddress = 7,
    /// An illegal MAC address was specified.
    BadMacAddress = 8,
    /// One or more arguments are invalid.
    IllegalArgument = 9,
    /// An outgoing transmission was rejected for lack of buffer space.
    InsufficientBufferSpace = 10,
}

/// Shared status cell, written by the sender actor and the link layer and
/// read back by the host through `status()`.
#[derive(Debug)]
pub struct StatusCell(AtomicI32);

impl StatusCell {
    /// Creates a cell holding [`Status::Success`].
    pub fn new() -> Self {
        Self(AtomicI32::new(Status::Success as i32))
    }

    /// Creates a cell holding the given initial status.
    pub fn with_status(status: Status) -> Self {
        Self(AtomicI32::new(status as i32))
    }

    /// Records a new status.
    pub fn set(&self, status: Status) {
        self.0.store(status as i32, Ordering::Relaxed);
    }

    /// Returns the current status as its integer code.
    pub fn code(&self) -> i32 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}
