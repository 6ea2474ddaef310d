//! The RF transport contract.

/// Physical-layer radio abstraction consumed by the MAC engine.
///
/// Implementations must be thread-safe: the engine runs three long-lived
/// actors (sender, receiver, acknowledger) that share one RF handle, and the
/// sender and acknowledger may call [`Rf::transmit`] concurrently.
pub trait Rf: Send + Sync {
    /// Puts a fully encoded frame on the air. Fire-and-forget: delivery is
    /// not confirmed at this layer.
    fn transmit(&self, frame: &[u8]);

    /// Blocks until a complete frame has been received and returns its bytes.
    ///
    /// An empty buffer signals that the RF layer is shutting down; callers
    /// must not interpret it as a frame.
    fn receive(&self) -> Vec<u8>;

    /// Instantaneous carrier sense: true while a transmission is in the air.
    fn in_use(&self) -> bool;

    /// Monotonic clock in milliseconds.
    fn clock(&self) -> u64;

    /// Short inter-frame space in milliseconds, used by acknowledgements.
    fn sifs_time(&self) -> u64;

    /// Slot time in milliseconds, the unit of contention backoff.
    fn slot_time(&self) -> u64;

    /// Smallest contention window.
    fn cw_min(&self) -> u32;

    /// Largest contention window.
    fn cw_max(&self) -> u32;

    /// Number of delivery attempts before a unicast frame is abandoned.
    fn retry_limit(&self) -> u32;
}
