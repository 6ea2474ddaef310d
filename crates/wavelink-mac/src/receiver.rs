//! Inbound frame filtering and dispatch.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crossbeam_channel::Sender;
use tracing::debug;

use wavelink_core::{config::Settings, rf::Rf};
use wavelink_protocol::{Frame, FrameType};

use crate::{ack_slot::AckSlot, clock::MacClock};

/// Actor that blocks on the RF and dispatches every inbound frame.
///
/// Frames that fail the CRC or are addressed elsewhere are dropped silently.
/// Surviving frames fan out by type: ACKs land in the shared slot for the
/// sender, beacons feed the clock, everything else (unknown types included)
/// is user data bound for the delivery queue. Delivered unicast data is
/// answered with an ACK handed to the acknowledger, enqueued only after the
/// data is in the delivery queue so the host observes the frame even when
/// the ACK itself is lost.
pub struct Receiver {
    rf: Arc<dyn Rf>,
    mac_addr: u16,
    clock: Arc<MacClock>,
    ack_slot: Arc<AckSlot>,
    delivery: Sender<Frame>,
    acks: Sender<Frame>,
    settings: Arc<Settings>,
    stop: Arc<AtomicBool>,
}

impl Receiver {
    /// Creates the actor; call [`Receiver::run`] on its own thread.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rf: Arc<dyn Rf>,
        mac_addr: u16,
        clock: Arc<MacClock>,
        ack_slot: Arc<AckSlot>,
        delivery: Sender<Frame>,
        acks: Sender<Frame>,
        settings: Arc<Settings>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self { rf, mac_addr, clock, ack_slot, delivery, acks, settings, stop }
    }

    /// Receives until stopped or the RF shuts down.
    pub fn run(self) {
        while !self.stop.load(Ordering::Relaxed) {
            let bytes = self.rf.receive();
            if bytes.is_empty() {
                // RF shutdown signal.
                break;
            }

            let frame = match Frame::decode(&bytes) {
                Ok(frame) => frame,
                Err(_) => {
                    if self.settings.debug_errors() {
                        debug!(len = bytes.len(), "runt frame dropped");
                    }
                    continue;
                }
            };

            if !frame.checksum_valid() {
                if self.settings.debug_errors() {
                    debug!(%frame, "corrupt frame dropped");
                }
                continue;
            }

            if frame.dest_addr() != self.mac_addr && !frame.is_broadcast() {
                continue;
            }

            if self.settings.debug_full() {
                debug!(%frame, "received");
            }

            match frame.frame_type() {
                FrameType::Ack => self.ack_slot.put(frame),
                FrameType::Beacon => self.clock.absorb_beacon(&frame),
                _ => {
                    let ack = (!frame.is_broadcast()).then(|| Frame::ack_for(&frame));
                    if self.delivery.send(frame).is_err() {
                        break;
                    }
                    if let Some(ack) = ack {
                        let _ = self.acks.send(ack);
                    }
                }
            }
        }
    }
}
