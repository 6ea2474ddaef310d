//! Outbound transmission with carrier sense, backoff, and retry.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use crossbeam_channel::{Receiver as ChannelReceiver, RecvTimeoutError};
use rand::Rng;
use tracing::{debug, warn};

use wavelink_core::{
    config::{Settings, SlotSelection},
    rf::Rf,
    status::{Status, StatusCell},
};
use wavelink_protocol::Frame;

use crate::{ack_slot::AckSlot, clock::MacClock};

/// Pause between carrier-sense checks while the medium is busy.
const IDLE_WAIT: Duration = Duration::from_millis(50);
/// Pause between ack-slot polls while the acknowledgement timer runs.
const ACK_WAIT: Duration = Duration::from_millis(50);
/// How long one queue poll blocks before beacons are rechecked.
const QUEUE_POLL: Duration = Duration::from_millis(50);
/// Base acknowledgement timeout in milliseconds; one slot time is added.
const BASE_ACK_TIMEOUT: u64 = 7_500;
/// Carrier-sense polling granularity; DIFS waits are rounded up to it.
const POLL_BOUNDARY: u64 = 50;

/// Actor that drains the outbound queue and performs CSMA/CA transmission.
///
/// Per work item: wait for the medium to stay idle through a DIFS, back off
/// a number of slots if it was ever busy, transmit, and (for unicast frames)
/// poll the shared ack slot until the acknowledgement timer expires. A
/// missed acknowledgement doubles the contention window, sets the
/// retransmission flag, and tries again until the RF retry limit is spent.
///
/// Due beacons preempt the queue, so a busy neighbor cannot starve time
/// synchronization; the queue's head-of-line blocking for data frames is by
/// design.
pub struct Sender {
    rf: Arc<dyn Rf>,
    clock: Arc<MacClock>,
    ack_slot: Arc<AckSlot>,
    outbound: ChannelReceiver<Frame>,
    settings: Arc<Settings>,
    status: Arc<StatusCell>,
    stop: Arc<AtomicBool>,
    difs: u64,
    ack_timeout: u64,
}

impl Sender {
    /// Creates the actor; call [`Sender::run`] on its own thread.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rf: Arc<dyn Rf>,
        clock: Arc<MacClock>,
        ack_slot: Arc<AckSlot>,
        outbound: ChannelReceiver<Frame>,
        settings: Arc<Settings>,
        status: Arc<StatusCell>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        let difs = rf.sifs_time() + 2 * rf.slot_time();
        let ack_timeout = BASE_ACK_TIMEOUT + rf.slot_time();
        Self { rf, clock, ack_slot, outbound, settings, status, stop, difs, ack_timeout }
    }

    /// Transmits queued frames and due beacons until stopped.
    pub fn run(self) {
        while !self.stop.load(Ordering::Relaxed) {
            // Due beacons take priority over queued data.
            if let Some(beacon) = self.clock.build_beacon() {
                self.transmit_with_retry(beacon, false);
                continue;
            }

            let frame = match self.outbound.recv_timeout(QUEUE_POLL) {
                Ok(frame) => frame,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };
            self.transmit_with_retry(frame, true);
        }
    }

    /// Runs the full CSMA/CA cycle for one frame. `from_host` frames report
    /// their outcome through the status cell; beacons do not.
    fn transmit_with_retry(&self, frame: Frame, from_host: bool) {
        let cw_max = self.rf.cw_max();
        let retry_limit = self.rf.retry_limit();

        // cw is the size of the draw interval, so random(cw) covers [0, CW]
        // for CW in {aCWmin, ..., aCWmax}.
        let mut cw = self.rf.cw_min() + 1;
        let mut retry = 0;
        let mut frame = frame;

        loop {
            let was_busy = self.wait_for_idle();
            if was_busy {
                self.backoff(cw);
            }

            if self.transmit_once(&frame) {
                if self.settings.debug_full() {
                    debug!(%frame, retry, "delivered");
                }
                if from_host {
                    self.status.set(Status::TxDelivered);
                }
                return;
            }

            retry += 1;
            if retry >= retry_limit || self.stop.load(Ordering::Relaxed) {
                if self.settings.debug_errors() {
                    warn!(%frame, retry, "delivery abandoned");
                }
                if from_host {
                    self.status.set(Status::TxFailed);
                }
                return;
            }

            if self.settings.debug_full() {
                debug!(%frame, retry, "ack timed out, retransmitting");
            }
            frame = frame.into_retransmission();
            cw = (cw * 2).min(cw_max + 1);
        }
    }

    /// Waits until the medium has stayed idle through a full DIFS.
    ///
    /// Returns whether the medium was ever observed busy, which is what
    /// decides if a backoff is owed.
    fn wait_for_idle(&self) -> bool {
        let mut was_busy = false;
        loop {
            while self.rf.in_use() {
                was_busy = true;
                if self.stop.load(Ordering::Relaxed) {
                    return was_busy;
                }
                thread::sleep(IDLE_WAIT);
            }

            // DIFS, rounded up to the next polling boundary so waits stay
            // aligned with the carrier-sense granularity.
            let align = POLL_BOUNDARY - self.clock.now() % POLL_BOUNDARY;
            thread::sleep(Duration::from_millis(self.difs + align));

            if !self.rf.in_use() {
                return was_busy;
            }
        }
    }

    /// Sleeps through the drawn number of backoff slots. A slot interrupted
    /// by a busy medium costs another full DIFS wait before counting on.
    fn backoff(&self, cw: u32) {
        let slots = match self.settings.slot_selection() {
            SlotSelection::Random => rand::rng().random_range(0..cw),
            SlotSelection::MaxContention => cw - 1,
        };
        if self.settings.debug_full() {
            debug!(slots, cw, "backing off");
        }

        let slot_time = Duration::from_millis(self.rf.slot_time());
        for _ in 0..slots {
            thread::sleep(slot_time);
            if self.rf.in_use() {
                self.wait_for_idle();
            }
        }
    }

    /// One transmission attempt: clear the ack slot, put the frame on the
    /// air, and await the acknowledgement where one is expected. Broadcast
    /// frames (beacons included) count as delivered immediately.
    fn transmit_once(&self, frame: &Frame) -> bool {
        self.ack_slot.clear();
        self.rf.transmit(frame.bytes());

        if !frame.expects_ack() {
            return true;
        }

        let timeout = self.clock.now() + self.ack_timeout;
        loop {
            if self.ack_slot.take().is_some() {
                return true;
            }
            if self.clock.now() >= timeout || self.stop.load(Ordering::Relaxed) {
                return false;
            }
            thread::sleep(ACK_WAIT);
        }
    }
}
