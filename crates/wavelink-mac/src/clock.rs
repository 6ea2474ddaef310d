//! Offset-corrected network clock and beacon scheduling.

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc, Mutex,
};

use tracing::warn;

use wavelink_core::{
    constants::{BROADCAST_ADDR, MAX_SEQUENCE},
    rf::Rf,
};
use wavelink_protocol::{Frame, FrameType};

/// Lead added to a beacon's timestamp so that the encoded time reflects the
/// frame's expected on-the-air instant after DIFS and backoff, converging
/// participants forward.
const BEACON_LEAD: u64 = 2_000;

/// Network time source shared by every actor.
///
/// Local time is the RF clock plus a non-negative offset. The offset only
/// ever grows: an inbound beacon that is ahead of us pulls us forward, one
/// that is behind is ignored, so synchronized stations converge on the
/// maximum observed timestamp and time never runs backward.
pub struct MacClock {
    rf: Arc<dyn Rf>,
    mac_addr: u16,
    interval_ms: AtomicI64,
    inner: Mutex<ClockInner>,
}

#[derive(Debug)]
struct ClockInner {
    offset: u64,
    last_beacon: u64,
    sequence: u16,
}

impl MacClock {
    /// Creates a clock with offset 0. A negative interval disables beacons.
    pub fn new(rf: Arc<dyn Rf>, mac_addr: u16, interval_ms: i64) -> Self {
        Self {
            rf,
            mac_addr,
            interval_ms: AtomicI64::new(interval_ms),
            inner: Mutex::new(ClockInner { offset: 0, last_beacon: 0, sequence: 0 }),
        }
    }

    /// Current network time in milliseconds.
    pub fn now(&self) -> u64 {
        self.rf.clock() + self.inner.lock().unwrap().offset
    }

    /// Updates the beacon interval in milliseconds; negative disables.
    pub fn set_interval(&self, interval_ms: i64) {
        self.interval_ms.store(interval_ms, Ordering::Relaxed);
    }

    /// Absorbs an inbound beacon's timestamp. Timestamps behind local time
    /// are ignored; the offset never decreases.
    pub fn absorb_beacon(&self, beacon: &Frame) {
        let payload = beacon.payload();
        let Some(stamp) = payload.get(..8) else {
            warn!(len = payload.len(), "beacon payload too short for a timestamp, ignoring");
            return;
        };
        let timestamp = u64::from_be_bytes([
            stamp[0], stamp[1], stamp[2], stamp[3], stamp[4], stamp[5], stamp[6], stamp[7],
        ]);

        let mut inner = self.inner.lock().unwrap();
        let now = self.rf.clock() + inner.offset;
        if timestamp > now {
            inner.offset += timestamp - now;
        }
    }

    /// True when beacons are enabled and the interval has elapsed.
    pub fn beacon_ready(&self) -> bool {
        let interval = self.interval_ms.load(Ordering::Relaxed);
        if interval < 0 {
            return false;
        }
        let inner = self.inner.lock().unwrap();
        let now = self.rf.clock() + inner.offset;
        now >= inner.last_beacon + interval as u64
    }

    /// Builds the next beacon if one is due, else `None`.
    ///
    /// The payload is the expected on-the-air time as a big-endian u64. The
    /// last-beacon mark is aligned down to the interval boundary so beacon
    /// spacing stays phase-locked to the interval.
    pub fn build_beacon(&self) -> Option<Frame> {
        let interval = self.interval_ms.load(Ordering::Relaxed);
        if interval < 0 {
            return None;
        }

        let mut inner = self.inner.lock().unwrap();
        let now = self.rf.clock() + inner.offset;
        if now < inner.last_beacon + interval as u64 {
            return None;
        }

        let payload = (now + BEACON_LEAD).to_be_bytes();
        let beacon = Frame::new(
            FrameType::Beacon,
            false,
            inner.sequence,
            BROADCAST_ADDR,
            self.mac_addr,
            &payload,
        );
        inner.sequence = (inner.sequence + 1) & MAX_SEQUENCE;
        inner.last_beacon = if interval > 0 { now - now % interval as u64 } else { now };
        Some(beacon)
    }
}
