//! SIFS-delayed acknowledgement transmitter.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::trace;

use wavelink_core::{config::Settings, rf::Rf};
use wavelink_protocol::Frame;

/// How often the actor wakes to check its stop flag while the queue is idle.
const STOP_POLL: Duration = Duration::from_millis(50);

/// Actor that transmits acknowledgements exactly one SIFS after dequeueing.
///
/// ACKs deliberately skip carrier sense: SIFS is shorter than DIFS, so an
/// acknowledgement claims the medium before any DIFS-waiting contender can
/// start. The queue is unbounded, but the receiver enqueues at most one ACK
/// per delivered unicast data frame, so growth is bounded by inbound rate.
pub struct Acknowledger {
    rf: Arc<dyn Rf>,
    queue: Receiver<Frame>,
    settings: Arc<Settings>,
    stop: Arc<AtomicBool>,
}

impl Acknowledger {
    /// Creates the actor; call [`Acknowledger::run`] on its own thread.
    pub fn new(
        rf: Arc<dyn Rf>,
        queue: Receiver<Frame>,
        settings: Arc<Settings>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self { rf, queue, settings, stop }
    }

    /// Drains the ACK queue until stopped or disconnected.
    pub fn run(self) {
        while !self.stop.load(Ordering::Relaxed) {
            let ack = match self.queue.recv_timeout(STOP_POLL) {
                Ok(ack) => ack,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            thread::sleep(Duration::from_millis(self.rf.sifs_time()));
            if self.settings.debug_full() {
                trace!(sequence = ack.sequence(), dest = ack.dest_addr(), "transmitting ack");
            }
            self.rf.transmit(ack.bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::Mutex,
        time::Instant,
    };

    use crossbeam_channel::unbounded;
    use wavelink_protocol::FrameType;

    use super::*;

    /// RF stub that records every transmission with a timestamp.
    struct RecordingRf {
        epoch: Instant,
        transmissions: Mutex<Vec<(u64, Vec<u8>)>>,
    }

    impl RecordingRf {
        fn new() -> Arc<Self> {
            Arc::new(Self { epoch: Instant::now(), transmissions: Mutex::new(Vec::new()) })
        }
    }

    impl Rf for RecordingRf {
        fn transmit(&self, frame: &[u8]) {
            let at = self.epoch.elapsed().as_millis() as u64;
            self.transmissions.lock().unwrap().push((at, frame.to_vec()));
        }
        fn receive(&self) -> Vec<u8> {
            Vec::new()
        }
        fn in_use(&self) -> bool {
            false
        }
        fn clock(&self) -> u64 {
            self.epoch.elapsed().as_millis() as u64
        }
        fn sifs_time(&self) -> u64 {
            30
        }
        fn slot_time(&self) -> u64 {
            10
        }
        fn cw_min(&self) -> u32 {
            3
        }
        fn cw_max(&self) -> u32 {
            31
        }
        fn retry_limit(&self) -> u32 {
            5
        }
    }

    #[test]
    fn test_ack_goes_out_one_sifs_after_dequeue() {
        let rf = RecordingRf::new();
        let (tx, rx) = unbounded();
        let stop = Arc::new(AtomicBool::new(false));
        let actor = Acknowledger::new(
            Arc::clone(&rf) as Arc<dyn Rf>,
            rx,
            Arc::new(Settings::default()),
            Arc::clone(&stop),
        );
        let handle = thread::spawn(move || actor.run());

        let ack = Frame::new(FrameType::Ack, false, 3, 0x0001, 0x0002, &[]);
        tx.send(ack.clone()).unwrap();

        drop(tx);
        handle.join().unwrap();

        let transmissions = rf.transmissions.lock().unwrap();
        assert_eq!(transmissions.len(), 1);
        let (at, bytes) = &transmissions[0];
        assert!(*at >= 30, "ack went out after {at} ms, before SIFS elapsed");
        assert_eq!(bytes, ack.bytes());
    }

    #[test]
    fn test_stop_flag_ends_the_actor() {
        let rf = RecordingRf::new();
        let (_tx, rx) = unbounded::<Frame>();
        let stop = Arc::new(AtomicBool::new(false));
        let actor = Acknowledger::new(
            Arc::clone(&rf) as Arc<dyn Rf>,
            rx,
            Arc::new(Settings::default()),
            Arc::clone(&stop),
        );
        let handle = thread::spawn(move || actor.run());

        stop.store(true, Ordering::Relaxed);
        handle.join().unwrap();
        assert!(rf.transmissions.lock().unwrap().is_empty());
    }
}
