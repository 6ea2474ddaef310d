//! In-process simulated radio medium.
//!
//! [`Medium`] models a single shared radio channel: every frame transmitted
//! by one endpoint is heard by all the others, carrier sense reports true
//! while any frame is on the air, and an optional [`Interceptor`] can lose or
//! corrupt frames in flight. Each [`SimRf`] endpoint implements the [`Rf`]
//! contract, so a handful of link layers can be wired together in one
//! process for tests and examples.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::trace;

use crate::{interceptor::Interceptor, rf::Rf};

/// Channel characteristics and MAC parameters of a simulated medium.
#[derive(Clone, Debug)]
pub struct MediumConfig {
    /// Short inter-frame space in milliseconds.
    pub sifs_time: u64,
    /// Slot time in milliseconds.
    pub slot_time: u64,
    /// Smallest contention window.
    pub cw_min: u32,
    /// Largest contention window.
    pub cw_max: u32,
    /// Delivery attempts before a unicast frame is abandoned.
    pub retry_limit: u32,
    /// How long a frame occupies the air, in wall-clock milliseconds.
    pub airtime_ms: u64,
    /// Multiplier applied to the wall clock. Values above 1 make protocol
    /// timeouts expire faster than real time, which keeps retry tests short.
    pub time_scale: u64,
}

impl Default for MediumConfig {
    fn default() -> Self {
        Self {
            sifs_time: 100,
            slot_time: 200,
            cw_min: 3,
            cw_max: 31,
            retry_limit: 5,
            airtime_ms: 2,
            time_scale: 1,
        }
    }
}

struct MediumInner {
    config: MediumConfig,
    epoch: Instant,
    on_air: AtomicUsize,
    endpoints: Mutex<Vec<Sender<Vec<u8>>>>,
    interceptor: Mutex<Option<Box<dyn Interceptor>>>,
}

/// A shared simulated radio channel.
#[derive(Clone)]
pub struct Medium {
    inner: Arc<MediumInner>,
}

impl Medium {
    /// Creates a medium with the given characteristics.
    pub fn new(config: MediumConfig) -> Self {
        Self {
            inner: Arc::new(MediumInner {
                config,
                epoch: Instant::now(),
                on_air: AtomicUsize::new(0),
                endpoints: Mutex::new(Vec::new()),
                interceptor: Mutex::new(None),
            }),
        }
    }

    /// Joins the medium and returns a new radio endpoint.
    pub fn endpoint(&self) -> SimRf {
        let (tx, rx) = unbounded();
        let mut endpoints = self.inner.endpoints.lock().unwrap();
        endpoints.push(tx);
        SimRf {
            inner: Arc::clone(&self.inner),
            inbox: rx,
            index: endpoints.len() - 1,
        }
    }

    /// Installs an interceptor applied to every subsequent transmission.
    pub fn set_interceptor(&self, interceptor: Box<dyn Interceptor>) {
        *self.inner.interceptor.lock().unwrap() = Some(interceptor);
    }

    /// Removes the installed interceptor, restoring lossless delivery.
    pub fn clear_interceptor(&self) {
        *self.inner.interceptor.lock().unwrap() = None;
    }

    /// Shuts the medium down. Every blocked `receive()` returns an empty
    /// buffer and later transmissions are heard by nobody.
    pub fn close(&self) {
        self.inner.endpoints.lock().unwrap().clear();
    }
}

impl Default for Medium {
    fn default() -> Self {
        Self::new(MediumConfig::default())
    }
}

/// One endpoint of a [`Medium`].
pub struct SimRf {
    inner: Arc<MediumInner>,
    inbox: Receiver<Vec<u8>>,
    index: usize,
}

impl Rf for SimRf {
    fn transmit(&self, frame: &[u8]) {
        let mut bytes = frame.to_vec();
        let keep = match self.inner.interceptor.lock().unwrap().as_mut() {
            Some(interceptor) => interceptor.on_transmit(&mut bytes),
            None => true,
        };

        trace!(endpoint = self.index, len = bytes.len(), lost = !keep, "frame on the air");

        // The frame occupies the air for its airtime whether or not the
        // interceptor loses it; carrier sense must still fire.
        self.inner.on_air.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(self.inner.config.airtime_ms));
        if keep {
            let endpoints = self.inner.endpoints.lock().unwrap();
            for (index, endpoint) in endpoints.iter().enumerate() {
                if index != self.index {
                    let _ = endpoint.send(bytes.clone());
                }
            }
        }
        self.inner.on_air.fetch_sub(1, Ordering::SeqCst);
    }

    fn receive(&self) -> Vec<u8> {
        self.inbox.recv().unwrap_or_default()
    }

    fn in_use(&self) -> bool {
        self.inner.on_air.load(Ordering::SeqCst) > 0
    }

    fn clock(&self) -> u64 {
        self.inner.epoch.elapsed().as_millis() as u64 * self.inner.config.time_scale
    }

    fn sifs_time(&self) -> u64 {
        self.inner.config.sifs_time
    }

    fn slot_time(&self) -> u64 {
        self.inner.config.slot_time
    }

    fn cw_min(&self) -> u32 {
        self.inner.config.cw_min
    }

    fn cw_max(&self) -> u32 {
        self.inner.config.cw_max
    }

    fn retry_limit(&self) -> u32 {
        self.inner.config.retry_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_reach_every_other_endpoint() {
        let medium = Medium::default();
        let a = medium.endpoint();
        let b = medium.endpoint();
        let c = medium.endpoint();

        a.transmit(&[1, 2, 3]);

        assert_eq!(b.receive(), vec![1, 2, 3]);
        assert_eq!(c.receive(), vec![1, 2, 3]);
        // The transmitter does not hear its own frame.
        assert!(a.inbox.is_empty());
    }

    #[test]
    fn test_carrier_sense_during_transmission() {
        let medium = Medium::new(MediumConfig { airtime_ms: 50, ..MediumConfig::default() });
        let a = medium.endpoint();
        let b = medium.endpoint();

        let handle = thread::spawn(move || a.transmit(&[0xAA; 16]));

        // Wait until the frame is on the air, then observe carrier sense.
        let mut observed_busy = false;
        for _ in 0..100 {
            if b.in_use() {
                observed_busy = true;
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        handle.join().unwrap();

        assert!(observed_busy);
        assert!(!b.in_use());
    }

    #[test]
    fn test_close_unblocks_receive() {
        let medium = Medium::default();
        let rf = medium.endpoint();

        medium.close();
        assert!(rf.receive().is_empty());
    }

    #[test]
    fn test_interceptor_loses_frames_but_holds_the_air() {
        struct DropAll;
        impl Interceptor for DropAll {
            fn on_transmit(&mut self, _frame: &mut Vec<u8>) -> bool {
                false
            }
        }

        let medium = Medium::default();
        let a = medium.endpoint();
        let b = medium.endpoint();
        medium.set_interceptor(Box::new(DropAll));

        a.transmit(&[9, 9, 9]);
        assert!(b.inbox.is_empty());

        medium.clear_interceptor();
        a.transmit(&[1]);
        assert_eq!(b.receive(), vec![1]);
    }

    #[test]
    fn test_scaled_clock_runs_faster() {
        let medium = Medium::new(MediumConfig { time_scale: 100, ..MediumConfig::default() });
        let rf = medium.endpoint();

        let before = rf.clock();
        thread::sleep(Duration::from_millis(10));
        let elapsed = rf.clock() - before;

        assert!(elapsed >= 1000, "scaled clock advanced only {elapsed} ms");
    }
}
