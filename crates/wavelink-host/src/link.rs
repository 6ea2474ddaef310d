//! The link layer service.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread,
};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use tracing::{debug, error, info};

use wavelink_core::{
    config::{Config, DebugLevel, SlotSelection, Settings},
    error::Result as CoreResult,
    rf::Rf,
    status::{Status, StatusCell},
};
use wavelink_mac::{
    AckSlot, Acknowledger, MacClock, Receiver as MacReceiver, Sender as MacSender,
    OUTBOUND_QUEUE_CAP,
};
use wavelink_protocol::{Frame, FrameType, SequenceMap};

use crate::delivery::Transmission;

/// The running engine: actor channels plus the shared clock. Absent when RF
/// initialization failed.
struct Engine {
    clock: Arc<MacClock>,
    outbound: Sender<Frame>,
    delivery: Receiver<Frame>,
}

/// An 802.11-style link layer bound to one MAC address.
///
/// Construction spawns the three engine actors; the host then talks to the
/// link through `send`/`recv`/`status`/`command`. All outcomes surface as
/// status codes. The layer is `Sync`: one thread may block in [`LinkLayer::recv`]
/// while another calls [`LinkLayer::send`].
pub struct LinkLayer {
    mac_addr: u16,
    settings: Arc<Settings>,
    status: Arc<StatusCell>,
    stop: Arc<AtomicBool>,
    sequences: Mutex<SequenceMap>,
    engine: Option<Engine>,
}

impl LinkLayer {
    /// Creates a link layer with default configuration.
    pub fn new(mac_addr: u16, rf: Arc<dyn Rf>) -> Self {
        Self::with_config(mac_addr, rf, Config::default())
    }

    /// Creates a link layer with the given configuration.
    pub fn with_config(mac_addr: u16, rf: Arc<dyn Rf>, config: Config) -> Self {
        let settings = Arc::new(Settings::new(&config));
        let status = Arc::new(StatusCell::new());
        let stop = Arc::new(AtomicBool::new(false));

        let clock = Arc::new(MacClock::new(Arc::clone(&rf), mac_addr, config.beacon_interval_ms));
        let ack_slot = Arc::new(AckSlot::new());
        let (outbound_tx, outbound_rx) = bounded(OUTBOUND_QUEUE_CAP);
        let (delivery_tx, delivery_rx) = unbounded();
        let (acks_tx, acks_rx) = unbounded();

        let sender = MacSender::new(
            Arc::clone(&rf),
            Arc::clone(&clock),
            Arc::clone(&ack_slot),
            outbound_rx,
            Arc::clone(&settings),
            Arc::clone(&status),
            Arc::clone(&stop),
        );
        thread::Builder::new()
            .name("wavelink-sender".into())
            .spawn(move || sender.run())
            .expect("failed to spawn sender thread");

        let receiver = MacReceiver::new(
            Arc::clone(&rf),
            mac_addr,
            Arc::clone(&clock),
            ack_slot,
            delivery_tx,
            acks_tx,
            Arc::clone(&settings),
            Arc::clone(&stop),
        );
        thread::Builder::new()
            .name("wavelink-receiver".into())
            .spawn(move || receiver.run())
            .expect("failed to spawn receiver thread");

        let acknowledger =
            Acknowledger::new(rf, acks_rx, Arc::clone(&settings), Arc::clone(&stop));
        thread::Builder::new()
            .name("wavelink-acknowledger".into())
            .spawn(move || acknowledger.run())
            .expect("failed to spawn acknowledger thread");

        Self {
            mac_addr,
            settings,
            status,
            stop,
            sequences: Mutex::new(SequenceMap::new()),
            engine: Some(Engine { clock, outbound: outbound_tx, delivery: delivery_rx }),
        }
    }

    /// Creates a link layer from a fallible RF initializer.
    ///
    /// On failure the layer comes up inert with status `RfInitFailed`; the
    /// caller is expected to check `status()` after construction.
    pub fn from_init<F>(mac_addr: u16, init: F) -> Self
    where
        F: FnOnce() -> CoreResult<Arc<dyn Rf>>,
    {
        match init() {
            Ok(rf) => Self::new(mac_addr, rf),
            Err(cause) => {
                error!(%cause, "RF initialization failed");
                Self {
                    mac_addr,
                    settings: Arc::new(Settings::default()),
                    status: Arc::new(StatusCell::with_status(Status::RfInitFailed)),
                    stop: Arc::new(AtomicBool::new(false)),
                    sequences: Mutex::new(SequenceMap::new()),
                    engine: None,
                }
            }
        }
    }

    /// The MAC address this link answers to.
    pub fn mac_addr(&self) -> u16 {
        self.mac_addr
    }

    /// Queues up to `len` bytes of `data` for delivery to `dest`.
    ///
    /// Returns the number of bytes accepted, or 0 on error with the reason
    /// in `status()`. A frame rejected for lack of queue space does not
    /// consume a sequence number.
    pub fn send(&self, dest: u16, data: &[u8], len: i32) -> i32 {
        if len < 0 {
            self.status.set(Status::BadBufSize);
            return 0;
        }
        let Some(engine) = &self.engine else {
            return 0;
        };

        let effective = data.len().min(len as usize);
        let mut sequences = self.sequences.lock().unwrap();
        let sequence = sequences.peek(dest);
        let frame =
            Frame::new(FrameType::Data, false, sequence, dest, self.mac_addr, &data[..effective]);

        match engine.outbound.try_send(frame) {
            Ok(()) => {
                sequences.commit(dest);
                if self.settings.debug_full() {
                    debug!(dest, len = effective, sequence, "queued for transmission");
                }
                effective as i32
            }
            Err(TrySendError::Full(_)) => {
                self.status.set(Status::InsufficientBufferSpace);
                0
            }
            Err(TrySendError::Disconnected(_)) => {
                self.status.set(Status::UnspecifiedError);
                0
            }
        }
    }

    /// Blocks until a data frame arrives, fills `out`, and returns the
    /// payload length. Returns −1 once the link has shut down.
    pub fn recv(&self, out: &mut Transmission) -> i32 {
        let Some(engine) = &self.engine else {
            return -1;
        };
        match engine.delivery.recv() {
            Ok(frame) => {
                out.dest_addr = frame.dest_addr();
                out.src_addr = frame.src_addr();
                out.buf = frame.payload().to_vec();
                out.buf.len() as i32
            }
            Err(_) => -1,
        }
    }

    /// Returns the status code of the most recent operation.
    pub fn status(&self) -> i32 {
        self.status.code()
    }

    /// Configuration surface. Always returns 0; invalid arguments set
    /// status `IllegalArgument`.
    pub fn command(&self, cmd: i32, val: i32) -> i32 {
        match cmd {
            0 => {
                info!(
                    debug_level = ?self.settings.debug_level(),
                    slot_selection = ?self.settings.slot_selection(),
                    "command 0: summarize options\n\
                     command 1: debug level (0 = none, 1 = errors, 2 = full)\n\
                     command 2: slot selection (0 = random, other = max contention window)\n\
                     command 3: beacon interval in seconds (-1 disables)"
                );
            }
            1 => match DebugLevel::from_value(val) {
                Some(level) => self.settings.set_debug_level(level),
                None => self.status.set(Status::IllegalArgument),
            },
            2 => {
                let mode =
                    if val == 0 { SlotSelection::Random } else { SlotSelection::MaxContention };
                self.settings.set_slot_selection(mode);
            }
            3 => {
                if val < -1 {
                    self.status.set(Status::IllegalArgument);
                } else {
                    let interval_ms = if val == -1 { -1 } else { val as i64 * 1_000 };
                    if let Some(engine) = &self.engine {
                        engine.clock.set_interval(interval_ms);
                    }
                }
            }
            _ => self.status.set(Status::IllegalArgument),
        }
        0
    }

    /// Stops the engine actors. The receiver may outlast this call until
    /// its blocking RF read returns; no drain of queued frames is promised.
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        // Dropping the engine disconnects the actor channels.
        self.engine = None;
    }
}

impl Drop for LinkLayer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
