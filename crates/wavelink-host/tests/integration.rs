//! End-to-end scenarios for the wavelink-host crate.
//!
//! Two or more link layers are wired together over the simulated medium
//! from wavelink-core. The medium's clock is scaled so the 7.5-second
//! acknowledgement timeout expires in tens of wall-clock milliseconds,
//! which keeps the retry scenarios short.

use std::{
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use wavelink_core::{
    interceptor::Interceptor,
    rf::Rf,
    sim::{Medium, MediumConfig},
    status::Status,
};
use wavelink_host::{LinkLayer, Transmission};
use wavelink_protocol::{Frame, FrameType};

fn fast_medium() -> Medium {
    Medium::new(MediumConfig {
        sifs_time: 5,
        slot_time: 5,
        cw_min: 3,
        cw_max: 31,
        retry_limit: 3,
        airtime_ms: 1,
        time_scale: 200,
    })
}

fn link_on(medium: &Medium, mac_addr: u16) -> Arc<LinkLayer> {
    Arc::new(LinkLayer::new(mac_addr, Arc::new(medium.endpoint())))
}

/// Runs `recv` on its own thread so a missing delivery fails the test
/// instead of hanging it.
fn recv_async(link: Arc<LinkLayer>) -> crossbeam_channel::Receiver<(i32, Transmission)> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    thread::spawn(move || {
        let mut out = Transmission::default();
        let n = link.recv(&mut out);
        let _ = tx.send((n, out));
    });
    rx
}

fn wait_for_status(link: &LinkLayer, status: Status, wall: Duration) -> bool {
    let deadline = std::time::Instant::now() + wall;
    while std::time::Instant::now() < deadline {
        if link.status() == status as i32 {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

const RECV_WAIT: Duration = Duration::from_secs(5);

#[test]
fn test_unicast_round_trip() {
    let medium = fast_medium();
    let a = link_on(&medium, 0x0001);
    let b = link_on(&medium, 0x0002);

    let inbound = recv_async(Arc::clone(&b));
    assert_eq!(a.send(0x0002, b"hi", 2), 2);

    let (n, out) = inbound.recv_timeout(RECV_WAIT).unwrap();
    assert_eq!(n, 2);
    assert_eq!(out.src_addr, 0x0001);
    assert_eq!(out.dest_addr, 0x0002);
    assert_eq!(out.buf, b"hi");

    assert!(wait_for_status(&a, Status::TxDelivered, RECV_WAIT));
    medium.close();
}

#[test]
fn test_broadcast_needs_no_ack() {
    let medium = fast_medium();
    let a = link_on(&medium, 0x0001);
    let b = link_on(&medium, 0x0002);
    let c = link_on(&medium, 0x0003);

    let b_inbound = recv_async(Arc::clone(&b));
    let c_inbound = recv_async(Arc::clone(&c));
    assert_eq!(a.send(0xFFFF, b"all", 3), 3);

    // Broadcast counts as delivered without any acknowledgement.
    assert!(wait_for_status(&a, Status::TxDelivered, RECV_WAIT));

    for inbound in [b_inbound, c_inbound] {
        let (n, out) = inbound.recv_timeout(RECV_WAIT).unwrap();
        assert_eq!(n, 3);
        assert_eq!(out.dest_addr, 0xFFFF);
        assert_eq!(out.src_addr, 0x0001);
        assert_eq!(out.buf, b"all");
    }
    medium.close();
}

/// Loses every ACK frame while letting data through.
struct DropAcks;

impl Interceptor for DropAcks {
    fn on_transmit(&mut self, frame: &mut Vec<u8>) -> bool {
        match Frame::decode(frame) {
            Ok(decoded) => decoded.frame_type() != FrameType::Ack,
            Err(_) => true,
        }
    }
}

#[test]
fn test_lost_acks_exhaust_retries() {
    let medium = fast_medium();
    let a = link_on(&medium, 0x0001);
    let b = link_on(&medium, 0x0002);
    medium.set_interceptor(Box::new(DropAcks));

    let inbound = recv_async(Arc::clone(&b));
    assert_eq!(a.send(0x0002, b"lost", 4), 4);

    // Every attempt times out; after the retry allowance the send fails.
    assert!(wait_for_status(&a, Status::TxFailed, Duration::from_secs(10)));

    // The data itself was delivered; only the acknowledgements were lost.
    let (n, out) = inbound.recv_timeout(RECV_WAIT).unwrap();
    assert_eq!(n, 4);
    assert_eq!(out.buf, b"lost");
    medium.close();
}

/// Records every frame that crosses the medium.
struct WireTap {
    seen: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Interceptor for WireTap {
    fn on_transmit(&mut self, frame: &mut Vec<u8>) -> bool {
        self.seen.lock().unwrap().push(frame.clone());
        true
    }
}

#[test]
fn test_wire_sequence_numbers_are_consecutive() {
    let medium = fast_medium();
    let seen = Arc::new(Mutex::new(Vec::new()));
    medium.set_interceptor(Box::new(WireTap { seen: Arc::clone(&seen) }));

    let a = link_on(&medium, 0x0001);
    let b = link_on(&medium, 0x0002);
    // Keep b's delivery queue drained.
    let _inbound = recv_async(Arc::clone(&b));

    for _ in 0..3 {
        assert!(a.send(0x0002, b"seq", 3) > 0);
        assert!(wait_for_status(&a, Status::TxDelivered, RECV_WAIT));
    }

    let sequences: Vec<u16> = seen
        .lock()
        .unwrap()
        .iter()
        .filter_map(|bytes| Frame::decode(bytes).ok())
        .filter(|frame| {
            frame.frame_type() == FrameType::Data
                && frame.dest_addr() == 0x0002
                && !frame.is_retransmission()
        })
        .map(|frame| frame.sequence())
        .collect();

    assert_eq!(sequences, vec![0, 1, 2]);
    medium.close();
}

/// RF stub whose medium is busy forever, so nothing ever leaves the queue.
struct JammedRf {
    inbox: crossbeam_channel::Receiver<Vec<u8>>,
    _feed: crossbeam_channel::Sender<Vec<u8>>,
}

impl JammedRf {
    fn new() -> Self {
        let (feed, inbox) = crossbeam_channel::unbounded();
        Self { inbox, _feed: feed }
    }
}

impl Rf for JammedRf {
    fn transmit(&self, _frame: &[u8]) {}
    fn receive(&self) -> Vec<u8> {
        self.inbox.recv().unwrap_or_default()
    }
    fn in_use(&self) -> bool {
        true
    }
    fn clock(&self) -> u64 {
        0
    }
    fn sifs_time(&self) -> u64 {
        5
    }
    fn slot_time(&self) -> u64 {
        5
    }
    fn cw_min(&self) -> u32 {
        3
    }
    fn cw_max(&self) -> u32 {
        31
    }
    fn retry_limit(&self) -> u32 {
        3
    }
}

#[test]
fn test_queue_overflow_is_rejected() {
    let link = LinkLayer::new(0x0001, Arc::new(JammedRf::new()));

    // The first frame is dequeued by the sender, which then blocks on the
    // jammed medium with the frame in hand.
    assert_eq!(link.send(0x0002, b"head", 4), 4);
    thread::sleep(Duration::from_millis(200));

    // Four more fill the bounded queue.
    for _ in 0..4 {
        assert_eq!(link.send(0x0002, b"fill", 4), 4);
    }

    // Admission control turns the next one away.
    assert_eq!(link.send(0x0002, b"over", 4), 0);
    assert_eq!(link.status(), Status::InsufficientBufferSpace as i32);
}

#[test]
fn test_beacons_synchronize_nodes() {
    let medium = fast_medium();
    let seen = Arc::new(Mutex::new(Vec::new()));
    medium.set_interceptor(Box::new(WireTap { seen: Arc::clone(&seen) }));

    let a = link_on(&medium, 0x0001);
    let _b = link_on(&medium, 0x0002);

    // One-second beacon interval; the scaled clock makes it due constantly.
    a.command(3, 1);
    thread::sleep(Duration::from_millis(400));
    a.command(3, -1);

    let beacons: Vec<Frame> = seen
        .lock()
        .unwrap()
        .iter()
        .filter_map(|bytes| Frame::decode(bytes).ok())
        .filter(|frame| frame.frame_type() == FrameType::Beacon)
        .collect();

    assert!(!beacons.is_empty(), "no beacons were transmitted");
    for beacon in &beacons {
        assert!(beacon.is_broadcast());
        assert_eq!(beacon.src_addr(), 0x0001);
        assert_eq!(beacon.payload().len(), 8);
    }

    // Sequence numbers count up from 0 per the beacon counter.
    let sequences: Vec<u16> = beacons.iter().map(|frame| frame.sequence()).collect();
    let expected: Vec<u16> = (0..sequences.len() as u16).collect();
    assert_eq!(sequences, expected);
    medium.close();
}
