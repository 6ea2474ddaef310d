//! Two link layers chatting over a simulated medium.
//!
//! Node A sends a handful of unicast messages to node B, plus one broadcast.
//! Run with:
//! - cargo run -p wavelink --example two_nodes

use std::{sync::Arc, thread, time::Duration};

use wavelink::{LinkLayer, Medium, Status, Transmission};

fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let medium = Medium::default();
    let a = LinkLayer::new(0x0001, Arc::new(medium.endpoint()));
    let b = Arc::new(LinkLayer::new(0x0002, Arc::new(medium.endpoint())));

    // Full per-frame debug output on the sending side.
    a.command(1, 2);
    // Beacon every 10 seconds.
    a.command(3, 10);

    let receiver = {
        let b = Arc::clone(&b);
        thread::spawn(move || {
            let mut out = Transmission::default();
            loop {
                let n = b.recv(&mut out);
                if n < 0 {
                    break;
                }
                println!(
                    "node B got {} bytes from {:#06x}: {:?}",
                    n,
                    out.src_addr,
                    String::from_utf8_lossy(&out.buf),
                );
            }
        })
    };

    for i in 0..5 {
        let message = format!("hello {i}");
        let accepted = a.send(0x0002, message.as_bytes(), message.len() as i32);
        println!("node A queued {accepted} bytes");
        thread::sleep(Duration::from_millis(500));
        if a.status() == Status::TxDelivered as i32 {
            println!("node A: delivered");
        }
    }

    let broadcast = b"to everyone";
    a.send(0xFFFF, broadcast, broadcast.len() as i32);
    thread::sleep(Duration::from_millis(500));

    medium.close();
    receiver.join().expect("receiver thread panicked");
}
