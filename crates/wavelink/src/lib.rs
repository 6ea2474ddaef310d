#![warn(missing_docs)]

//! Wavelink: a small public API facade for the workspace.
//!
//! This crate re-exports the types needed to run a simplified 802.11-style
//! link layer on top of a pluggable RF transport:
//!
//! - The link service and its delivery record (`LinkLayer`, `Transmission`)
//! - Frame types for wire-level inspection (`Frame`, `FrameType`)
//! - Core configuration and status codes (`Config`, `Status`)
//! - The RF contract and the simulated medium (`Rf`, `Medium`)
//!
//! Example
//! ```
//! use std::sync::Arc;
//! use wavelink::{LinkLayer, Medium, Transmission};
//!
//! let medium = Medium::default();
//! let a = LinkLayer::new(0x0001, Arc::new(medium.endpoint()));
//! let b = Arc::new(LinkLayer::new(0x0002, Arc::new(medium.endpoint())));
//!
//! let receiver = {
//!     let b = Arc::clone(&b);
//!     std::thread::spawn(move || {
//!         let mut out = Transmission::default();
//!         let n = b.recv(&mut out);
//!         (n, out)
//!     })
//! };
//!
//! assert_eq!(a.send(0x0002, b"hello", 5), 5);
//! let (n, out) = receiver.join().unwrap();
//! assert_eq!(n, 5);
//! assert_eq!(out.src_addr, 0x0001);
//! # medium.close();
//! ```

// Core: configuration, status codes, and the RF contract
pub use wavelink_core::config::{Config, DebugLevel, SlotSelection};
pub use wavelink_core::interceptor::Interceptor;
pub use wavelink_core::rf::Rf;
pub use wavelink_core::sim::{Medium, MediumConfig, SimRf};
pub use wavelink_core::status::Status;
// Host: the link service
pub use wavelink_host::{LinkLayer, Transmission};
// Protocol: frames for wire-level inspection
pub use wavelink_protocol::{Frame, FrameType};
