#![warn(missing_docs)]

//! wavelink-host: the host-facing link service.
//!
//! [`LinkLayer`] owns the three engine actors and exposes the four-call
//! host surface: `send`, `recv`, `status`, and `command`. Outcomes are
//! reported through integer status codes, never through errors.

/// The record `recv` fills for the host.
pub mod delivery;
/// The link layer service.
pub mod link;

pub use delivery::Transmission;
pub use link::LinkLayer;
