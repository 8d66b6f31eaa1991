//! # paceline-connect
//!
//! Garmin Connect remote source. Restores a pre-established secret blob
//! into an authenticated [`Session`] and implements
//! [`paceline_sync::ActivitySource`] over the Connect REST surface.
//!
//! The login/MFA/token-refresh protocol is NOT implemented here; the
//! secret blob comes from the vendor tooling's token dump.

pub mod client;
pub mod session;

pub use session::{ConnectError, Session};
