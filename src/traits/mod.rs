//! Trait definitions for the device bus seam.
//!
//! The bridge core is generic over [`DeviceBus`] so it can run against a
//! real bus client or against the recording mock in tests.

pub mod bus;

pub use bus::*;
