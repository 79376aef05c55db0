//! Device bus implementations.
//!
//! This module contains concrete implementations of the
//! [`DeviceBus`](crate::traits::DeviceBus) trait.
//!
//! # Available Implementations
//!
//! - `mock`: Recording bus for tests and demos
//! - `channel`: Forwards changes to a bus client over a tokio channel

pub mod channel;
pub mod mock;

pub use channel::*;
pub use mock::*;
