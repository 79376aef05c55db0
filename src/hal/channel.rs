//! Channel-backed bus for wiring the bridge to a bus client task.
//!
//! The bus client owns the receiving end and applies each
//! [`PropertyChange`] to the real bus. Sending never blocks; a full or
//! closed channel is reported as [`BridgeError::BusClosed`].

use tokio::sync::mpsc;

use crate::error::BridgeError;
use crate::property::PropertyChange;
use crate::traits::DeviceBus;

/// Device bus that forwards changes over an mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelBus {
    tx: mpsc::Sender<PropertyChange>,
}

impl ChannelBus {
    /// Create a bus and the receiver the bus client should drain.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<PropertyChange>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl DeviceBus for ChannelBus {
    type Error = BridgeError;

    fn submit(&self, change: PropertyChange) -> Result<(), BridgeError> {
        self.tx.try_send(change).map_err(|_| BridgeError::BusClosed)
    }
}
