//! Shared state for the Alpaca services.
//!
//! `AlpacaState` wraps the [`Bridge`] together with the process-wide server
//! transaction counter. Handlers receive it as `Arc<AlpacaState<B>>`.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use alpaca_bridge::bridge::Bridge;
//! use alpaca_bridge::config::BridgeConfig;
//! use alpaca_bridge::hal::MockBus;
//! use alpaca_bridge::params::Params;
//! use alpaca_bridge::services::AlpacaState;
//!
//! let bridge = Arc::new(Bridge::new(MockBus::new(), BridgeConfig::default()));
//! let state = AlpacaState::new(Arc::clone(&bridge));
//!
//! let first = state.transaction(&Params::parse("ClientTransactionID=9"));
//! let second = state.transaction(&Params::new());
//! assert_eq!(first.client, 9);
//! assert_eq!(second.server, first.server + 1);
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::bridge::Bridge;
use crate::params::Params;
use crate::traits::DeviceBus;

use super::api::Transaction;

/// State shared by all Alpaca request handlers.
pub struct AlpacaState<B: DeviceBus> {
    bridge: Arc<Bridge<B>>,
    server_transaction: AtomicU32,
}

impl<B: DeviceBus> AlpacaState<B> {
    /// Wrap a bridge.
    pub fn new(bridge: Arc<Bridge<B>>) -> Self {
        Self {
            bridge,
            server_transaction: AtomicU32::new(0),
        }
    }

    /// The bridge.
    pub fn bridge(&self) -> &Bridge<B> {
        &self.bridge
    }

    /// Next server transaction id, starting at 1.
    pub fn next_server_transaction(&self) -> u32 {
        self.server_transaction
            .fetch_add(1, Ordering::Relaxed)
            .wrapping_add(1)
    }

    /// Transaction ids for a request.
    pub fn transaction(&self, params: &Params) -> Transaction {
        Transaction {
            client: params.client_transaction_id(),
            server: self.next_server_transaction(),
        }
    }
}
