//! Synchronous wait adapter.
//!
//! Bus mutations are fire-and-forget; their effect only shows up later when
//! ingestion updates the cache. A command that must not answer before the
//! effect is visible polls the device record until a predicate holds or a
//! timeout elapses.
//!
//! The device lock is taken for each poll and released before sleeping.
//! The wait is an ordinary future: dropping it (for example when the HTTP
//! client disconnects) stops the polling without touching the bus.

use std::time::Duration;

use tracing::warn;

use crate::cache::DeviceHandle;
use crate::device::DeviceRecord;
use crate::error::{AlpacaError, AlpacaResult};

/// Result of a bounded wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The expected state was observed.
    Reached,
    /// The timeout elapsed first.
    TimedOut,
}

impl WaitOutcome {
    /// Whether the expected state was observed.
    #[inline]
    pub fn reached(self) -> bool {
        self == WaitOutcome::Reached
    }

    /// Map to a command result: reached is OK, timed out is `InvalidOperation`.
    pub fn into_result(self) -> AlpacaResult<()> {
        match self {
            WaitOutcome::Reached => Ok(()),
            WaitOutcome::TimedOut => Err(AlpacaError::InvalidOperation),
        }
    }
}

/// Poll `device` every `poll` until `predicate` holds, for at most `timeout`.
pub async fn wait_until<F>(
    device: &DeviceHandle,
    poll: Duration,
    timeout: Duration,
    predicate: F,
) -> WaitOutcome
where
    F: Fn(&DeviceRecord) -> bool,
{
    let polling = async {
        loop {
            if device.inspect(&predicate) {
                return;
            }
            tokio::time::sleep(poll).await;
        }
    };

    match tokio::time::timeout(timeout, polling).await {
        Ok(()) => WaitOutcome::Reached,
        Err(_) => {
            warn!(
                device = %device.bus_device(),
                timeout_ms = timeout.as_millis() as u64,
                "wait timed out"
            );
            WaitOutcome::TimedOut
        }
    }
}

/// Wait until `field` of the record equals `expected`.
pub async fn wait_for<T, F>(
    device: &DeviceHandle,
    poll: Duration,
    timeout: Duration,
    field: F,
    expected: T,
) -> WaitOutcome
where
    T: PartialEq,
    F: Fn(&DeviceRecord) -> T,
{
    wait_until(device, poll, timeout, |record| field(record) == expected).await
}
