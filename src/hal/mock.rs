//! Mock bus for testing without a device bus.
//!
//! [`MockBus`] records every submitted [`PropertyChange`] so tests can assert
//! which mutations a command issued, or that it issued none at all.
//!
//! # Example
//!
//! ```rust
//! use alpaca_bridge::hal::MockBus;
//! use alpaca_bridge::traits::DeviceBus;
//!
//! let bus = MockBus::new();
//! bus.change_number("Focuser", "FOCUSER_POSITION", "POSITION", 1200.0).unwrap();
//!
//! let last = bus.last_change().unwrap();
//! assert_eq!(last.property, "FOCUSER_POSITION");
//!
//! bus.set_failing(true);
//! assert!(bus.change_switch("Focuser", "FOCUSER_ABORT_MOTION", "ABORT_MOTION", true).is_err());
//! assert_eq!(bus.call_count(), 1);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::property::PropertyChange;
use crate::traits::DeviceBus;

/// Error returned by a failing [`MockBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBusError;

/// Recording device bus.
#[derive(Debug, Default)]
pub struct MockBus {
    changes: Mutex<Vec<PropertyChange>>,
    failing: AtomicBool,
    rejected: Mutex<Option<String>>,
}

impl MockBus {
    /// Creates an empty mock bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent submissions fail without being recorded.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Reject submissions to `property` only; `None` accepts all again.
    pub fn reject_property(&self, property: Option<&str>) {
        *self.rejected.lock().unwrap_or_else(|e| e.into_inner()) = property.map(str::to_string);
    }

    /// Number of recorded submissions.
    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    /// Copy of all recorded submissions in order.
    pub fn changes(&self) -> Vec<PropertyChange> {
        self.lock().clone()
    }

    /// Most recent submission.
    pub fn last_change(&self) -> Option<PropertyChange> {
        self.lock().last().cloned()
    }

    /// Recorded submissions targeting `property`.
    pub fn changes_to(&self, property: &str) -> Vec<PropertyChange> {
        self.lock()
            .iter()
            .filter(|change| change.property == property)
            .cloned()
            .collect()
    }

    /// Forget all recorded submissions.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PropertyChange>> {
        self.changes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DeviceBus for MockBus {
    type Error = MockBusError;

    fn submit(&self, change: PropertyChange) -> Result<(), MockBusError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MockBusError);
        }
        let rejected = self.rejected.lock().unwrap_or_else(|e| e.into_inner());
        if rejected.as_deref() == Some(change.property.as_str()) {
            return Err(MockBusError);
        }
        drop(rejected);
        self.lock().push(change);
        Ok(())
    }
}
