//! Device bus mutation interface.
//!
//! The bridge never talks to hardware directly. It submits
//! [`PropertyChange`] requests to a [`DeviceBus`] and observes the outcome
//! later through [`BusEvent`](crate::property::BusEvent) notifications.
//!
//! | Implementation | Purpose |
//! |----------------|---------|
//! | [`MockBus`](crate::hal::MockBus) | Records submitted changes for tests |
//! | [`ChannelBus`](crate::hal::ChannelBus) | Forwards changes to a bus client task |
//!
//! # Example
//!
//! ```rust
//! use alpaca_bridge::hal::MockBus;
//! use alpaca_bridge::traits::DeviceBus;
//!
//! let bus = MockBus::new();
//! bus.change_switch("Dome", "DOME_SHUTTER", "OPENED", true).unwrap();
//!
//! assert_eq!(bus.call_count(), 1);
//! ```

use crate::property::PropertyChange;

/// Mutation side of the device bus.
///
/// Submissions are fire-and-forget: `Ok` means the request was handed to the
/// bus, not that the device accepted it.
pub trait DeviceBus: Send + Sync {
    /// Error type for submission failures.
    type Error: core::fmt::Debug;

    /// Submit a property change request.
    fn submit(&self, change: PropertyChange) -> Result<(), Self::Error>;

    /// Change one switch item.
    fn change_switch(
        &self,
        device: &str,
        property: &str,
        item: &str,
        on: bool,
    ) -> Result<(), Self::Error> {
        self.submit(PropertyChange::switch(device, property, item, on))
    }

    /// Change one number item.
    fn change_number(
        &self,
        device: &str,
        property: &str,
        item: &str,
        value: f64,
    ) -> Result<(), Self::Error> {
        self.submit(PropertyChange::numbers(device, property, &[(item, value)]))
    }

    /// Change several number items in one request.
    fn change_numbers(
        &self,
        device: &str,
        property: &str,
        items: &[(&str, f64)],
    ) -> Result<(), Self::Error> {
        self.submit(PropertyChange::numbers(device, property, items))
    }

    /// Change one text item.
    fn change_text(
        &self,
        device: &str,
        property: &str,
        item: &str,
        value: &str,
    ) -> Result<(), Self::Error> {
        self.submit(PropertyChange::text(device, property, item, value))
    }
}

impl<B: DeviceBus + ?Sized> DeviceBus for std::sync::Arc<B> {
    type Error = B::Error;

    fn submit(&self, change: PropertyChange) -> Result<(), Self::Error> {
        (**self).submit(change)
    }
}
