//! Command dispatch.
//!
//! Every Alpaca command resolves to a [`get_command`] or [`set_command`]
//! call against one device. Capability-gated commands check, in order:
//!
//! 1. the device is connected, else `NotConnected`
//! 2. the capability was observed, else `NotImplemented`
//! 3. parameters parse and are in range, else `InvalidValue`
//! 4. the current state allows the operation, else `InvalidWhileParked`,
//!    `InvalidWhileSlaved` or `InvalidOperation`
//!
//! Only then is the bus mutated, optionally followed by a bounded wait.
//! Unknown commands answer `NotImplemented`.

mod common;
mod cover_calibrator;
mod dome;
mod filter_wheel;
mod focuser;
mod rotator;
mod switch;
mod telescope;

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::DeviceHandle;
use crate::config::WaitConfig;
use crate::device::{DeviceType, StateBlock};
use crate::error::{AlpacaError, AlpacaResult};
use crate::params::Params;
use crate::property::PropertyChange;
use crate::traits::DeviceBus;
use crate::wait::{wait_until, WaitOutcome};

// ============================================================================
// Device Context
// ============================================================================

/// Everything a command handler needs: the bus, the device and wait timing.
pub struct DeviceContext<'a, B: DeviceBus> {
    bus: &'a B,
    device: &'a DeviceHandle,
    waits: &'a WaitConfig,
}

impl<'a, B: DeviceBus> DeviceContext<'a, B> {
    /// Create a context for one command.
    pub fn new(bus: &'a B, device: &'a DeviceHandle, waits: &'a WaitConfig) -> Self {
        Self { bus, device, waits }
    }

    /// Target device.
    pub fn device(&self) -> &DeviceHandle {
        self.device
    }

    fn bus_device(&self) -> &str {
        self.device.bus_device()
    }

    /// Copy of the state block, failing with `NotConnected` when disconnected.
    fn connected_state<S: StateBlock>(&self) -> AlpacaResult<S> {
        self.device.inspect(|record| {
            if !record.connected {
                return Err(AlpacaError::NotConnected);
            }
            record.state::<S>().cloned().ok_or(AlpacaError::NotImplemented)
        })
    }

    /// `NotConnected` while disconnected, else `NotImplemented`.
    fn not_implemented<T>(&self) -> AlpacaResult<T> {
        if self.device.inspect(|record| record.connected) {
            Err(AlpacaError::NotImplemented)
        } else {
            Err(AlpacaError::NotConnected)
        }
    }

    /// Write to the state block ahead of bus confirmation.
    fn update<S: StateBlock>(&self, f: impl FnOnce(&mut S)) {
        self.device.mutate(|record| {
            if let Some(state) = record.state_mut::<S>() {
                f(state);
            }
        });
    }

    fn submit(&self, change: PropertyChange) -> AlpacaResult<()> {
        debug!(device = %change.device, property = %change.property, "bus change");
        self.bus.submit(change).map_err(|err| {
            warn!(device = %self.bus_device(), error = ?err, "bus rejected change");
            AlpacaError::InvalidOperation
        })
    }

    fn switch(&self, property: &str, item: &str, on: bool) -> AlpacaResult<()> {
        self.submit(PropertyChange::switch(self.bus_device(), property, item, on))
    }

    fn numbers(&self, property: &str, items: &[(&str, f64)]) -> AlpacaResult<()> {
        self.submit(PropertyChange::numbers(self.bus_device(), property, items))
    }

    fn text(&self, property: &str, item: &str, value: &str) -> AlpacaResult<()> {
        self.submit(PropertyChange::text(self.bus_device(), property, item, value))
    }

    /// Wait until the state block satisfies `predicate`.
    async fn wait<S, F>(&self, timeout: Duration, predicate: F) -> WaitOutcome
    where
        S: StateBlock,
        F: Fn(&S) -> bool,
    {
        wait_until(self.device, self.waits.poll_interval, timeout, |record| {
            record.state::<S>().is_some_and(&predicate)
        })
        .await
    }

    fn short_timeout(&self) -> Duration {
        self.waits.short_timeout
    }

    fn slew_timeout(&self) -> Duration {
        self.waits.slew_timeout
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// Execute a GET command and return its value.
pub fn get_command<B: DeviceBus>(
    ctx: &DeviceContext<'_, B>,
    command: &str,
    params: &Params,
) -> AlpacaResult<Value> {
    debug!(device = %ctx.bus_device(), command, "get");
    if let Some(result) = common::get(ctx, command) {
        return result;
    }
    match ctx.device.id().device_type {
        DeviceType::Telescope => telescope::get(ctx, command, params),
        DeviceType::Dome => dome::get(ctx, command),
        DeviceType::Focuser => focuser::get(ctx, command),
        DeviceType::Rotator => rotator::get(ctx, command),
        DeviceType::FilterWheel => filter_wheel::get(ctx, command),
        DeviceType::Switch => switch::get(ctx, command, params),
        DeviceType::CoverCalibrator => cover_calibrator::get(ctx, command),
    }
}

/// Execute a SET command.
pub async fn set_command<B: DeviceBus>(
    ctx: &DeviceContext<'_, B>,
    command: &str,
    params: &Params,
) -> AlpacaResult<()> {
    debug!(device = %ctx.bus_device(), command, "set");
    if let Some(result) = common::set(ctx, command, params).await {
        return result;
    }
    match ctx.device.id().device_type {
        DeviceType::Telescope => telescope::set(ctx, command, params).await,
        DeviceType::Dome => dome::set(ctx, command, params).await,
        DeviceType::Focuser => focuser::set(ctx, command, params).await,
        DeviceType::Rotator => rotator::set(ctx, command, params).await,
        DeviceType::FilterWheel => filter_wheel::set(ctx, command, params).await,
        DeviceType::Switch => switch::set(ctx, command, params).await,
        DeviceType::CoverCalibrator => cover_calibrator::set(ctx, command, params).await,
    }
}

/// Reject values outside `[min, max]`.
fn in_range(value: f64, min: f64, max: f64) -> AlpacaResult<f64> {
    if value >= min && value <= max {
        Ok(value)
    } else {
        Err(AlpacaError::InvalidValue)
    }
}
