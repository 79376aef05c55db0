//! # alpaca-bridge
//!
//! An ASCOM Alpaca bridge for astronomy devices that live on an
//! asynchronous property bus.
//!
//! ## Features
//!
//! - **State cache**: the last-known state of every bridged device, updated
//!   from bus property notifications
//! - **Capability inference**: a command is available once the bus has shown
//!   the property behind it
//! - **Command dispatch**: Alpaca commands for telescopes, domes, focusers,
//!   rotators, filter wheels, switch panels and cover/calibrators
//! - **Bounded waits**: synchronous Alpaca semantics on top of
//!   fire-and-forget bus mutations
//! - **Transport**: Alpaca HTTP API, management API and UDP discovery
//!   (`web` feature)
//!
//! ## Architecture
//!
//! - `traits` - The bus mutation seam
//! - `hal` - Bus implementations (mock for testing, channel for a real client)
//! - `device` - Per-type state blocks and their ingestion rules
//! - `cache` - Per-device locked records
//! - `dispatch` - Alpaca command handlers
//! - `bridge` - Ties ingestion and dispatch together
//! - `services` - Ingestion loop and network transports
//!
//! ## Example
//!
//! ```rust
//! use alpaca_bridge::{
//!     Bridge, BridgeConfig, BusEvent, DeviceType, Item, Params, Property,
//!     hal::MockBus,
//!     names,
//! };
//!
//! let bridge = Bridge::new(MockBus::new(), BridgeConfig::default());
//!
//! // The bus announces a dome
//! bridge.handle_event(BusEvent::Define(
//!     Property::new("Dome Simulator", names::INFO)
//!         .with_item(Item::text(names::DEVICE_INTERFACE, names::INTERFACE_DOME.to_string())),
//! ));
//!
//! let dome = bridge.device(DeviceType::Dome, 0).unwrap();
//! let name = bridge.get_command(&dome, "name", &Params::new()).unwrap();
//! assert_eq!(name, "Dome Simulator");
//! ```

#![warn(missing_docs)]

/// The bridge: event ingestion and command entry points.
pub mod bridge;
/// Device state cache.
pub mod cache;
/// Per-type device state and ingestion.
pub mod device;
/// Alpaca command handlers.
pub mod dispatch;
/// Alpaca error vocabulary and infrastructure errors.
pub mod error;
/// Device bus implementations (mock and channel-backed).
pub mod hal;
/// Bus interface bits and property names.
pub mod names;
/// Request parameter parsing.
pub mod params;
/// Bus property model.
pub mod property;
/// The device bus seam.
pub mod traits;
/// Synchronous wait adapter.
pub mod wait;

/// Configuration.
pub mod config;

/// Ingestion loop and network services.
pub mod services;

// Re-exports for convenience
pub use bridge::Bridge;
pub use cache::{DeviceCache, DeviceHandle};
pub use device::{DeviceId, DeviceIdentity, DeviceRecord, DeviceState, DeviceType, StateBlock};
pub use error::{AlpacaError, AlpacaResult, BridgeError};
pub use params::Params;
pub use property::{
    BusEvent, ChangeValue, Item, ItemValue, Permission, Property, PropertyChange, PropertyState,
};
pub use traits::DeviceBus;
pub use wait::WaitOutcome;

// Config re-exports
pub use config::{BridgeConfig, Config, DiscoveryConfig, ServerConfig, WaitConfig};
