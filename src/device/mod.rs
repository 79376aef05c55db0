//! Bridged device records and per-type state blocks.
//!
//! A [`DeviceRecord`] holds the last-known state of one bridged Alpaca
//! device: its connection flag, driver information and a [`DeviceState`]
//! keyed by [`DeviceType`]. Each state block knows how to ingest bus
//! property notifications through the [`StateBlock`] trait.
//!
//! Capabilities start absent. They appear the first time a property is
//! observed and only disappear when that property is deleted from the bus.

pub mod cover_calibrator;
pub mod dome;
pub mod filter_wheel;
pub mod focuser;
pub mod rotator;
pub mod switch;
pub mod telescope;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::names::{self, has_interface};
use crate::property::Property;

pub use cover_calibrator::{CalibratorStatus, CoverCalibratorState, CoverStatus};
pub use dome::{DomeState, ShutterStatus};
pub use filter_wheel::FilterWheelState;
pub use focuser::FocuserState;
pub use rotator::RotatorState;
pub use switch::{BankKind, SwitchBank, SwitchChannel, SwitchState};
pub use telescope::{PierSide, TelescopeState};

// ============================================================================
// Device Type
// ============================================================================

/// Alpaca device type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// Telescope mount, including guider ports.
    Telescope,
    /// Dome.
    Dome,
    /// Focuser.
    Focuser,
    /// Rotator.
    Rotator,
    /// Filter wheel.
    FilterWheel,
    /// Switch panel.
    Switch,
    /// Cover and flat panel.
    CoverCalibrator,
}

impl DeviceType {
    /// All bridged types.
    pub const ALL: [DeviceType; 7] = [
        DeviceType::Telescope,
        DeviceType::Dome,
        DeviceType::Focuser,
        DeviceType::Rotator,
        DeviceType::FilterWheel,
        DeviceType::Switch,
        DeviceType::CoverCalibrator,
    ];

    /// Lowercase name used in Alpaca URLs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Telescope => "telescope",
            DeviceType::Dome => "dome",
            DeviceType::Focuser => "focuser",
            DeviceType::Rotator => "rotator",
            DeviceType::FilterWheel => "filterwheel",
            DeviceType::Switch => "switch",
            DeviceType::CoverCalibrator => "covercalibrator",
        }
    }

    /// Capitalized name used in the management API.
    pub const fn display_name(&self) -> &'static str {
        match self {
            DeviceType::Telescope => "Telescope",
            DeviceType::Dome => "Dome",
            DeviceType::Focuser => "Focuser",
            DeviceType::Rotator => "Rotator",
            DeviceType::FilterWheel => "FilterWheel",
            DeviceType::Switch => "Switch",
            DeviceType::CoverCalibrator => "CoverCalibrator",
        }
    }

    /// Parse a URL path segment, ignoring case.
    pub fn from_path(segment: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(segment))
    }

    /// Alpaca interface version reported by `interfaceversion`.
    pub const fn interface_version(&self) -> i32 {
        match self {
            DeviceType::Telescope => 3,
            DeviceType::Dome => 2,
            DeviceType::Focuser => 3,
            DeviceType::Rotator => 3,
            DeviceType::FilterWheel => 2,
            DeviceType::Switch => 2,
            DeviceType::CoverCalibrator => 1,
        }
    }

    /// Alpaca types advertised by a bus interface mask.
    ///
    /// Mount and guider interfaces share one telescope record. Cameras are
    /// not bridged.
    pub fn for_interface(mask: u64) -> Vec<DeviceType> {
        let mut types = Vec::new();
        if has_interface(mask, names::INTERFACE_MOUNT) || has_interface(mask, names::INTERFACE_GUIDER)
        {
            types.push(DeviceType::Telescope);
        }
        if has_interface(mask, names::INTERFACE_DOME) {
            types.push(DeviceType::Dome);
        }
        if has_interface(mask, names::INTERFACE_FOCUSER) {
            types.push(DeviceType::Focuser);
        }
        if has_interface(mask, names::INTERFACE_ROTATOR) {
            types.push(DeviceType::Rotator);
        }
        if has_interface(mask, names::INTERFACE_WHEEL) {
            types.push(DeviceType::FilterWheel);
        }
        if has_interface(mask, names::INTERFACE_AUX_POWERBOX)
            || has_interface(mask, names::INTERFACE_AUX_GPIO)
        {
            types.push(DeviceType::Switch);
        }
        if has_interface(mask, names::INTERFACE_AUX_LIGHTBOX)
            || has_interface(mask, names::INTERFACE_AUX_DUSTCAP)
        {
            types.push(DeviceType::CoverCalibrator);
        }
        types
    }

    /// Empty state block for this type.
    pub fn initial_state(&self) -> DeviceState {
        match self {
            DeviceType::Telescope => DeviceState::Telescope(TelescopeState::default()),
            DeviceType::Dome => DeviceState::Dome(DomeState::default()),
            DeviceType::Focuser => DeviceState::Focuser(FocuserState::default()),
            DeviceType::Rotator => DeviceState::Rotator(RotatorState::default()),
            DeviceType::FilterWheel => DeviceState::FilterWheel(FilterWheelState::default()),
            DeviceType::Switch => DeviceState::Switch(SwitchState::default()),
            DeviceType::CoverCalibrator => {
                DeviceState::CoverCalibrator(CoverCalibratorState::default())
            }
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Identity
// ============================================================================

/// Alpaca address of a bridged device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId {
    /// Device type.
    pub device_type: DeviceType,
    /// Device number within the type.
    pub number: u32,
}

impl DeviceId {
    /// Create an id.
    pub const fn new(device_type: DeviceType, number: u32) -> Self {
        Self {
            device_type,
            number,
        }
    }
}

/// Immutable identity of a bridged device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Alpaca address.
    pub id: DeviceId,
    /// Name reported by `name`.
    pub name: String,
    /// Underlying bus device name.
    pub bus_device: String,
    /// Bus interface mask.
    pub interface: u64,
    /// Stable unique id.
    pub unique_id: Uuid,
}

impl DeviceIdentity {
    /// Build the identity for a bus device exposed as `id`.
    ///
    /// The unique id is derived from the bus name and type, so it survives
    /// bridge restarts.
    pub fn new(id: DeviceId, bus_device: &str, interface: u64) -> Self {
        let key = format!("{}/{}", id.device_type, bus_device);
        Self {
            id,
            name: bus_device.to_string(),
            bus_device: bus_device.to_string(),
            interface,
            unique_id: Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()),
        }
    }
}

// ============================================================================
// Record
// ============================================================================

/// Driver information from the bus `INFO` property.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DriverInfo {
    /// Driver description.
    pub driver_info: String,
    /// Driver version.
    pub driver_version: String,
    /// Device description.
    pub description: String,
}

/// Last-known state of one bridged device.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceRecord {
    /// Mirrors the bus connection property.
    pub connected: bool,
    /// Driver information.
    pub info: DriverInfo,
    /// Type-specific state.
    pub state: DeviceState,
}

impl DeviceRecord {
    /// Fresh record for a device type.
    pub fn new(device_type: DeviceType) -> Self {
        Self {
            connected: false,
            info: DriverInfo::default(),
            state: device_type.initial_state(),
        }
    }

    /// Apply a property notification.
    pub fn apply(&mut self, property: &Property) {
        match property.name.as_str() {
            names::CONNECTION => {
                self.connected = property.is_ok() && property.switch(names::CONNECTED) == Some(true);
            }
            names::INFO => {
                if let Some(driver) = property
                    .text(names::DEVICE_DRIVER)
                    .or_else(|| property.text(names::DEVICE_NAME))
                {
                    self.info.driver_info = driver.to_string();
                }
                if let Some(version) = property.text(names::DEVICE_VERSION) {
                    self.info.driver_version = version.to_string();
                }
                self.info.description = property
                    .text(names::DEVICE_MODEL)
                    .filter(|model| !model.is_empty())
                    .unwrap_or(&property.device)
                    .to_string();
            }
            _ => self.state.apply(property),
        }
    }

    /// Forget a deleted property.
    pub fn remove(&mut self, property: &str) {
        if property == names::CONNECTION {
            self.connected = false;
        } else {
            self.state.remove(property);
        }
    }

    /// Typed view of the state block.
    pub fn state<S: StateBlock>(&self) -> Option<&S> {
        S::from_state(&self.state)
    }

    /// Mutable typed view of the state block.
    pub fn state_mut<S: StateBlock>(&mut self) -> Option<&mut S> {
        S::from_state_mut(&mut self.state)
    }
}

// ============================================================================
// State Blocks
// ============================================================================

/// Type-specific device state.
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceState {
    /// Telescope state.
    Telescope(TelescopeState),
    /// Dome state.
    Dome(DomeState),
    /// Focuser state.
    Focuser(FocuserState),
    /// Rotator state.
    Rotator(RotatorState),
    /// Filter wheel state.
    FilterWheel(FilterWheelState),
    /// Switch panel state.
    Switch(SwitchState),
    /// Cover/calibrator state.
    CoverCalibrator(CoverCalibratorState),
}

impl DeviceState {
    /// Type of the held block.
    pub fn device_type(&self) -> DeviceType {
        match self {
            DeviceState::Telescope(_) => DeviceType::Telescope,
            DeviceState::Dome(_) => DeviceType::Dome,
            DeviceState::Focuser(_) => DeviceType::Focuser,
            DeviceState::Rotator(_) => DeviceType::Rotator,
            DeviceState::FilterWheel(_) => DeviceType::FilterWheel,
            DeviceState::Switch(_) => DeviceType::Switch,
            DeviceState::CoverCalibrator(_) => DeviceType::CoverCalibrator,
        }
    }

    fn apply(&mut self, property: &Property) {
        match self {
            DeviceState::Telescope(s) => s.apply(property),
            DeviceState::Dome(s) => s.apply(property),
            DeviceState::Focuser(s) => s.apply(property),
            DeviceState::Rotator(s) => s.apply(property),
            DeviceState::FilterWheel(s) => s.apply(property),
            DeviceState::Switch(s) => s.apply(property),
            DeviceState::CoverCalibrator(s) => s.apply(property),
        }
    }

    fn remove(&mut self, property: &str) {
        match self {
            DeviceState::Telescope(s) => s.remove(property),
            DeviceState::Dome(s) => s.remove(property),
            DeviceState::Focuser(s) => s.remove(property),
            DeviceState::Rotator(s) => s.remove(property),
            DeviceState::FilterWheel(s) => s.remove(property),
            DeviceState::Switch(s) => s.remove(property),
            DeviceState::CoverCalibrator(s) => s.remove(property),
        }
    }
}

/// Per-type state block with property ingestion.
///
/// `apply` must be idempotent: applying the same property twice leaves the
/// block unchanged. Properties the block does not know are ignored.
pub trait StateBlock: Clone + Send + Sync + 'static {
    /// Device type holding this block.
    const DEVICE_TYPE: DeviceType;

    /// Borrow this block out of a [`DeviceState`].
    fn from_state(state: &DeviceState) -> Option<&Self>;

    /// Mutably borrow this block out of a [`DeviceState`].
    fn from_state_mut(state: &mut DeviceState) -> Option<&mut Self>;

    /// Ingest a property notification.
    fn apply(&mut self, property: &Property);

    /// Clear whatever a deleted property provided.
    fn remove(&mut self, property: &str);
}

macro_rules! state_block_variant {
    ($block:ty, $variant:ident) => {
        fn from_state(state: &DeviceState) -> Option<&Self> {
            match state {
                DeviceState::$variant(s) => Some(s),
                _ => None,
            }
        }

        fn from_state_mut(state: &mut DeviceState) -> Option<&mut Self> {
            match state {
                DeviceState::$variant(s) => Some(s),
                _ => None,
            }
        }
    };
}

pub(crate) use state_block_variant;

/// Index suffix of item names like `SLOT_NAME_3` (1-based on the bus).
pub(crate) fn item_index(name: &str, prefix: &str) -> Option<usize> {
    name.strip_prefix(prefix)?
        .parse::<usize>()
        .ok()
        .filter(|&n| n > 0)
        .map(|n| n - 1)
}
