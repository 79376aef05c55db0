//! Dome state and shutter state machine.
//!
//! The shutter status follows the bus `DOME_SHUTTER` property:
//!
//! | Bus state | Active item | Status |
//! |-----------|-------------|--------|
//! | Alert | any | `Error` |
//! | Busy | `OPENED` | `Opening` |
//! | Busy | `CLOSED` | `Closing` |
//! | Ok / Idle | `OPENED` | `Open` |
//! | Ok / Idle | `CLOSED` | `Closed` |

use crate::names;
use crate::property::{Property, PropertyState};

use super::{state_block_variant, DeviceState, DeviceType, StateBlock};

/// Alpaca `ShutterState`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutterStatus {
    /// Fully open.
    Open = 0,
    /// Fully closed.
    Closed = 1,
    /// Opening.
    Opening = 2,
    /// Closing.
    Closing = 3,
    /// Fault or indeterminate.
    Error = 4,
}

impl ShutterStatus {
    fn from_property(property: &Property) -> Self {
        let opened = property.switch(names::OPENED) == Some(true);
        let closed = property.switch(names::CLOSED) == Some(true);
        match property.state {
            PropertyState::Alert => ShutterStatus::Error,
            PropertyState::Busy if opened => ShutterStatus::Opening,
            PropertyState::Busy if closed => ShutterStatus::Closing,
            PropertyState::Busy => ShutterStatus::Error,
            _ if opened => ShutterStatus::Open,
            _ if closed => ShutterStatus::Closed,
            _ => ShutterStatus::Error,
        }
    }
}

/// A dome axis position with its writability.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Axis {
    /// Position in degrees.
    pub value: f64,
    /// Clients may slew this axis.
    pub writable: bool,
}

/// Dome state block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DomeState {
    /// Shutter status; present means the shutter can be operated.
    pub shutter: Option<ShutterStatus>,
    /// Parked; present means the dome can park.
    pub parked: Option<bool>,
    /// Park operation in progress.
    pub parking: bool,
    /// Park position can be stored.
    pub can_set_park: bool,
    /// Azimuth.
    pub azimuth: Option<Axis>,
    /// Shutter altitude.
    pub altitude: Option<Axis>,
    /// Rotation in progress.
    pub rotating: bool,
    /// Goto switch available.
    pub can_goto: bool,
    /// Sync switch available.
    pub can_sync: bool,
    /// Slaved to the mount; present means slaving is reported.
    pub slaved: Option<bool>,
    /// Slaving can be changed.
    pub can_slave: bool,
    /// At home; present means the dome can find home.
    pub at_home: Option<bool>,
    /// Homing in progress.
    pub homing: bool,
}

impl DomeState {
    /// Any dome motion in progress.
    pub fn slewing(&self) -> bool {
        self.rotating || self.homing || self.parking
    }

    /// Azimuth can be slewed.
    pub fn can_set_azimuth(&self) -> bool {
        self.can_goto && self.azimuth.is_some_and(|a| a.writable)
    }

    /// Altitude can be slewed.
    pub fn can_set_altitude(&self) -> bool {
        self.can_goto && self.altitude.is_some_and(|a| a.writable)
    }

    /// Azimuth can be synced.
    pub fn can_sync_azimuth(&self) -> bool {
        self.can_sync && self.azimuth.is_some_and(|a| a.writable)
    }
}

impl StateBlock for DomeState {
    const DEVICE_TYPE: DeviceType = DeviceType::Dome;

    state_block_variant!(DomeState, Dome);

    fn apply(&mut self, property: &Property) {
        match property.name.as_str() {
            names::DOME_SHUTTER => {
                self.shutter = Some(ShutterStatus::from_property(property));
            }
            names::DOME_PARK => {
                self.parked =
                    Some(property.is_ok() && property.switch(names::PARKED) == Some(true));
                self.parking = property.is_busy();
            }
            names::DOME_PARK_POSITION => {
                self.can_set_park = property.perm.is_writable();
            }
            names::DOME_HORIZONTAL_COORDINATES => {
                let writable = property.perm.is_writable();
                self.rotating = property.is_busy();
                if let Some(az) = property.number(names::AZ) {
                    self.azimuth = Some(Axis { value: az, writable });
                }
                if let Some(alt) = property.number(names::ALT) {
                    self.altitude = Some(Axis { value: alt, writable });
                }
            }
            names::DOME_ON_HORIZONTAL_COORDINATES_SET => {
                self.can_goto = property.item(names::GOTO).is_some();
                self.can_sync = property.item(names::SYNC).is_some();
            }
            names::DOME_SLAVING => {
                self.slaved = Some(property.switch(names::ENABLED) == Some(true));
                self.can_slave = property.perm.is_writable();
            }
            names::DOME_HOME => {
                self.homing = property.is_busy();
                self.at_home = Some(property.is_ok() && property.switch(names::HOME) == Some(true));
            }
            _ => {}
        }
    }

    fn remove(&mut self, property: &str) {
        match property {
            names::DOME_SHUTTER => self.shutter = None,
            names::DOME_PARK => {
                self.parked = None;
                self.parking = false;
            }
            names::DOME_PARK_POSITION => self.can_set_park = false,
            names::DOME_HORIZONTAL_COORDINATES => {
                self.azimuth = None;
                self.altitude = None;
                self.rotating = false;
            }
            names::DOME_ON_HORIZONTAL_COORDINATES_SET => {
                self.can_goto = false;
                self.can_sync = false;
            }
            names::DOME_SLAVING => {
                self.slaved = None;
                self.can_slave = false;
            }
            names::DOME_HOME => {
                self.at_home = None;
                self.homing = false;
            }
            _ => {}
        }
    }
}
