//! Bus interface bits and property/item names consumed by the bridge.

#![allow(missing_docs)]

// ============================================================================
// Interface Bits
// ============================================================================

/// Mount.
pub const INTERFACE_MOUNT: u64 = 1 << 0;
/// Imaging camera.
pub const INTERFACE_CCD: u64 = 1 << 1;
/// Guider port.
pub const INTERFACE_GUIDER: u64 = 1 << 2;
/// Focuser.
pub const INTERFACE_FOCUSER: u64 = 1 << 3;
/// Filter wheel.
pub const INTERFACE_WHEEL: u64 = 1 << 4;
/// Dome.
pub const INTERFACE_DOME: u64 = 1 << 5;
/// GPS.
pub const INTERFACE_GPS: u64 = 1 << 6;
/// Adaptive optics.
pub const INTERFACE_AO: u64 = 1 << 8;
/// Rotator.
pub const INTERFACE_ROTATOR: u64 = 1 << 12;
/// Agent.
pub const INTERFACE_AGENT: u64 = 1 << 14;
/// Auxiliary device.
pub const INTERFACE_AUX: u64 = 1 << 15;
/// Power box.
pub const INTERFACE_AUX_POWERBOX: u64 = INTERFACE_AUX | (1 << 18);
/// Dust cap.
pub const INTERFACE_AUX_DUSTCAP: u64 = INTERFACE_AUX | (1 << 20);
/// Light box.
pub const INTERFACE_AUX_LIGHTBOX: u64 = INTERFACE_AUX | (1 << 21);
/// GPIO board.
pub const INTERFACE_AUX_GPIO: u64 = INTERFACE_AUX | (1 << 23);

/// Whether `mask` advertises every bit of `interface`.
#[inline]
pub const fn has_interface(mask: u64, interface: u64) -> bool {
    mask & interface == interface
}

// ============================================================================
// Common
// ============================================================================

pub const CONNECTION: &str = "CONNECTION";
pub const CONNECTED: &str = "CONNECTED";
pub const DISCONNECTED: &str = "DISCONNECTED";

pub const INFO: &str = "INFO";
pub const DEVICE_NAME: &str = "DEVICE_NAME";
pub const DEVICE_VERSION: &str = "DEVICE_VERSION";
pub const DEVICE_INTERFACE: &str = "DEVICE_INTERFACE";
pub const DEVICE_MODEL: &str = "DEVICE_MODEL";
pub const DEVICE_DRIVER: &str = "DEVICE_DRIVER";

pub const GEOGRAPHIC_COORDINATES: &str = "GEOGRAPHIC_COORDINATES";
pub const LATITUDE: &str = "LATITUDE";
pub const LONGITUDE: &str = "LONGITUDE";
pub const ELEVATION: &str = "ELEVATION";

pub const UTC_TIME: &str = "UTC_TIME";
pub const TIME: &str = "TIME";

pub const ABORT_MOTION: &str = "ABORT_MOTION";

// ============================================================================
// Mount
// ============================================================================

pub const MOUNT_PARK: &str = "MOUNT_PARK";
pub const PARKED: &str = "PARKED";
pub const UNPARKED: &str = "UNPARKED";
pub const MOUNT_PARK_SET: &str = "MOUNT_PARK_SET";
pub const CURRENT: &str = "CURRENT";
pub const MOUNT_HOME: &str = "MOUNT_HOME";
pub const HOME: &str = "HOME";
pub const MOUNT_GUIDE_RATE: &str = "MOUNT_GUIDE_RATE";
pub const RA: &str = "RA";
pub const DEC: &str = "DEC";
pub const MOUNT_LST_TIME: &str = "MOUNT_LST_TIME";
pub const MOUNT_EPOCH: &str = "MOUNT_EPOCH";
pub const EPOCH: &str = "EPOCH";
pub const MOUNT_ON_COORDINATES_SET: &str = "MOUNT_ON_COORDINATES_SET";
pub const TRACK: &str = "TRACK";
pub const SYNC: &str = "SYNC";
pub const SLEW: &str = "SLEW";
pub const MOUNT_TRACKING: &str = "MOUNT_TRACKING";
pub const ON: &str = "ON";
pub const OFF: &str = "OFF";
pub const MOUNT_EQUATORIAL_COORDINATES: &str = "MOUNT_EQUATORIAL_COORDINATES";
pub const MOUNT_HORIZONTAL_COORDINATES: &str = "MOUNT_HORIZONTAL_COORDINATES";
pub const ALT: &str = "ALT";
pub const AZ: &str = "AZ";
pub const MOUNT_TRACK_RATE: &str = "MOUNT_TRACK_RATE";
/// Track rate items in Alpaca `DriveRates` order.
pub const TRACK_RATES: [&str; 4] = ["SIDEREAL", "LUNAR", "SOLAR", "KING"];
pub const MOUNT_SIDE_OF_PIER: &str = "MOUNT_SIDE_OF_PIER";
pub const EAST: &str = "EAST";
pub const WEST: &str = "WEST";
pub const MOUNT_ABORT_MOTION: &str = "MOUNT_ABORT_MOTION";

// ============================================================================
// Guider
// ============================================================================

pub const GUIDER_GUIDE_DEC: &str = "GUIDER_GUIDE_DEC";
pub const NORTH: &str = "NORTH";
pub const SOUTH: &str = "SOUTH";
pub const GUIDER_GUIDE_RA: &str = "GUIDER_GUIDE_RA";

// ============================================================================
// Dome
// ============================================================================

pub const DOME_SHUTTER: &str = "DOME_SHUTTER";
pub const OPENED: &str = "OPENED";
pub const CLOSED: &str = "CLOSED";
pub const DOME_PARK: &str = "DOME_PARK";
pub const DOME_PARK_POSITION: &str = "DOME_PARK_POSITION";
pub const DOME_HORIZONTAL_COORDINATES: &str = "DOME_HORIZONTAL_COORDINATES";
pub const DOME_ON_HORIZONTAL_COORDINATES_SET: &str = "DOME_ON_HORIZONTAL_COORDINATES_SET";
pub const GOTO: &str = "GOTO";
pub const DOME_SLAVING: &str = "DOME_SLAVING";
pub const ENABLED: &str = "ENABLED";
pub const DISABLED: &str = "DISABLED";
pub const DOME_HOME: &str = "DOME_HOME";
pub const DOME_ABORT_MOTION: &str = "DOME_ABORT_MOTION";

// ============================================================================
// Focuser
// ============================================================================

pub const FOCUSER_POSITION: &str = "FOCUSER_POSITION";
pub const POSITION: &str = "POSITION";
pub const FOCUSER_STEPS: &str = "FOCUSER_STEPS";
pub const STEPS: &str = "STEPS";
pub const FOCUSER_TEMPERATURE: &str = "FOCUSER_TEMPERATURE";
pub const TEMPERATURE: &str = "TEMPERATURE";
pub const FOCUSER_MODE: &str = "FOCUSER_MODE";
pub const AUTOMATIC: &str = "AUTOMATIC";
pub const MANUAL: &str = "MANUAL";
pub const FOCUSER_DIRECTION: &str = "FOCUSER_DIRECTION";
pub const MOVE_INWARD: &str = "MOVE_INWARD";
pub const MOVE_OUTWARD: &str = "MOVE_OUTWARD";
pub const FOCUSER_ON_POSITION_SET: &str = "FOCUSER_ON_POSITION_SET";
pub const FOCUSER_ABORT_MOTION: &str = "FOCUSER_ABORT_MOTION";

// ============================================================================
// Rotator
// ============================================================================

pub const ROTATOR_POSITION: &str = "ROTATOR_POSITION";
pub const ROTATOR_ON_POSITION_SET: &str = "ROTATOR_ON_POSITION_SET";
pub const ROTATOR_DIRECTION: &str = "ROTATOR_DIRECTION";
pub const NORMAL: &str = "NORMAL";
pub const REVERSED: &str = "REVERSED";
pub const ROTATOR_ABORT_MOTION: &str = "ROTATOR_ABORT_MOTION";

// ============================================================================
// Filter Wheel
// ============================================================================

pub const WHEEL_SLOT: &str = "WHEEL_SLOT";
pub const SLOT: &str = "SLOT";
pub const WHEEL_SLOT_NAME: &str = "WHEEL_SLOT_NAME";
pub const SLOT_NAME_PREFIX: &str = "SLOT_NAME_";
pub const WHEEL_SLOT_OFFSET: &str = "WHEEL_SLOT_OFFSET";
pub const SLOT_OFFSET_PREFIX: &str = "SLOT_OFFSET_";

// ============================================================================
// Switch Banks
// ============================================================================

pub const AUX_POWER_OUTLET: &str = "AUX_POWER_OUTLET";
pub const AUX_POWER_OUTLET_NAMES: &str = "AUX_POWER_OUTLET_NAMES";
pub const AUX_HEATER_OUTLET: &str = "AUX_HEATER_OUTLET";
pub const AUX_HEATER_OUTLET_NAMES: &str = "AUX_HEATER_OUTLET_NAMES";
pub const AUX_USB_PORT: &str = "AUX_USB_PORT";
pub const AUX_USB_PORT_NAMES: &str = "AUX_USB_PORT_NAMES";
pub const AUX_GPIO_OUTLET: &str = "AUX_GPIO_OUTLET";
pub const AUX_GPIO_OUTLET_NAMES: &str = "AUX_GPIO_OUTLET_NAMES";
pub const AUX_GPIO_SENSORS: &str = "AUX_GPIO_SENSORS";
pub const AUX_GPIO_SENSOR_NAMES: &str = "AUX_GPIO_SENSOR_NAMES";

// ============================================================================
// Cover / Calibrator
// ============================================================================

pub const AUX_COVER: &str = "AUX_COVER";
pub const OPEN: &str = "OPEN";
pub const CLOSE: &str = "CLOSE";
pub const AUX_LIGHT_SWITCH: &str = "AUX_LIGHT_SWITCH";
pub const AUX_LIGHT_INTENSITY: &str = "AUX_LIGHT_INTENSITY";
pub const LIGHT_INTENSITY: &str = "LIGHT_INTENSITY";
