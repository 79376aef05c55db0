//! Cover and calibrator state machines.
//!
//! Both statuses are derived from the bus property state first and the
//! active item second:
//!
//! | Property | Busy | Alert | Item on | Otherwise |
//! |----------|------|-------|---------|-----------|
//! | `AUX_COVER` | `Moving` | `Error` | `CLOSE` → `Closed`, `OPEN` → `Open` | `Unknown` |
//! | `AUX_LIGHT_SWITCH` | `NotReady` | `Error` | `OFF` → `Off`, `ON` → `Ready` | `Unknown` |

use crate::names;
use crate::property::{ItemValue, Property, PropertyState};

use super::{state_block_variant, DeviceState, DeviceType, StateBlock};

/// Alpaca `CoverStatus`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CoverStatus {
    /// No cover.
    #[default]
    NotPresent = 0,
    /// Closed.
    Closed = 1,
    /// Opening or closing.
    Moving = 2,
    /// Open.
    Open = 3,
    /// Indeterminate.
    Unknown = 4,
    /// Fault.
    Error = 5,
}

/// Alpaca `CalibratorStatus`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CalibratorStatus {
    /// No calibrator.
    #[default]
    NotPresent = 0,
    /// Off.
    Off = 1,
    /// Warming up or changing brightness.
    NotReady = 2,
    /// Lit and stable.
    Ready = 3,
    /// Indeterminate.
    Unknown = 4,
    /// Fault.
    Error = 5,
}

/// Cover/calibrator state block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoverCalibratorState {
    /// Cover status.
    pub cover: CoverStatus,
    /// Calibrator status.
    pub calibrator: CalibratorStatus,
    /// Current brightness.
    pub brightness: i32,
    /// Maximum brightness.
    pub max_brightness: i32,
}

impl StateBlock for CoverCalibratorState {
    const DEVICE_TYPE: DeviceType = DeviceType::CoverCalibrator;

    state_block_variant!(CoverCalibratorState, CoverCalibrator);

    fn apply(&mut self, property: &Property) {
        match property.name.as_str() {
            names::AUX_COVER => {
                self.cover = match property.state {
                    PropertyState::Busy => CoverStatus::Moving,
                    PropertyState::Alert => CoverStatus::Error,
                    _ if property.switch(names::CLOSE) == Some(true) => CoverStatus::Closed,
                    _ if property.switch(names::OPEN) == Some(true) => CoverStatus::Open,
                    _ => CoverStatus::Unknown,
                };
            }
            names::AUX_LIGHT_SWITCH => {
                self.calibrator = match property.state {
                    PropertyState::Busy => CalibratorStatus::NotReady,
                    PropertyState::Alert => CalibratorStatus::Error,
                    _ if property.switch(names::OFF) == Some(true) => CalibratorStatus::Off,
                    _ if property.switch(names::ON) == Some(true) => CalibratorStatus::Ready,
                    _ => CalibratorStatus::Unknown,
                };
                if self.calibrator == CalibratorStatus::Off {
                    self.brightness = 0;
                }
            }
            names::AUX_LIGHT_INTENSITY => {
                if let Some(ItemValue::Number { value, max, .. }) =
                    property.item(names::LIGHT_INTENSITY).map(|item| &item.value)
                {
                    self.max_brightness = max.round() as i32;
                    self.brightness = value.round() as i32;
                }
            }
            _ => {}
        }
    }

    fn remove(&mut self, property: &str) {
        match property {
            names::AUX_COVER => self.cover = CoverStatus::NotPresent,
            names::AUX_LIGHT_SWITCH => {
                self.calibrator = CalibratorStatus::NotPresent;
                self.brightness = 0;
            }
            names::AUX_LIGHT_INTENSITY => self.max_brightness = 0,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::property::Item;

    fn cover(state: PropertyState, open: bool) -> Property {
        Property::new("Flat Panel", names::AUX_COVER)
            .with_state(state)
            .with_item(Item::switch(names::OPEN, open))
            .with_item(Item::switch(names::CLOSE, !open))
    }

    fn light(state: PropertyState, on: bool) -> Property {
        Property::new("Flat Panel", names::AUX_LIGHT_SWITCH)
            .with_state(state)
            .with_item(Item::switch(names::ON, on))
            .with_item(Item::switch(names::OFF, !on))
    }

    #[test]
    fn cover_state_machine() {
        let mut panel = CoverCalibratorState::default();
        assert_eq!(panel.cover, CoverStatus::NotPresent);

        panel.apply(&cover(PropertyState::Busy, true));
        assert_eq!(panel.cover, CoverStatus::Moving);
        panel.apply(&cover(PropertyState::Ok, true));
        assert_eq!(panel.cover, CoverStatus::Open);
        panel.apply(&cover(PropertyState::Ok, false));
        assert_eq!(panel.cover, CoverStatus::Closed);
        panel.apply(&cover(PropertyState::Alert, false));
        assert_eq!(panel.cover, CoverStatus::Error);
        panel.apply(
            &Property::new("Flat Panel", names::AUX_COVER)
                .with_item(Item::switch(names::OPEN, false))
                .with_item(Item::switch(names::CLOSE, false)),
        );
        assert_eq!(panel.cover, CoverStatus::Unknown);
    }

    #[test]
    fn calibrator_state_machine() {
        let mut panel = CoverCalibratorState::default();
        panel.apply(
            &Property::new("Flat Panel", names::AUX_LIGHT_INTENSITY)
                .with_item(Item::number_in(names::LIGHT_INTENSITY, 40.0, 0.0, 255.0, 1.0)),
        );
        assert_eq!(panel.max_brightness, 255);

        panel.apply(&light(PropertyState::Busy, true));
        assert_eq!(panel.calibrator, CalibratorStatus::NotReady);
        panel.apply(&light(PropertyState::Ok, true));
        assert_eq!(panel.calibrator, CalibratorStatus::Ready);
        assert_eq!(panel.brightness, 40);

        panel.apply(&light(PropertyState::Ok, false));
        assert_eq!(panel.calibrator, CalibratorStatus::Off);
        assert_eq!(panel.brightness, 0);

        panel.apply(&light(PropertyState::Alert, false));
        assert_eq!(panel.calibrator, CalibratorStatus::Error);
    }

    #[test]
    fn intensity_tracked_while_light_off() {
        let mut panel = CoverCalibratorState::default();
        panel.apply(&light(PropertyState::Ok, false));
        assert_eq!(panel.brightness, 0);

        panel.apply(
            &Property::new("Flat Panel", names::AUX_LIGHT_INTENSITY)
                .with_item(Item::number_in(names::LIGHT_INTENSITY, 120.0, 0.0, 255.0, 1.0)),
        );
        assert_eq!(panel.calibrator, CalibratorStatus::Off);
        assert_eq!(panel.brightness, 120);
    }
}
