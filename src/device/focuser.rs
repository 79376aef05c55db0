//! Focuser state.
//!
//! A writable `FOCUSER_POSITION` makes the focuser absolute; positions are
//! then reported relative to the item minimum. Relative focusers take
//! their limits from `FOCUSER_STEPS`.

use crate::names;
use crate::property::{ItemValue, Property};

use super::{state_block_variant, DeviceState, DeviceType, StateBlock};

/// Focuser state block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FocuserState {
    /// Absolute positioning is available.
    pub absolute: bool,
    /// Bus position corresponding to Alpaca position 0.
    pub offset: f64,
    /// Position in steps, relative to `offset`.
    pub position: i32,
    /// Maximum position.
    pub max_step: i32,
    /// Maximum single move.
    pub max_increment: i32,
    /// Absolute move in progress.
    pub position_busy: bool,
    /// Relative move in progress.
    pub steps_busy: bool,
    /// Temperature in degrees Celsius.
    pub temperature: Option<f64>,
    /// Temperature compensation; present means it is available.
    pub temp_comp: Option<bool>,
}

impl FocuserState {
    /// Any motion in progress.
    pub fn is_moving(&self) -> bool {
        self.position_busy || self.steps_busy
    }
}

impl StateBlock for FocuserState {
    const DEVICE_TYPE: DeviceType = DeviceType::Focuser;

    state_block_variant!(FocuserState, Focuser);

    fn apply(&mut self, property: &Property) {
        match property.name.as_str() {
            names::FOCUSER_POSITION => {
                self.position_busy = property.is_busy();
                if !property.perm.is_writable() {
                    self.absolute = false;
                    return;
                }
                if let Some(ItemValue::Number { value, min, max, .. }) =
                    property.item(names::POSITION).map(|item| &item.value)
                {
                    self.absolute = true;
                    self.offset = *min;
                    self.max_step = (max - min).round() as i32;
                    self.max_increment = self.max_step;
                    self.position = (value - min).round() as i32;
                }
            }
            names::FOCUSER_STEPS => {
                self.steps_busy = property.is_busy();
                if !self.absolute && self.max_increment == 0 {
                    if let Some(ItemValue::Number { max, .. }) =
                        property.item(names::STEPS).map(|item| &item.value)
                    {
                        self.max_step = max.round() as i32;
                        self.max_increment = self.max_step;
                    }
                }
            }
            names::FOCUSER_TEMPERATURE => {
                if let Some(temperature) = property.number(names::TEMPERATURE) {
                    self.temperature = Some(temperature);
                }
            }
            names::FOCUSER_MODE => {
                self.temp_comp = Some(property.switch(names::AUTOMATIC) == Some(true));
            }
            _ => {}
        }
    }

    fn remove(&mut self, property: &str) {
        match property {
            names::FOCUSER_POSITION => {
                self.absolute = false;
                self.position_busy = false;
            }
            names::FOCUSER_STEPS => self.steps_busy = false,
            names::FOCUSER_TEMPERATURE => self.temperature = None,
            names::FOCUSER_MODE => self.temp_comp = None,
            _ => {}
        }
    }
}
