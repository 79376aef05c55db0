//! Rotator state.

use crate::names;
use crate::property::{ItemValue, Property};

use super::{state_block_variant, DeviceState, DeviceType, StateBlock};

/// Rotator state block.
#[derive(Clone, Debug, PartialEq)]
pub struct RotatorState {
    /// Position in degrees.
    pub position: f64,
    /// Lowest position the rotator accepts.
    pub min_position: f64,
    /// Highest position the rotator accepts.
    pub max_position: f64,
    /// Position property observed.
    pub has_position: bool,
    /// Rotation in progress.
    pub moving: bool,
    /// Last requested target.
    pub target: Option<f64>,
    /// Sync switch available.
    pub can_sync: bool,
    /// Reversed; present means direction is reported.
    pub reverse: Option<bool>,
    /// Direction can be changed.
    pub can_reverse: bool,
}

impl Default for RotatorState {
    fn default() -> Self {
        Self {
            position: 0.0,
            min_position: 0.0,
            max_position: 360.0,
            has_position: false,
            moving: false,
            target: None,
            can_sync: false,
            reverse: None,
            can_reverse: false,
        }
    }
}

impl RotatorState {
    /// Whether `position` lies within the reported limits.
    pub fn in_limits(&self, position: f64) -> bool {
        position >= self.min_position && position <= self.max_position
    }

    /// Target of the last move, or the current position.
    pub fn target_position(&self) -> f64 {
        self.target.unwrap_or(self.position)
    }
}

impl StateBlock for RotatorState {
    const DEVICE_TYPE: DeviceType = DeviceType::Rotator;

    state_block_variant!(RotatorState, Rotator);

    fn apply(&mut self, property: &Property) {
        match property.name.as_str() {
            names::ROTATOR_POSITION => {
                self.moving = property.is_busy();
                if let Some(ItemValue::Number { value, min, max, .. }) =
                    property.item(names::POSITION).map(|item| &item.value)
                {
                    self.has_position = true;
                    self.position = *value;
                    self.min_position = *min;
                    self.max_position = *max;
                }
            }
            names::ROTATOR_ON_POSITION_SET => {
                self.can_sync = property.item(names::SYNC).is_some();
            }
            names::ROTATOR_DIRECTION => {
                self.reverse = Some(property.switch(names::REVERSED) == Some(true));
                self.can_reverse = property.perm.is_writable();
            }
            _ => {}
        }
    }

    fn remove(&mut self, property: &str) {
        match property {
            names::ROTATOR_POSITION => {
                self.has_position = false;
                self.moving = false;
            }
            names::ROTATOR_ON_POSITION_SET => self.can_sync = false,
            names::ROTATOR_DIRECTION => {
                self.reverse = None;
                self.can_reverse = false;
            }
            _ => {}
        }
    }
}
