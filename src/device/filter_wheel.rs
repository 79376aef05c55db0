//! Filter wheel state.

use crate::names;
use crate::property::{ItemValue, Property};

use super::{item_index, state_block_variant, DeviceState, DeviceType, StateBlock};

/// Filter wheel state block.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterWheelState {
    /// Number of slots.
    pub count: usize,
    /// Zero-based slot, `-1` while moving.
    pub position: i32,
    /// Filter names by slot.
    pub names: Vec<String>,
    /// Focus offsets by slot.
    pub focus_offsets: Vec<i32>,
}

impl Default for FilterWheelState {
    fn default() -> Self {
        Self {
            count: 0,
            position: -1,
            names: Vec::new(),
            focus_offsets: Vec::new(),
        }
    }
}

impl FilterWheelState {
    /// Names padded to `count` entries.
    pub fn slot_names(&self) -> Vec<String> {
        (0..self.count)
            .map(|slot| {
                self.names
                    .get(slot)
                    .filter(|name| !name.is_empty())
                    .cloned()
                    .unwrap_or_else(|| format!("Filter #{}", slot + 1))
            })
            .collect()
    }

    /// Offsets padded to `count` entries.
    pub fn slot_offsets(&self) -> Vec<i32> {
        (0..self.count)
            .map(|slot| self.focus_offsets.get(slot).copied().unwrap_or(0))
            .collect()
    }
}

fn store<T: Clone + Default>(slots: &mut Vec<T>, index: usize, value: T) {
    if slots.len() <= index {
        slots.resize(index + 1, T::default());
    }
    slots[index] = value;
}

impl StateBlock for FilterWheelState {
    const DEVICE_TYPE: DeviceType = DeviceType::FilterWheel;

    state_block_variant!(FilterWheelState, FilterWheel);

    fn apply(&mut self, property: &Property) {
        match property.name.as_str() {
            names::WHEEL_SLOT => {
                if let Some(item) = property.item(names::SLOT) {
                    if let ItemValue::Number { value, max, .. } = item.value {
                        self.count = max.max(0.0).round() as usize;
                        self.position = if property.is_ok() {
                            value.round() as i32 - 1
                        } else {
                            -1
                        };
                    }
                }
            }
            names::WHEEL_SLOT_NAME => {
                for item in &property.items {
                    if let (Some(slot), Some(name)) =
                        (item_index(&item.name, names::SLOT_NAME_PREFIX), item.text_value())
                    {
                        store(&mut self.names, slot, name.to_string());
                    }
                }
            }
            names::WHEEL_SLOT_OFFSET => {
                for item in &property.items {
                    if let (Some(slot), Some(offset)) =
                        (item_index(&item.name, names::SLOT_OFFSET_PREFIX), item.number_value())
                    {
                        store(&mut self.focus_offsets, slot, offset.round() as i32);
                    }
                }
            }
            _ => {}
        }
    }

    fn remove(&mut self, property: &str) {
        match property {
            names::WHEEL_SLOT => {
                self.count = 0;
                self.position = -1;
            }
            names::WHEEL_SLOT_NAME => self.names.clear(),
            names::WHEEL_SLOT_OFFSET => self.focus_offsets.clear(),
            _ => {}
        }
    }
}
