//! Switch panel state.
//!
//! Power boxes and GPIO boards expose up to five independently sized banks.
//! Alpaca addresses switches by a single 0-based id; the id is decomposed
//! against the bank sizes in this fixed order:
//!
//! | Bank | Property | Items | Kind |
//! |------|----------|-------|------|
//! | Power outlets | `AUX_POWER_OUTLET` | `OUTLET_n` | switch |
//! | Heater outlets | `AUX_HEATER_OUTLET` | `OUTLET_n` | number (duty cycle) |
//! | USB ports | `AUX_USB_PORT` | `PORT_n` | switch |
//! | GPIO outlets | `AUX_GPIO_OUTLET` | `OUTLET_n` | switch |
//! | GPIO sensors | `AUX_GPIO_SENSORS` | `SENSOR_n` | number, always read-only |

use crate::names;
use crate::property::{ItemValue, Property};

use super::{state_block_variant, DeviceState, DeviceType, StateBlock};

/// One switch bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BankKind {
    /// Power outlets.
    PowerOutlet,
    /// Dew heater outlets.
    HeaterOutlet,
    /// USB ports.
    UsbPort,
    /// GPIO outputs.
    GpioOutlet,
    /// GPIO inputs.
    GpioSensor,
}

impl BankKind {
    /// Banks in id order.
    pub const ALL: [BankKind; 5] = [
        BankKind::PowerOutlet,
        BankKind::HeaterOutlet,
        BankKind::UsbPort,
        BankKind::GpioOutlet,
        BankKind::GpioSensor,
    ];

    /// Position in [`ALL`](Self::ALL).
    pub const fn index(&self) -> usize {
        match self {
            BankKind::PowerOutlet => 0,
            BankKind::HeaterOutlet => 1,
            BankKind::UsbPort => 2,
            BankKind::GpioOutlet => 3,
            BankKind::GpioSensor => 4,
        }
    }

    /// Value property.
    pub const fn property(&self) -> &'static str {
        match self {
            BankKind::PowerOutlet => names::AUX_POWER_OUTLET,
            BankKind::HeaterOutlet => names::AUX_HEATER_OUTLET,
            BankKind::UsbPort => names::AUX_USB_PORT,
            BankKind::GpioOutlet => names::AUX_GPIO_OUTLET,
            BankKind::GpioSensor => names::AUX_GPIO_SENSORS,
        }
    }

    /// Name property.
    pub const fn names_property(&self) -> &'static str {
        match self {
            BankKind::PowerOutlet => names::AUX_POWER_OUTLET_NAMES,
            BankKind::HeaterOutlet => names::AUX_HEATER_OUTLET_NAMES,
            BankKind::UsbPort => names::AUX_USB_PORT_NAMES,
            BankKind::GpioOutlet => names::AUX_GPIO_OUTLET_NAMES,
            BankKind::GpioSensor => names::AUX_GPIO_SENSOR_NAMES,
        }
    }

    /// Human description prefix.
    pub const fn label(&self) -> &'static str {
        match self {
            BankKind::PowerOutlet => "Power outlet",
            BankKind::HeaterOutlet => "Heater outlet",
            BankKind::UsbPort => "USB port",
            BankKind::GpioOutlet => "GPIO outlet",
            BankKind::GpioSensor => "GPIO sensor",
        }
    }

    /// Sensors never accept writes.
    pub const fn read_only(&self) -> bool {
        matches!(self, BankKind::GpioSensor)
    }

    fn for_property(name: &str) -> Option<(BankKind, bool)> {
        Self::ALL.into_iter().find_map(|kind| {
            if name == kind.property() {
                Some((kind, false))
            } else if name == kind.names_property() {
                Some((kind, true))
            } else {
                None
            }
        })
    }
}

/// One addressable switch.
#[derive(Clone, Debug, PartialEq)]
pub struct SwitchChannel {
    /// Bus item name.
    pub item: String,
    /// Bus item label.
    pub label: String,
    /// Current value.
    pub value: f64,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
    /// Value step.
    pub step: f64,
    /// Accepts writes.
    pub writable: bool,
    /// Backed by a bus switch item rather than a number.
    pub boolean: bool,
}

/// One bank of switches.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SwitchBank {
    /// Switches in item order.
    pub channels: Vec<SwitchChannel>,
    /// Name items as `(item, value)`, in item order.
    pub names: Vec<(String, String)>,
    /// The bank's name property was observed.
    pub has_names: bool,
}

/// Switch panel state block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SwitchState {
    /// Banks in [`BankKind::ALL`] order.
    pub banks: [SwitchBank; 5],
}

impl SwitchState {
    /// Bank by kind.
    pub fn bank(&self, kind: BankKind) -> &SwitchBank {
        &self.banks[kind.index()]
    }

    /// Total number of switches.
    pub fn max_switch(&self) -> usize {
        self.banks.iter().map(|bank| bank.channels.len()).sum()
    }

    /// Decompose an external id into bank and index within the bank.
    pub fn resolve(&self, id: i64) -> Option<(BankKind, usize)> {
        let mut index = usize::try_from(id).ok()?;
        for kind in BankKind::ALL {
            let size = self.bank(kind).channels.len();
            if index < size {
                return Some((kind, index));
            }
            index -= size;
        }
        None
    }

    /// Switch by external id.
    pub fn channel(&self, id: i64) -> Option<&SwitchChannel> {
        let (kind, index) = self.resolve(id)?;
        self.bank(kind).channels.get(index)
    }

    /// Name by external id: the bank name property, the item label, then the item name.
    pub fn switch_name(&self, id: i64) -> Option<String> {
        let (kind, index) = self.resolve(id)?;
        let bank = self.bank(kind);
        let channel = bank.channels.get(index)?;
        let name = bank
            .names
            .get(index)
            .map(|(_, name)| name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(if channel.label.is_empty() {
                channel.item.as_str()
            } else {
                channel.label.as_str()
            });
        Some(name.to_string())
    }

    /// Description by external id.
    pub fn switch_description(&self, id: i64) -> Option<String> {
        let (kind, index) = self.resolve(id)?;
        Some(format!("{} {}", kind.label(), index + 1))
    }
}

fn channels_from(kind: BankKind, property: &Property) -> Vec<SwitchChannel> {
    let writable = property.perm.is_writable() && !kind.read_only();
    property
        .items
        .iter()
        .filter_map(|item| {
            let (value, min, max, step, boolean) = match item.value {
                ItemValue::Switch(on) => (if on { 1.0 } else { 0.0 }, 0.0, 1.0, 1.0, true),
                ItemValue::Number {
                    value,
                    min,
                    max,
                    step,
                } => (value, min, max, step, false),
                _ => return None,
            };
            Some(SwitchChannel {
                item: item.name.clone(),
                label: item.label.clone(),
                value,
                min,
                max,
                step,
                writable,
                boolean,
            })
        })
        .collect()
}

impl StateBlock for SwitchState {
    const DEVICE_TYPE: DeviceType = DeviceType::Switch;

    state_block_variant!(SwitchState, Switch);

    fn apply(&mut self, property: &Property) {
        let Some((kind, is_names)) = BankKind::for_property(&property.name) else {
            return;
        };
        let bank = &mut self.banks[kind.index()];
        if is_names {
            bank.has_names = property.perm.is_writable();
            bank.names = property
                .items
                .iter()
                .filter_map(|item| Some((item.name.clone(), item.text_value()?.to_string())))
                .collect();
        } else {
            bank.channels = channels_from(kind, property);
        }
    }

    fn remove(&mut self, property: &str) {
        let Some((kind, is_names)) = BankKind::for_property(property) else {
            return;
        };
        let bank = &mut self.banks[kind.index()];
        if is_names {
            bank.names.clear();
            bank.has_names = false;
        } else {
            bank.channels.clear();
        }
    }
}
