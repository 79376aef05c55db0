//! Device bus property model.
//!
//! A bus device exposes named [`Property`] groups. Each property carries a
//! [`PropertyState`], a [`Permission`] and one or more named [`Item`]s.
//! The bridge consumes [`BusEvent`]s and issues [`PropertyChange`] requests.

use serde::{Deserialize, Serialize};

// ============================================================================
// Property State and Permission
// ============================================================================

/// State of a bus property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyState {
    /// No activity.
    #[default]
    Idle,
    /// Last operation completed.
    Ok,
    /// Operation in progress.
    Busy,
    /// Operation failed.
    Alert,
}

/// Access permission declared by the bus for a property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Read-only.
    #[default]
    ReadOnly,
    /// Read-write.
    ReadWrite,
    /// Write-only.
    WriteOnly,
}

impl Permission {
    /// Whether clients may change the property.
    #[inline]
    pub const fn is_writable(&self) -> bool {
        matches!(self, Permission::ReadWrite | Permission::WriteOnly)
    }
}

// ============================================================================
// Items
// ============================================================================

/// Value held by a property item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemValue {
    /// Switch item.
    Switch(bool),
    /// Number item with its declared range.
    Number {
        /// Current value.
        value: f64,
        /// Declared minimum.
        min: f64,
        /// Declared maximum.
        max: f64,
        /// Declared step.
        step: f64,
    },
    /// Text item.
    Text(String),
    /// Light item (status only).
    Light,
}

/// A named scalar inside a property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Item name.
    pub name: String,
    /// Human-readable label.
    #[serde(default)]
    pub label: String,
    /// Item value.
    pub value: ItemValue,
}

impl Item {
    /// Switch item.
    pub fn switch(name: impl Into<String>, on: bool) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            value: ItemValue::Switch(on),
        }
    }

    /// Number item with an open range.
    pub fn number(name: impl Into<String>, value: f64) -> Self {
        Self::number_in(name, value, f64::MIN, f64::MAX, 0.0)
    }

    /// Number item with a declared range.
    pub fn number_in(name: impl Into<String>, value: f64, min: f64, max: f64, step: f64) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            value: ItemValue::Number {
                value,
                min,
                max,
                step,
            },
        }
    }

    /// Text item.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            value: ItemValue::Text(value.into()),
        }
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Switch value, if this is a switch item.
    pub fn switch_value(&self) -> Option<bool> {
        match self.value {
            ItemValue::Switch(on) => Some(on),
            _ => None,
        }
    }

    /// Number value, if this is a number item.
    pub fn number_value(&self) -> Option<f64> {
        match self.value {
            ItemValue::Number { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Text value, if this is a text item.
    pub fn text_value(&self) -> Option<&str> {
        match &self.value {
            ItemValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Label, or the name when no label is set.
    pub fn display_name(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}

// ============================================================================
// Property
// ============================================================================

/// A named, typed, permissioned group of items on one bus device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Bus device name.
    pub device: String,
    /// Property name.
    pub name: String,
    /// Property state.
    pub state: PropertyState,
    /// Declared permission.
    pub perm: Permission,
    /// Items in declaration order.
    pub items: Vec<Item>,
}

impl Property {
    /// Create an empty property in the `Ok` state with read-write permission.
    pub fn new(device: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            name: name.into(),
            state: PropertyState::Ok,
            perm: Permission::ReadWrite,
            items: Vec::new(),
        }
    }

    /// Set the state.
    pub fn with_state(mut self, state: PropertyState) -> Self {
        self.state = state;
        self
    }

    /// Set the permission.
    pub fn with_perm(mut self, perm: Permission) -> Self {
        self.perm = perm;
        self
    }

    /// Append an item.
    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    /// Look up an item by name.
    pub fn item(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Whether the property is in the `Ok` state.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.state == PropertyState::Ok
    }

    /// Whether the property is in the `Busy` state.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.state == PropertyState::Busy
    }

    /// Switch value of an item, `None` if absent or not a switch.
    pub fn switch(&self, item: &str) -> Option<bool> {
        self.item(item).and_then(Item::switch_value)
    }

    /// Number value of an item, `None` if absent or not a number.
    pub fn number(&self, item: &str) -> Option<f64> {
        self.item(item).and_then(Item::number_value)
    }

    /// Text value of an item, `None` if absent or not text.
    pub fn text(&self, item: &str) -> Option<&str> {
        self.item(item).and_then(Item::text_value)
    }
}

// ============================================================================
// Bus Events
// ============================================================================

/// Notification delivered by the bus.
#[derive(Clone, Debug, PartialEq)]
pub enum BusEvent {
    /// A property was defined.
    Define(Property),
    /// A property changed.
    Update(Property),
    /// A property, or the whole device when `property` is `None`, was removed.
    Delete {
        /// Bus device name.
        device: String,
        /// Property name.
        property: Option<String>,
    },
}

// ============================================================================
// Mutation Requests
// ============================================================================

/// New value for one item in a [`PropertyChange`].
#[derive(Clone, Debug, PartialEq)]
pub enum ChangeValue {
    /// Switch value.
    Switch(bool),
    /// Number value.
    Number(f64),
    /// Text value.
    Text(String),
}

/// Request to change items of a property on a bus device.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyChange {
    /// Bus device name.
    pub device: String,
    /// Property name.
    pub property: String,
    /// Items to change.
    pub items: Vec<(String, ChangeValue)>,
}

impl PropertyChange {
    /// Change a single switch item.
    pub fn switch(device: &str, property: &str, item: &str, on: bool) -> Self {
        Self {
            device: device.to_string(),
            property: property.to_string(),
            items: vec![(item.to_string(), ChangeValue::Switch(on))],
        }
    }

    /// Change a set of number items.
    pub fn numbers(device: &str, property: &str, items: &[(&str, f64)]) -> Self {
        Self {
            device: device.to_string(),
            property: property.to_string(),
            items: items
                .iter()
                .map(|(name, value)| (name.to_string(), ChangeValue::Number(*value)))
                .collect(),
        }
    }

    /// Change a single text item.
    pub fn text(device: &str, property: &str, item: &str, value: &str) -> Self {
        Self {
            device: device.to_string(),
            property: property.to_string(),
            items: vec![(item.to_string(), ChangeValue::Text(value.to_string()))],
        }
    }

    /// Value requested for an item.
    pub fn value(&self, item: &str) -> Option<&ChangeValue> {
        self.items
            .iter()
            .find(|(name, _)| name == item)
            .map(|(_, value)| value)
    }
}
