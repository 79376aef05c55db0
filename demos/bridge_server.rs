//! Bridge server example with a simulated device bus.
//!
//! Runs the Alpaca HTTP server and discovery responder in front of an
//! in-process bus that defines a dome, a focuser and a power box, and
//! echoes every change request back as a property update. Point any
//! Alpaca client at http://localhost:11111.
//!
//! # Usage
//!
//! ```sh
//! cargo run --example bridge_server
//! RUST_LOG=alpaca_bridge=debug cargo run --example bridge_server
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use alpaca_bridge::hal::ChannelBus;
use alpaca_bridge::names;
use alpaca_bridge::services::{run_discovery, run_ingestion, run_server, AlpacaState, WebServerConfig};
use alpaca_bridge::{
    Bridge, BusEvent, ChangeValue, Config, Item, ItemValue, Permission, Property, PropertyChange,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("alpaca_bridge=info")),
        )
        .init();

    let config = Config::default();
    config.validate().context("invalid configuration")?;

    let (bus, changes) = ChannelBus::new(64);
    let (events_tx, events_rx) = mpsc::channel(256);

    let bridge = Arc::new(Bridge::new(bus, config.bridge.clone()));
    tokio::spawn(run_ingestion(Arc::clone(&bridge), events_rx));

    let simulator = Simulator::new(events_tx);
    simulator.define_devices().await?;
    tokio::spawn(simulator.run(changes));

    if config.discovery.enabled {
        let discovery = config.discovery.clone();
        let http_port = config.server.port;
        tokio::spawn(async move {
            if let Err(err) = run_discovery(discovery, http_port).await {
                warn!(error = %err, "discovery stopped");
            }
        });
    }

    let state = Arc::new(AlpacaState::new(bridge));
    run_server(state, WebServerConfig::from_config(&config.server))
        .await
        .context("Alpaca server failed")
}

// ============================================================================
// Simulated Bus
// ============================================================================

struct Simulator {
    properties: HashMap<(String, String), Property>,
    events: mpsc::Sender<BusEvent>,
}

impl Simulator {
    fn new(events: mpsc::Sender<BusEvent>) -> Self {
        Self {
            properties: HashMap::new(),
            events,
        }
    }

    fn info(device: &str, interface: u64) -> Property {
        Property::new(device, names::INFO)
            .with_perm(Permission::ReadOnly)
            .with_item(Item::text(names::DEVICE_NAME, device))
            .with_item(Item::text(names::DEVICE_VERSION, env!("CARGO_PKG_VERSION")))
            .with_item(Item::text(names::DEVICE_INTERFACE, interface.to_string()))
            .with_item(Item::text(names::DEVICE_DRIVER, "simulator"))
    }

    fn connection(device: &str) -> Property {
        Property::new(device, names::CONNECTION)
            .with_item(Item::switch(names::CONNECTED, false))
            .with_item(Item::switch(names::DISCONNECTED, true))
    }

    fn devices() -> Vec<Property> {
        let dome = "Dome Simulator";
        let focuser = "Focuser Simulator";
        let powerbox = "Powerbox Simulator";
        vec![
            Self::connection(dome),
            Self::info(dome, names::INTERFACE_DOME),
            Property::new(dome, names::DOME_SHUTTER)
                .with_item(Item::switch(names::OPENED, false))
                .with_item(Item::switch(names::CLOSED, true)),
            Property::new(dome, names::DOME_PARK)
                .with_item(Item::switch(names::PARKED, true))
                .with_item(Item::switch(names::UNPARKED, false)),
            Property::new(dome, names::DOME_HORIZONTAL_COORDINATES)
                .with_item(Item::number_in(names::AZ, 0.0, 0.0, 360.0, 0.1)),
            Property::new(dome, names::DOME_ON_HORIZONTAL_COORDINATES_SET)
                .with_item(Item::switch(names::GOTO, true))
                .with_item(Item::switch(names::SYNC, false)),
            Self::connection(focuser),
            Self::info(focuser, names::INTERFACE_FOCUSER),
            Property::new(focuser, names::FOCUSER_POSITION)
                .with_item(Item::number_in(names::POSITION, 5000.0, 0.0, 10000.0, 1.0)),
            Property::new(focuser, names::FOCUSER_ON_POSITION_SET)
                .with_item(Item::switch(names::GOTO, true))
                .with_item(Item::switch(names::SYNC, false)),
            Property::new(focuser, names::FOCUSER_TEMPERATURE)
                .with_perm(Permission::ReadOnly)
                .with_item(Item::number(names::TEMPERATURE, 12.5)),
            Self::connection(powerbox),
            Self::info(powerbox, names::INTERFACE_AUX_POWERBOX),
            Property::new(powerbox, names::AUX_POWER_OUTLET)
                .with_item(Item::switch("OUTLET_1", true).with_label("Mount"))
                .with_item(Item::switch("OUTLET_2", false).with_label("Camera")),
            Property::new(powerbox, names::AUX_HEATER_OUTLET)
                .with_item(Item::number_in("OUTLET_1", 0.0, 0.0, 100.0, 1.0).with_label("Dew strip")),
        ]
    }

    async fn define_devices(&self) -> anyhow::Result<()> {
        for property in Self::devices() {
            self.events
                .send(BusEvent::Define(property))
                .await
                .context("ingestion stopped")?;
        }
        Ok(())
    }

    /// Echo change requests back as settled property updates.
    async fn run(mut self, mut changes: mpsc::Receiver<PropertyChange>) {
        for property in Self::devices() {
            self.properties
                .insert((property.device.clone(), property.name.clone()), property);
        }

        while let Some(change) = changes.recv().await {
            let key = (change.device.clone(), change.property.clone());
            let Some(property) = self.properties.get_mut(&key) else {
                warn!(device = %change.device, property = %change.property, "unknown property");
                continue;
            };
            apply_change(property, &change);
            info!(device = %change.device, property = %change.property, "simulated update");
            if self.events.send(BusEvent::Update(property.clone())).await.is_err() {
                break;
            }
        }
    }
}

/// Apply a change request; switching one item on turns its siblings off.
fn apply_change(property: &mut Property, change: &PropertyChange) {
    for (name, requested) in &change.items {
        match requested {
            ChangeValue::Switch(true) if is_one_of_many(&property.name) => {
                for item in &mut property.items {
                    if let ItemValue::Switch(on) = &mut item.value {
                        *on = item.name == *name;
                    }
                }
            }
            ChangeValue::Switch(value) => {
                if let Some(item) = property.items.iter_mut().find(|i| i.name == *name) {
                    item.value = ItemValue::Switch(*value);
                }
            }
            ChangeValue::Number(value) => {
                if let Some(ItemValue::Number { value: current, .. }) = property
                    .items
                    .iter_mut()
                    .find(|i| i.name == *name)
                    .map(|i| &mut i.value)
                {
                    *current = *value;
                }
            }
            ChangeValue::Text(value) => {
                if let Some(item) = property.items.iter_mut().find(|i| i.name == *name) {
                    item.value = ItemValue::Text(value.clone());
                }
            }
        }
    }
}

fn is_one_of_many(property: &str) -> bool {
    !matches!(property, names::AUX_POWER_OUTLET | names::AUX_USB_PORT | names::AUX_GPIO_OUTLET)
}
