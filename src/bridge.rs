//! The bridge: bus events in, Alpaca commands out.
//!
//! [`Bridge::handle_event`] is the single ingestion entry point. The bridge
//! keeps the last copy of every bus property so that a device whose `INFO`
//! arrives after its other properties still starts from complete state.
//! [`Bridge::get_command`] and [`Bridge::set_command`] run commands against
//! a device found in the cache.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tracing::{debug, info};

use crate::cache::{DeviceCache, DeviceHandle};
use crate::config::BridgeConfig;
use crate::device::{DeviceId, DeviceType};
use crate::dispatch::{self, DeviceContext};
use crate::error::AlpacaResult;
use crate::names;
use crate::params::Params;
use crate::property::{BusEvent, Property};
use crate::traits::DeviceBus;

type Retained = HashMap<String, BTreeMap<String, Property>>;

/// Bus-to-Alpaca bridge.
pub struct Bridge<B: DeviceBus> {
    bus: B,
    cache: DeviceCache,
    retained: Mutex<Retained>,
    config: BridgeConfig,
}

impl<B: DeviceBus> Bridge<B> {
    /// Create a bridge over `bus`.
    pub fn new(bus: B, config: BridgeConfig) -> Self {
        Self {
            bus,
            cache: DeviceCache::new(),
            retained: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Bus used for mutations.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Device cache.
    pub fn cache(&self) -> &DeviceCache {
        &self.cache
    }

    /// Configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Device by Alpaca address.
    pub fn device(&self, device_type: DeviceType, number: u32) -> Option<Arc<DeviceHandle>> {
        self.cache.get(DeviceId::new(device_type, number))
    }

    // ========================================================================
    // Ingestion
    // ========================================================================

    /// Apply one bus event.
    pub fn handle_event(&self, event: BusEvent) {
        match event {
            BusEvent::Define(property) | BusEvent::Update(property) => self.ingest(property),
            BusEvent::Delete {
                device,
                property: None,
            } => {
                self.retained().remove(&device);
                self.remove_records(&device);
            }
            BusEvent::Delete {
                device,
                property: Some(name),
            } => {
                if let Some(properties) = self.retained().get_mut(&device) {
                    properties.remove(&name);
                }
                if name == names::INFO {
                    self.remove_records(&device);
                } else {
                    for handle in self.cache.for_bus_device(&device) {
                        handle.mutate(|record| record.remove(&name));
                    }
                }
            }
        }
    }

    fn ingest(&self, property: Property) {
        debug!(
            device = %property.device,
            property = %property.name,
            state = ?property.state,
            "property"
        );

        let replay = {
            let mut retained = self.retained();
            let properties = retained.entry(property.device.clone()).or_default();
            properties.insert(property.name.clone(), property.clone());
            (property.name == names::INFO).then(|| properties.values().cloned().collect::<Vec<_>>())
        };

        if let Some(replay) = replay {
            for handle in self.register(&property) {
                handle.mutate(|record| replay.iter().for_each(|p| record.apply(p)));
            }
        }

        for handle in self.cache.for_bus_device(&property.device) {
            handle.mutate(|record| record.apply(&property));
        }
    }

    /// Create records for the Alpaca types an `INFO` property advertises.
    fn register(&self, info: &Property) -> Vec<Arc<DeviceHandle>> {
        let Some(mask) = info
            .text(names::DEVICE_INTERFACE)
            .and_then(|text| text.trim().parse::<u64>().ok())
        else {
            return Vec::new();
        };
        let existing: Vec<DeviceType> = self
            .cache
            .for_bus_device(&info.device)
            .iter()
            .map(|handle| handle.id().device_type)
            .collect();

        DeviceType::for_interface(mask)
            .into_iter()
            .filter(|device_type| !existing.contains(device_type))
            .map(|device_type| {
                let handle = self.cache.insert(&info.device, device_type, mask);
                info!(
                    device = %info.device,
                    device_type = %device_type,
                    number = handle.id().number,
                    "device bridged"
                );
                handle
            })
            .collect()
    }

    fn remove_records(&self, device: &str) {
        for handle in self.cache.remove_bus_device(device) {
            info!(
                device = %device,
                device_type = %handle.id().device_type,
                number = handle.id().number,
                "device removed"
            );
        }
    }

    fn retained(&self) -> MutexGuard<'_, Retained> {
        self.retained.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Execute a GET command against `device`.
    pub fn get_command(
        &self,
        device: &DeviceHandle,
        command: &str,
        params: &Params,
    ) -> AlpacaResult<Value> {
        let ctx = DeviceContext::new(&self.bus, device, &self.config.waits);
        dispatch::get_command(&ctx, command, params)
    }

    /// Execute a SET command against `device`.
    pub async fn set_command(
        &self,
        device: &DeviceHandle,
        command: &str,
        params: &Params,
    ) -> AlpacaResult<()> {
        let ctx = DeviceContext::new(&self.bus, device, &self.config.waits);
        dispatch::set_command(&ctx, command, params).await
    }
}
