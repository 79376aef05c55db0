//! Device state cache.
//!
//! One [`DeviceHandle`] per bridged device, each guarding its
//! [`DeviceRecord`] with its own mutex. The registry lock is only held long
//! enough to find a handle; per-device locks are only held for a field read
//! or write, never across a bus call or a sleep.
//!
//! # Example
//!
//! ```rust
//! use alpaca_bridge::cache::DeviceCache;
//! use alpaca_bridge::device::{DeviceId, DeviceType};
//! use alpaca_bridge::names::INTERFACE_FOCUSER;
//!
//! let cache = DeviceCache::new();
//! let handle = cache.insert("Focuser Simulator", DeviceType::Focuser, INTERFACE_FOCUSER);
//! assert_eq!(handle.id(), DeviceId::new(DeviceType::Focuser, 0));
//!
//! cache.mutate(handle.id(), |record| record.connected = true);
//! assert!(cache.read(handle.id()).unwrap().connected);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use crate::device::{DeviceId, DeviceIdentity, DeviceRecord, DeviceType};

// ============================================================================
// Device Handle
// ============================================================================

/// A bridged device: immutable identity plus its locked record.
#[derive(Debug)]
pub struct DeviceHandle {
    identity: DeviceIdentity,
    record: Mutex<DeviceRecord>,
}

impl DeviceHandle {
    fn new(identity: DeviceIdentity) -> Self {
        let record = DeviceRecord::new(identity.id.device_type);
        Self {
            identity,
            record: Mutex::new(record),
        }
    }

    /// Identity.
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Alpaca address.
    pub fn id(&self) -> DeviceId {
        self.identity.id
    }

    /// Underlying bus device name.
    pub fn bus_device(&self) -> &str {
        &self.identity.bus_device
    }

    /// Value copy of the record.
    pub fn snapshot(&self) -> DeviceRecord {
        self.lock().clone()
    }

    /// Evaluate `f` against the record under the lock.
    pub fn inspect<R>(&self, f: impl FnOnce(&DeviceRecord) -> R) -> R {
        f(&self.lock())
    }

    /// Mutate the record under the lock.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut DeviceRecord) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, DeviceRecord> {
        self.record.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Default)]
struct Registry {
    devices: HashMap<DeviceId, Arc<DeviceHandle>>,
    // Numbers handed out before, so a returning device keeps its address.
    assigned: HashMap<(String, DeviceType), u32>,
}

impl Registry {
    fn allocate(&mut self, bus_device: &str, device_type: DeviceType) -> u32 {
        let key = (bus_device.to_string(), device_type);
        let free = |n: u32| !self.devices.contains_key(&DeviceId::new(device_type, n));
        let number = match self.assigned.get(&key) {
            Some(&n) if free(n) => n,
            _ => (0..).find(|&n| free(n)).unwrap_or(u32::MAX),
        };
        self.assigned.insert(key, number);
        number
    }
}

/// Registry of bridged devices.
#[derive(Debug, Default)]
pub struct DeviceCache {
    registry: RwLock<Registry>,
}

impl DeviceCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bus device as an Alpaca device of `device_type`.
    ///
    /// Returns the existing handle if that pair is already registered.
    pub fn insert(&self, bus_device: &str, device_type: DeviceType, interface: u64) -> Arc<DeviceHandle> {
        let mut registry = self.write();
        if let Some(existing) = registry.devices.values().find(|handle| {
            handle.bus_device() == bus_device && handle.id().device_type == device_type
        }) {
            return Arc::clone(existing);
        }
        let number = registry.allocate(bus_device, device_type);
        let id = DeviceId::new(device_type, number);
        let handle = Arc::new(DeviceHandle::new(DeviceIdentity::new(id, bus_device, interface)));
        registry.devices.insert(id, Arc::clone(&handle));
        handle
    }

    /// Handle by Alpaca address.
    pub fn get(&self, id: DeviceId) -> Option<Arc<DeviceHandle>> {
        self.read_registry().devices.get(&id).cloned()
    }

    /// Handles backed by one bus device.
    pub fn for_bus_device(&self, bus_device: &str) -> Vec<Arc<DeviceHandle>> {
        self.read_registry()
            .devices
            .values()
            .filter(|handle| handle.bus_device() == bus_device)
            .cloned()
            .collect()
    }

    /// Unregister every handle backed by a bus device.
    pub fn remove_bus_device(&self, bus_device: &str) -> Vec<Arc<DeviceHandle>> {
        let mut registry = self.write();
        let ids: Vec<DeviceId> = registry
            .devices
            .iter()
            .filter(|(_, handle)| handle.bus_device() == bus_device)
            .map(|(id, _)| *id)
            .collect();
        ids.iter()
            .filter_map(|id| registry.devices.remove(id))
            .collect()
    }

    /// All handles ordered by type then number.
    pub fn list(&self) -> Vec<Arc<DeviceHandle>> {
        let mut handles: Vec<_> = self.read_registry().devices.values().cloned().collect();
        handles.sort_by_key(|handle| handle.id());
        handles
    }

    /// Number of bridged devices.
    pub fn len(&self) -> usize {
        self.read_registry().devices.len()
    }

    /// Whether no device is bridged.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value copy of a device record.
    pub fn read(&self, id: DeviceId) -> Option<DeviceRecord> {
        self.get(id).map(|handle| handle.snapshot())
    }

    /// Mutate a device record; `None` if the device is unknown.
    pub fn mutate<R>(&self, id: DeviceId, f: impl FnOnce(&mut DeviceRecord) -> R) -> Option<R> {
        self.get(id).map(|handle| handle.mutate(f))
    }

    fn read_registry(&self) -> std::sync::RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names;
    use std::thread;

    #[test]
    fn numbers_allocated_per_type() {
        let cache = DeviceCache::new();
        let a = cache.insert("Focuser A", DeviceType::Focuser, names::INTERFACE_FOCUSER);
        let b = cache.insert("Focuser B", DeviceType::Focuser, names::INTERFACE_FOCUSER);
        let dome = cache.insert("Dome", DeviceType::Dome, names::INTERFACE_DOME);

        assert_eq!(a.id().number, 0);
        assert_eq!(b.id().number, 1);
        assert_eq!(dome.id().number, 0);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn insert_is_idempotent() {
        let cache = DeviceCache::new();
        let a = cache.insert("Wheel", DeviceType::FilterWheel, names::INTERFACE_WHEEL);
        let b = cache.insert("Wheel", DeviceType::FilterWheel, names::INTERFACE_WHEEL);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn returning_device_keeps_number() {
        let cache = DeviceCache::new();
        cache.insert("Focuser A", DeviceType::Focuser, names::INTERFACE_FOCUSER);
        cache.insert("Focuser B", DeviceType::Focuser, names::INTERFACE_FOCUSER);

        let removed = cache.remove_bus_device("Focuser A");
        assert_eq!(removed.len(), 1);
        assert!(cache.get(DeviceId::new(DeviceType::Focuser, 0)).is_none());

        let again = cache.insert("Focuser A", DeviceType::Focuser, names::INTERFACE_FOCUSER);
        assert_eq!(again.id().number, 0);
    }

    #[test]
    fn freed_number_reused_by_new_device() {
        let cache = DeviceCache::new();
        cache.insert("Rotator A", DeviceType::Rotator, names::INTERFACE_ROTATOR);
        cache.remove_bus_device("Rotator A");
        let b = cache.insert("Rotator B", DeviceType::Rotator, names::INTERFACE_ROTATOR);
        assert_eq!(b.id().number, 0);

        let a = cache.insert("Rotator A", DeviceType::Rotator, names::INTERFACE_ROTATOR);
        assert_eq!(a.id().number, 1);
    }

    #[test]
    fn snapshots_are_copies() {
        let cache = DeviceCache::new();
        let handle = cache.insert("Dome", DeviceType::Dome, names::INTERFACE_DOME);
        let before = handle.snapshot();
        handle.mutate(|record| record.connected = true);
        assert!(!before.connected);
        assert!(handle.snapshot().connected);
    }

    #[test]
    fn concurrent_mutation() {
        let cache = Arc::new(DeviceCache::new());
        let handle = cache.insert("Switch", DeviceType::Switch, names::INTERFACE_AUX_POWERBOX);
        let id = handle.id();

        let writers: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for _ in 0..100 {
                        cache.mutate(id, |record| record.connected = i % 2 == 0);
                        let _ = cache.read(id);
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }
        assert!(cache.read(id).is_some());
    }

    #[test]
    fn list_is_ordered() {
        let cache = DeviceCache::new();
        cache.insert("Switch", DeviceType::Switch, names::INTERFACE_AUX_POWERBOX);
        cache.insert("Mount", DeviceType::Telescope, names::INTERFACE_MOUNT);
        let types: Vec<_> = cache.list().iter().map(|h| h.id().device_type).collect();
        assert_eq!(types, vec![DeviceType::Telescope, DeviceType::Switch]);
    }
}
