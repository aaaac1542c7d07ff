//! # Handle Registry
//!
//! Every object Java holds a `long` for lives here, in generational arenas.
//! A destroyed handle never aliases a newer object, and every value Java
//! sees carries the arena it came from, so stale handles and handles of the
//! wrong kind are rejected instead of dereferenced.
//!
//! Loaders sit behind their own mutex. Entry points clone the `Arc` and drop
//! the registry lock before decoding, so a Java provider may call back into
//! the registry (to create materials, say) without deadlocking.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use super::types::NativeHandle;
use crate::engine::SharedEngine;
use crate::entities::SharedEntities;
use crate::loader::AssetLoader;

new_key_type! {
    pub struct EngineKey;
    pub struct EntityManagerKey;
    pub struct LoaderKey;
}

pub type SharedLoader = Arc<Mutex<AssetLoader>>;

/// Arenas for boundary-visible objects
#[derive(Default)]
pub struct Registry {
    engines: SlotMap<EngineKey, SharedEngine>,
    entity_managers: SlotMap<EntityManagerKey, SharedEntities>,
    loaders: SlotMap<LoaderKey, SharedLoader>,
}

static REGISTRY: Lazy<Mutex<Registry>> = Lazy::new(|| Mutex::new(Registry::default()));

/// Lock the process-wide registry
pub fn registry() -> parking_lot::MutexGuard<'static, Registry> {
    REGISTRY.lock()
}

impl Registry {
    pub fn insert_engine(&mut self, engine: SharedEngine) -> NativeHandle {
        NativeHandle::from_key(self.engines.insert(engine))
    }

    pub fn engine(&self, handle: NativeHandle) -> Option<SharedEngine> {
        let key: EngineKey = handle.to_key()?;
        self.engines.get(key).cloned()
    }

    pub fn remove_engine(&mut self, handle: NativeHandle) -> Option<SharedEngine> {
        let key: EngineKey = handle.to_key()?;
        self.engines.remove(key)
    }

    pub fn insert_entity_manager(&mut self, entities: SharedEntities) -> NativeHandle {
        NativeHandle::from_key(self.entity_managers.insert(entities))
    }

    pub fn entity_manager(&self, handle: NativeHandle) -> Option<SharedEntities> {
        let key: EntityManagerKey = handle.to_key()?;
        self.entity_managers.get(key).cloned()
    }

    pub fn remove_entity_manager(&mut self, handle: NativeHandle) -> Option<SharedEntities> {
        let key: EntityManagerKey = handle.to_key()?;
        self.entity_managers.remove(key)
    }

    pub fn insert_loader(&mut self, loader: AssetLoader) -> NativeHandle {
        NativeHandle::from_key(self.loaders.insert(Arc::new(Mutex::new(loader))))
    }

    pub fn loader(&self, handle: NativeHandle) -> Option<SharedLoader> {
        let key: LoaderKey = handle.to_key()?;
        self.loaders.get(key).cloned()
    }

    pub fn remove_loader(&mut self, handle: NativeHandle) -> Option<SharedLoader> {
        let key: LoaderKey = handle.to_key()?;
        self.loaders.remove(key)
    }

    pub fn engine_count(&self) -> usize {
        self.engines.len()
    }

    pub fn entity_manager_count(&self) -> usize {
        self.entity_managers.len()
    }

    pub fn loader_count(&self) -> usize {
        self.loaders.len()
    }
}
