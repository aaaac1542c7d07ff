//! # Entities
//!
//! Generational entity allocator and the name registry the loader
//! populates from glTF node names.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Scene entity
    pub struct Entity;
}

/// Entity allocator shared between loaders
pub type SharedEntities = Arc<RwLock<EntityManager>>;

/// Allocates and recycles entities
#[derive(Debug, Default)]
pub struct EntityManager {
    entities: SlotMap<Entity, ()>,
}

impl EntityManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedEntities {
        Arc::new(RwLock::new(Self::new()))
    }

    pub fn create(&mut self) -> Entity {
        self.entities.insert(())
    }

    pub fn create_many(&mut self, count: usize) -> Vec<Entity> {
        (0..count).map(|_| self.create()).collect()
    }

    /// Returns false for entities already destroyed
    pub fn destroy(&mut self, entity: Entity) -> bool {
        self.entities.remove(entity).is_some()
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Entity name registry
#[derive(Debug, Default)]
pub struct NameComponentManager {
    names: HashMap<Entity, String>,
}

impl NameComponentManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(&mut self, entity: Entity, name: impl Into<String>) {
        self.names.insert(entity, name.into());
    }

    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.names.get(&entity).map(String::as_str)
    }

    pub fn remove(&mut self, entity: Entity) -> Option<String> {
        self.names.remove(&entity)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destroyed_entity_is_not_alive() {
        let mut manager = EntityManager::new();
        let entity = manager.create();
        assert!(manager.is_alive(entity));

        assert!(manager.destroy(entity));
        assert!(!manager.is_alive(entity));
        assert!(!manager.destroy(entity));
    }

    #[test]
    fn test_recycled_slot_gets_new_generation() {
        let mut manager = EntityManager::new();
        let old = manager.create();
        manager.destroy(old);
        let new = manager.create();

        assert_ne!(old, new);
        assert!(!manager.is_alive(old));
        assert!(manager.is_alive(new));
    }

    #[test]
    fn test_create_many() {
        let mut manager = EntityManager::new();
        let entities = manager.create_many(16);
        assert_eq!(entities.len(), 16);
        assert_eq!(manager.len(), 16);
    }

    #[test]
    fn test_names() {
        let mut manager = EntityManager::new();
        let mut names = NameComponentManager::new();
        let entity = manager.create();

        names.set_name(entity, "Root");
        assert_eq!(names.name(entity), Some("Root"));
        assert_eq!(names.remove(entity).as_deref(), Some("Root"));
        assert!(names.is_empty());
    }
}
