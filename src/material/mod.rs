//! # Material Providers
//!
//! The loader does not know how to build shaders. While decoding an asset
//! it asks a [`MaterialProvider`] for one material instance per distinct
//! material configuration. Providers are plain trait objects; the JNI
//! module adapts a Java implementation to the same trait.

pub mod jit;
pub mod key;
pub mod params;
pub mod ubershader;

use crate::engine::{Engine, MaterialHandle, MaterialInstanceHandle, VertexAttribute};
use crate::error::EngineError;

pub use jit::JitShaderProvider;
pub use key::{constrain_material, empty_uvmap, AlphaMode, MaterialKey, UvMap, UvSet, MAX_UV_INDEX};
pub use ubershader::UbershaderProvider;

/// Supplies material instances to the asset loader
pub trait MaterialProvider: Send {
    /// Create or fetch a template for `key`, then derive an instance from it.
    ///
    /// The provider may clear requirements in `key` it cannot honor and
    /// fills `uvmap` with the UV routing it chose. `label` names the
    /// instance and never affects template selection. `None` means no
    /// instance could be made; the caller skips the material.
    fn create_material_instance(
        &mut self,
        key: &mut MaterialKey,
        uvmap: &mut UvMap,
        label: Option<&str>,
    ) -> Option<MaterialInstanceHandle>;

    /// Snapshot of every template created so far. Each call replaces the
    /// previous snapshot.
    fn materials(&mut self) -> &[MaterialHandle];

    /// Length of the most recent [`materials`](Self::materials) snapshot
    fn materials_count(&self) -> usize;

    /// Release every template. The provider stays usable.
    fn destroy_materials(&mut self);

    /// Whether shaders expect `attribute` even when the asset lacks it
    fn needs_dummy_data(&self, attribute: VertexAttribute) -> bool;
}

/// Templates owned by a provider, plus the snapshot last handed out.
/// Templates the engine refused to release while instances still used them
/// wait in `pending` and are retried on every later release.
#[derive(Debug, Default)]
pub(crate) struct MaterialSet {
    live: Vec<MaterialHandle>,
    snapshot: Vec<MaterialHandle>,
    pending: Vec<MaterialHandle>,
}

impl MaterialSet {
    pub fn push(&mut self, material: MaterialHandle) {
        self.live.push(material);
    }

    pub fn snapshot(&mut self) -> &[MaterialHandle] {
        self.snapshot.clone_from(&self.live);
        &self.snapshot
    }

    pub fn snapshot_len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn live_len(&self) -> usize {
        self.live.len()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Destroy every live or pending template in `engine`. Templates still in
    /// use move to `pending`; stale ones are dropped.
    pub fn release(&mut self, engine: &mut Engine) {
        let mut released = 0;
        let mut in_use = Vec::new();
        for material in self.pending.drain(..).chain(self.live.drain(..)) {
            match engine.destroy_material(material) {
                Ok(()) => released += 1,
                Err(e @ EngineError::MaterialInUse { .. }) => {
                    log::warn!("Material release deferred: {}", e);
                    in_use.push(material);
                }
                Err(e) => log::warn!("Material not released: {}", e),
            }
        }
        self.pending = in_use;
        self.snapshot.clear();
        log::debug!(
            "Released {} material template(s), {} still in use",
            released,
            self.pending.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MaterialDefinition;

    #[test]
    fn test_snapshot_is_frozen_until_refreshed() {
        let mut engine = Engine::new();
        let mut set = MaterialSet::default();

        set.push(engine.create_material(MaterialDefinition::default()));
        assert_eq!(set.snapshot().len(), 1);

        set.push(engine.create_material(MaterialDefinition::default()));
        assert_eq!(set.snapshot_len(), 1);
        assert_eq!(set.live_len(), 2);
        assert_eq!(set.snapshot().len(), 2);
    }

    #[test]
    fn test_release_clears_everything() {
        let mut engine = Engine::new();
        let mut set = MaterialSet::default();
        set.push(engine.create_material(MaterialDefinition::default()));
        set.snapshot();

        set.release(&mut engine);
        assert_eq!(set.snapshot_len(), 0);
        assert_eq!(set.live_len(), 0);
        assert_eq!(engine.material_count(), 0);
    }

    #[test]
    fn test_in_use_template_retried_on_next_release() {
        let mut engine = Engine::new();
        let mut set = MaterialSet::default();
        let material = engine.create_material(MaterialDefinition::default());
        set.push(material);
        let instance = engine.create_material_instance(material, Some("held")).unwrap();

        set.release(&mut engine);
        assert_eq!(set.live_len(), 0);
        assert_eq!(set.pending_len(), 1);
        assert!(set.snapshot().is_empty());
        assert_eq!(engine.material_count(), 1);

        engine.destroy_material_instance(instance).unwrap();
        set.release(&mut engine);
        assert_eq!(set.pending_len(), 0);
        assert_eq!(engine.material_count(), 0);
    }
}
