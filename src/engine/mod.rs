//! # Engine
//!
//! Owns material templates and material instances. Both live in
//! generational arenas so a destroyed handle can never reach a reused slot.

pub mod material;
pub mod vertex;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use slotmap::{new_key_type, SlotMap};

use crate::error::{EngineError, EngineResult};

pub use material::{
    BlendingMode, Material, MaterialDefinition, MaterialInstance, ParamValue, Shading,
};
pub use vertex::{AttributeSet, VertexAttribute};

new_key_type! {
    /// Handle to a material template
    pub struct MaterialHandle;
    /// Handle to a material instance
    pub struct MaterialInstanceHandle;
}

/// Engine shared between a loader and its material provider
pub type SharedEngine = Arc<RwLock<Engine>>;

/// Material arenas
#[derive(Debug, Default)]
pub struct Engine {
    materials: SlotMap<MaterialHandle, Material>,
    instances: SlotMap<MaterialInstanceHandle, MaterialInstance>,
}

impl Engine {
    /// Create an empty engine
    pub fn new() -> Self {
        log::info!("Creating engine");
        Self::default()
    }

    /// Create an engine wrapped for sharing
    pub fn shared() -> SharedEngine {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Register a new material template
    pub fn create_material(&mut self, definition: MaterialDefinition) -> MaterialHandle {
        log::debug!(
            "Creating material '{}' ({:?}, {:?})",
            definition.name,
            definition.shading,
            definition.blending
        );
        self.materials.insert(Material {
            definition,
            instance_count: 0,
        })
    }

    /// Derive an instance from a template
    pub fn create_material_instance(
        &mut self,
        material: MaterialHandle,
        name: Option<&str>,
    ) -> EngineResult<MaterialInstanceHandle> {
        let template = self
            .materials
            .get_mut(material)
            .ok_or(EngineError::StaleHandle("material"))?;
        template.instance_count += 1;

        let name = name.unwrap_or(&template.definition.name).to_string();
        Ok(self.instances.insert(MaterialInstance {
            material,
            name,
            parameters: HashMap::new(),
        }))
    }

    /// Destroy a template. Fails while instances derived from it are alive.
    pub fn destroy_material(&mut self, material: MaterialHandle) -> EngineResult<()> {
        let template = self
            .materials
            .get(material)
            .ok_or(EngineError::StaleHandle("material"))?;

        if template.instance_count > 0 {
            return Err(EngineError::MaterialInUse {
                name: template.definition.name.clone(),
                instances: template.instance_count,
            });
        }

        self.materials.remove(material);
        Ok(())
    }

    pub fn destroy_material_instance(&mut self, instance: MaterialInstanceHandle) -> EngineResult<()> {
        let removed = self
            .instances
            .remove(instance)
            .ok_or(EngineError::StaleHandle("material instance"))?;

        if let Some(template) = self.materials.get_mut(removed.material) {
            template.instance_count -= 1;
        }
        Ok(())
    }

    pub fn material(&self, material: MaterialHandle) -> Option<&Material> {
        self.materials.get(material)
    }

    pub fn material_instance(&self, instance: MaterialInstanceHandle) -> Option<&MaterialInstance> {
        self.instances.get(instance)
    }

    /// Set a parameter declared by the instance's template
    pub fn set_parameter(
        &mut self,
        instance: MaterialInstanceHandle,
        name: &str,
        value: ParamValue,
    ) -> EngineResult<()> {
        let target = self
            .instances
            .get_mut(instance)
            .ok_or(EngineError::StaleHandle("material instance"))?;
        let template = self
            .materials
            .get(target.material)
            .ok_or(EngineError::StaleHandle("material"))?;

        if !template.has_parameter(name) {
            return Err(EngineError::UnknownParameter {
                material: template.definition.name.clone(),
                parameter: name.to_string(),
            });
        }

        target.parameters.insert(name.to_string(), value);
        Ok(())
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn material_instance_count(&self) -> usize {
        self.instances.len()
    }
}
