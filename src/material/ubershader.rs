//! # Ubershader Provider
//!
//! Serves every key from a small, fixed family of prebuilt archetype
//! templates. Features an archetype cannot express are cleared from the
//! incoming key. Archetype shaders read every UV and color channel, so the
//! loader must synthesize the ones an asset lacks.

use std::collections::HashMap;

use super::key::{constrain_material, AlphaMode, MaterialKey, UvMap};
use super::{params, MaterialProvider, MaterialSet};
use crate::config::UbershaderConfig;
use crate::engine::{
    AttributeSet, BlendingMode, MaterialDefinition, MaterialHandle, MaterialInstanceHandle,
    ParamValue, Shading, SharedEngine, VertexAttribute,
};

/// Identifies one prebuilt template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Archetype {
    pub shading: Shading,
    pub blending: BlendingMode,
    pub extended: bool,
}

impl Archetype {
    fn name(&self) -> String {
        let shading = match self.shading {
            Shading::Lit => "lit",
            Shading::Unlit => "unlit",
            Shading::SpecularGlossiness => "specgloss",
        };
        let blending = match self.blending {
            BlendingMode::Opaque => "opaque",
            BlendingMode::Masked => "masked",
            BlendingMode::Transparent => "fade",
        };
        let suffix = if self.extended { "_ext" } else { "" };
        format!("ubershader_{}_{}{}", shading, blending, suffix)
    }

    fn definition(&self) -> MaterialDefinition {
        let mut required = AttributeSet::from(VertexAttribute::Position)
            .with(VertexAttribute::Color)
            .with(VertexAttribute::Uv0)
            .with(VertexAttribute::Uv1);
        if self.shading != Shading::Unlit {
            required = required.with(VertexAttribute::Tangents);
        }

        let core = match self.shading {
            Shading::Lit => params::LIT_CORE,
            Shading::Unlit => params::UNLIT_CORE,
            Shading::SpecularGlossiness => params::SPECULAR_GLOSSINESS_CORE,
        };
        let mut parameters: Vec<String> = core.iter().map(|p| p.to_string()).collect();
        parameters.push(params::ALPHA_CUTOFF.to_string());
        parameters.push(params::DOUBLE_SIDED.to_string());
        if self.extended {
            parameters.extend(params::EXTENDED.iter().map(|p| p.to_string()));
        }

        let mut defines = vec!["UBERSHADER".to_string()];
        if self.extended {
            defines.push("HAS_EXTENDED_FEATURES".to_string());
        }

        MaterialDefinition {
            name: self.name(),
            shading: self.shading,
            blending: self.blending,
            double_sided: false,
            required_attributes: required,
            defines,
            parameters,
        }
    }
}

/// Material provider backed by a fixed archetype family
pub struct UbershaderProvider {
    engine: SharedEngine,
    config: UbershaderConfig,
    archetypes: HashMap<Archetype, MaterialHandle>,
    materials: MaterialSet,
}

impl UbershaderProvider {
    pub fn new(engine: SharedEngine) -> Self {
        Self::with_config(engine, UbershaderConfig::default())
    }

    pub fn with_config(engine: SharedEngine, config: UbershaderConfig) -> Self {
        log::info!(
            "Creating ubershader provider (extensions: {})",
            config.enable_extensions
        );
        Self {
            engine,
            config,
            archetypes: HashMap::new(),
            materials: MaterialSet::default(),
        }
    }

    /// Number of archetype templates built so far
    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    /// Clear what no archetype can honor, then pick the archetype
    fn select_archetype(&self, key: &mut MaterialKey) -> Archetype {
        let supports_extensions =
            self.config.enable_extensions && !key.unlit && !key.use_specular_glossiness;

        if !supports_extensions {
            key.strip_extended_features();
        }
        if key.unlit {
            key.has_ior = false;
        }

        let shading = if key.unlit {
            Shading::Unlit
        } else if key.use_specular_glossiness {
            Shading::SpecularGlossiness
        } else {
            Shading::Lit
        };
        let blending = match key.alpha_mode {
            AlphaMode::Opaque => BlendingMode::Opaque,
            AlphaMode::Mask => BlendingMode::Masked,
            AlphaMode::Blend => BlendingMode::Transparent,
        };

        Archetype {
            shading,
            blending,
            extended: key.has_extended_features(),
        }
    }
}

impl MaterialProvider for UbershaderProvider {
    fn create_material_instance(
        &mut self,
        key: &mut MaterialKey,
        uvmap: &mut UvMap,
        label: Option<&str>,
    ) -> Option<MaterialInstanceHandle> {
        let archetype = self.select_archetype(key);
        *uvmap = constrain_material(key);

        let mut engine = self.engine.write();
        let material = match self.archetypes.get(&archetype) {
            Some(material) => *material,
            None => {
                let material = engine.create_material(archetype.definition());
                self.archetypes.insert(archetype, material);
                self.materials.push(material);
                material
            }
        };

        let instance = match engine.create_material_instance(material, label) {
            Ok(instance) => instance,
            Err(e) => {
                log::error!("Failed to instantiate {}: {}", archetype.name(), e);
                return None;
            }
        };

        if let Err(e) =
            engine.set_parameter(instance, params::DOUBLE_SIDED, ParamValue::Bool(key.double_sided))
        {
            log::warn!("Could not set double-sidedness: {}", e);
        }

        Some(instance)
    }

    fn materials(&mut self) -> &[MaterialHandle] {
        self.materials.snapshot()
    }

    fn materials_count(&self) -> usize {
        self.materials.snapshot_len()
    }

    fn destroy_materials(&mut self) {
        self.materials.release(&mut self.engine.write());
        self.archetypes.clear();
    }

    fn needs_dummy_data(&self, attribute: VertexAttribute) -> bool {
        VertexAttribute::DUMMY_CANDIDATES.contains(&attribute)
    }
}
