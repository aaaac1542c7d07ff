//! # JIT Shader Provider
//!
//! Generates one material template per distinct (constrained) material key,
//! on first use, and caches it for the rest of the provider's life.

use std::collections::HashMap;

use super::key::{constrain_material, AlphaMode, MaterialKey, UvMap, UvSet};
use super::{params, MaterialProvider, MaterialSet};
use crate::engine::{
    AttributeSet, BlendingMode, MaterialDefinition, MaterialHandle, MaterialInstanceHandle,
    Shading, SharedEngine, VertexAttribute,
};
use crate::util::FnvBuildHasher;

/// Material provider that builds a specialized template per key
pub struct JitShaderProvider {
    engine: SharedEngine,
    cache: HashMap<MaterialKey, MaterialHandle, FnvBuildHasher>,
    materials: MaterialSet,
    optimize: bool,
}

impl JitShaderProvider {
    pub fn new(engine: SharedEngine) -> Self {
        Self::with_optimization(engine, false)
    }

    /// `optimize` selects the size-optimized shader variants
    pub fn with_optimization(engine: SharedEngine, optimize: bool) -> Self {
        log::info!("Creating JIT shader provider (optimize: {})", optimize);
        Self {
            engine,
            cache: HashMap::default(),
            materials: MaterialSet::default(),
            optimize,
        }
    }

    /// Distinct templates currently cached
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    fn definition_for(&self, key: &MaterialKey, uvmap: &UvMap) -> MaterialDefinition {
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

        let mut required = AttributeSet::from(VertexAttribute::Position);
        if !key.unlit {
            required = required.with(VertexAttribute::Tangents);
        }
        if key.has_vertex_colors {
            required = required.with(VertexAttribute::Color);
        }
        if uvmap.contains(&UvSet::Uv0) {
            required = required.with(VertexAttribute::Uv0);
        }
        if uvmap.contains(&UvSet::Uv1) {
            required = required.with(VertexAttribute::Uv1);
        }

        MaterialDefinition {
            name: format!("jit_{:016x}", key.digest()),
            shading,
            blending,
            double_sided: key.double_sided,
            required_attributes: required,
            defines: shader_defines(key, self.optimize),
            parameters: params::parameters_for(key),
        }
    }
}

fn shader_defines(key: &MaterialKey, optimize: bool) -> Vec<String> {
    let flags = [
        (key.double_sided, "DOUBLE_SIDED"),
        (key.has_vertex_colors, "HAS_VERTEX_COLOR"),
        (key.has_base_color_texture, "HAS_BASE_COLOR_TEXTURE"),
        (key.has_metallic_roughness_texture, "HAS_METALLIC_ROUGHNESS_TEXTURE"),
        (key.has_normal_texture, "HAS_NORMAL_TEXTURE"),
        (key.has_occlusion_texture, "HAS_OCCLUSION_TEXTURE"),
        (key.has_emissive_texture, "HAS_EMISSIVE_TEXTURE"),
        (key.has_texture_transforms, "HAS_TEXTURE_TRANSFORMS"),
        (key.has_clear_coat, "HAS_CLEAR_COAT"),
        (key.has_clear_coat_texture, "HAS_CLEAR_COAT_TEXTURE"),
        (key.has_clear_coat_roughness_texture, "HAS_CLEAR_COAT_ROUGHNESS_TEXTURE"),
        (key.has_clear_coat_normal_texture, "HAS_CLEAR_COAT_NORMAL_TEXTURE"),
        (key.has_sheen, "HAS_SHEEN"),
        (key.has_sheen_color_texture, "HAS_SHEEN_COLOR_TEXTURE"),
        (key.has_sheen_roughness_texture, "HAS_SHEEN_ROUGHNESS_TEXTURE"),
        (key.has_transmission, "HAS_TRANSMISSION"),
        (key.has_transmission_texture, "HAS_TRANSMISSION_TEXTURE"),
        (key.has_ior, "HAS_IOR"),
        (key.has_volume, "HAS_VOLUME"),
        (key.enable_diagnostics, "DIAGNOSTICS"),
        (optimize, "OPTIMIZED"),
    ];

    let mut defines: Vec<String> = flags
        .iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, name)| name.to_string())
        .collect();

    defines.push(
        match key.alpha_mode {
            AlphaMode::Opaque => "BLEND_MODE_OPAQUE",
            AlphaMode::Mask => "BLEND_MODE_MASKED",
            AlphaMode::Blend => "BLEND_MODE_TRANSPARENT",
        }
        .to_string(),
    );
    defines
}

impl MaterialProvider for JitShaderProvider {
    fn create_material_instance(
        &mut self,
        key: &mut MaterialKey,
        uvmap: &mut UvMap,
        label: Option<&str>,
    ) -> Option<MaterialInstanceHandle> {
        // Lighting extensions have no meaning for unlit shading
        if key.unlit {
            key.strip_extended_features();
            key.has_ior = false;
        }
        *uvmap = constrain_material(key);

        let material = match self.cache.get(key) {
            Some(material) => *material,
            None => {
                let definition = self.definition_for(key, uvmap);
                let material = self.engine.write().create_material(definition);
                self.cache.insert(key.clone(), material);
                self.materials.push(material);
                material
            }
        };

        match self.engine.write().create_material_instance(material, label) {
            Ok(instance) => Some(instance),
            Err(e) => {
                log::error!("Failed to instantiate material {:?}: {}", label, e);
                None
            }
        }
    }

    fn materials(&mut self) -> &[MaterialHandle] {
        self.materials.snapshot()
    }

    fn materials_count(&self) -> usize {
        self.materials.snapshot_len()
    }

    fn destroy_materials(&mut self) {
        self.materials.release(&mut self.engine.write());
        self.cache.clear();
    }

    fn needs_dummy_data(&self, _attribute: VertexAttribute) -> bool {
        false
    }
}
