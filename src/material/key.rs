//! # Material Keys
//!
//! `MaterialKey` describes what a glTF material needs from a shader. Two
//! keys that compare equal must be served by the same material template.

use crate::util::stable_hash;

/// Number of glTF texcoord indices a `UvMap` can route
pub const MAX_UV_INDEX: usize = 8;

/// glTF alpha mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

impl AlphaMode {
    pub const ALL: [AlphaMode; 3] = [AlphaMode::Opaque, AlphaMode::Mask, AlphaMode::Blend];

    /// Name of the matching Java enum constant
    pub fn java_name(&self) -> &'static str {
        match self {
            AlphaMode::Opaque => "OPAQUE",
            AlphaMode::Mask => "MASK",
            AlphaMode::Blend => "BLEND",
        }
    }

    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        Self::ALL.get(usize::try_from(ordinal).ok()?).copied()
    }
}

/// Renderer UV channel a glTF texcoord index is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UvSet {
    #[default]
    Unused,
    Uv0,
    Uv1,
}

impl UvSet {
    pub const ALL: [UvSet; 3] = [UvSet::Unused, UvSet::Uv0, UvSet::Uv1];

    /// The n-th channel handed out, if the renderer has that many
    fn from_rank(rank: usize) -> Option<Self> {
        match rank {
            0 => Some(UvSet::Uv0),
            1 => Some(UvSet::Uv1),
            _ => None,
        }
    }

    pub fn java_name(&self) -> &'static str {
        match self {
            UvSet::Unused => "UNUSED",
            UvSet::Uv0 => "UV0",
            UvSet::Uv1 => "UV1",
        }
    }

    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        Self::ALL.get(usize::try_from(ordinal).ok()?).copied()
    }
}

/// Maps glTF texcoord index to renderer UV channel
pub type UvMap = [UvSet; MAX_UV_INDEX];

/// An all-`Unused` map
pub fn empty_uvmap() -> UvMap {
    [UvSet::Unused; MAX_UV_INDEX]
}

/// Static configuration of a glTF material. The debug label is not part of
/// the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MaterialKey {
    pub double_sided: bool,
    pub unlit: bool,
    pub has_vertex_colors: bool,
    pub has_base_color_texture: bool,
    pub has_normal_texture: bool,
    pub has_occlusion_texture: bool,
    pub has_emissive_texture: bool,
    pub use_specular_glossiness: bool,
    pub alpha_mode: AlphaMode,
    pub enable_diagnostics: bool,
    /// Shared with the specular-glossiness texture
    pub has_metallic_roughness_texture: bool,
    pub metallic_roughness_uv: u8,
    pub base_color_uv: u8,
    pub has_clear_coat_texture: bool,
    pub clear_coat_uv: u8,
    pub has_clear_coat_roughness_texture: bool,
    pub clear_coat_roughness_uv: u8,
    pub has_clear_coat_normal_texture: bool,
    pub clear_coat_normal_uv: u8,
    pub has_clear_coat: bool,
    pub has_transmission: bool,
    pub has_texture_transforms: bool,
    pub emissive_uv: u8,
    pub ao_uv: u8,
    pub normal_uv: u8,
    pub has_transmission_texture: bool,
    pub transmission_uv: u8,
    pub has_sheen_color_texture: bool,
    pub sheen_color_uv: u8,
    pub has_sheen_roughness_texture: bool,
    pub sheen_roughness_uv: u8,
    pub has_sheen: bool,
    pub has_ior: bool,
    pub has_volume: bool,
}

impl MaterialKey {
    /// Stable digest, used to name generated templates
    pub fn digest(&self) -> u64 {
        stable_hash(self)
    }

    /// Whether any clearcoat, sheen, transmission or volume feature is requested
    pub fn has_extended_features(&self) -> bool {
        self.has_clear_coat || self.has_sheen || self.has_transmission || self.has_volume
    }

    /// Clear clearcoat, sheen, transmission and volume along with their
    /// textures
    pub fn strip_extended_features(&mut self) {
        self.has_clear_coat = false;
        self.has_clear_coat_texture = false;
        self.has_clear_coat_roughness_texture = false;
        self.has_clear_coat_normal_texture = false;
        self.has_sheen = false;
        self.has_sheen_color_texture = false;
        self.has_sheen_roughness_texture = false;
        self.has_transmission = false;
        self.has_transmission_texture = false;
        self.has_volume = false;
    }

    /// Texture presence flags paired with their texcoord index, in the
    /// order UV channels are handed out
    pub fn texture_slots_mut(&mut self) -> [(&'static str, &mut bool, &mut u8); 11] {
        [
            ("baseColor", &mut self.has_base_color_texture, &mut self.base_color_uv),
            (
                "metallicRoughness",
                &mut self.has_metallic_roughness_texture,
                &mut self.metallic_roughness_uv,
            ),
            ("normal", &mut self.has_normal_texture, &mut self.normal_uv),
            ("occlusion", &mut self.has_occlusion_texture, &mut self.ao_uv),
            ("emissive", &mut self.has_emissive_texture, &mut self.emissive_uv),
            (
                "transmission",
                &mut self.has_transmission_texture,
                &mut self.transmission_uv,
            ),
            ("clearCoat", &mut self.has_clear_coat_texture, &mut self.clear_coat_uv),
            (
                "clearCoatRoughness",
                &mut self.has_clear_coat_roughness_texture,
                &mut self.clear_coat_roughness_uv,
            ),
            (
                "clearCoatNormal",
                &mut self.has_clear_coat_normal_texture,
                &mut self.clear_coat_normal_uv,
            ),
            (
                "sheenColor",
                &mut self.has_sheen_color_texture,
                &mut self.sheen_color_uv,
            ),
            (
                "sheenRoughness",
                &mut self.has_sheen_roughness_texture,
                &mut self.sheen_roughness_uv,
            ),
        ]
    }

    /// Boolean fields under their Java field names
    pub(crate) fn java_bool_fields_mut(&mut self) -> [(&'static str, &mut bool); 21] {
        [
            ("doubleSided", &mut self.double_sided),
            ("unlit", &mut self.unlit),
            ("hasVertexColors", &mut self.has_vertex_colors),
            ("hasBaseColorTexture", &mut self.has_base_color_texture),
            ("hasNormalTexture", &mut self.has_normal_texture),
            ("hasOcclusionTexture", &mut self.has_occlusion_texture),
            ("hasEmissiveTexture", &mut self.has_emissive_texture),
            ("useSpecularGlossiness", &mut self.use_specular_glossiness),
            ("enableDiagnostics", &mut self.enable_diagnostics),
            ("hasMetallicRoughnessTexture", &mut self.has_metallic_roughness_texture),
            ("hasClearCoatTexture", &mut self.has_clear_coat_texture),
            ("hasClearCoatRoughnessTexture", &mut self.has_clear_coat_roughness_texture),
            ("hasClearCoatNormalTexture", &mut self.has_clear_coat_normal_texture),
            ("hasClearCoat", &mut self.has_clear_coat),
            ("hasTransmission", &mut self.has_transmission),
            ("hasTextureTransforms", &mut self.has_texture_transforms),
            ("hasTransmissionTexture", &mut self.has_transmission_texture),
            ("hasSheenColorTexture", &mut self.has_sheen_color_texture),
            ("hasSheenRoughnessTexture", &mut self.has_sheen_roughness_texture),
            ("hasSheen", &mut self.has_sheen),
            ("hasIOR", &mut self.has_ior),
        ]
    }

    /// Texcoord index fields under their Java field names
    pub(crate) fn java_uv_fields_mut(&mut self) -> [(&'static str, &mut u8); 11] {
        [
            ("metallicRoughnessUV", &mut self.metallic_roughness_uv),
            ("baseColorUV", &mut self.base_color_uv),
            ("clearCoatUV", &mut self.clear_coat_uv),
            ("clearCoatRoughnessUV", &mut self.clear_coat_roughness_uv),
            ("clearCoatNormalUV", &mut self.clear_coat_normal_uv),
            ("emissiveUV", &mut self.emissive_uv),
            ("aoUV", &mut self.ao_uv),
            ("normalUV", &mut self.normal_uv),
            ("transmissionUV", &mut self.transmission_uv),
            ("sheenColorUV", &mut self.sheen_color_uv),
            ("sheenRoughnessUV", &mut self.sheen_roughness_uv),
        ]
    }
}

/// Route every texcoord index the key uses to a renderer UV channel.
///
/// Channels are handed out in first-use order. A texture whose index is out
/// of range, or that would need a third channel, is switched off in the key.
pub fn constrain_material(key: &mut MaterialKey) -> UvMap {
    let mut uvmap = empty_uvmap();
    let mut assigned = 0;

    for (name, present, uv) in key.texture_slots_mut() {
        if !*present {
            continue;
        }

        let index = *uv as usize;
        if index >= MAX_UV_INDEX {
            log::warn!("Dropping {} texture: texcoord index {} out of range", name, index);
            *present = false;
            continue;
        }

        if uvmap[index] != UvSet::Unused {
            continue;
        }

        match UvSet::from_rank(assigned) {
            Some(set) => {
                uvmap[index] = set;
                assigned += 1;
            }
            None => {
                log::warn!(
                    "Dropping {} texture: texcoord {} needs a third UV set",
                    name,
                    index
                );
                *present = false;
            }
        }
    }

    uvmap
}
