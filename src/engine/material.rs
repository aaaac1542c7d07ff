//! # Materials
//!
//! Material templates and the instances derived from them.

use std::collections::HashMap;

use super::vertex::AttributeSet;
use super::MaterialHandle;

/// Lighting model of a material template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shading {
    #[default]
    Lit,
    Unlit,
    SpecularGlossiness,
}

impl Shading {
    pub const ALL: [Shading; 3] = [Shading::Lit, Shading::Unlit, Shading::SpecularGlossiness];

    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        Self::ALL.get(usize::try_from(ordinal).ok()?).copied()
    }
}

/// How a material's output is combined with the framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendingMode {
    #[default]
    Opaque,
    Masked,
    Transparent,
}

impl BlendingMode {
    pub const ALL: [BlendingMode; 3] = [
        BlendingMode::Opaque,
        BlendingMode::Masked,
        BlendingMode::Transparent,
    ];

    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        Self::ALL.get(usize::try_from(ordinal).ok()?).copied()
    }
}

/// Everything needed to build a material template
#[derive(Debug, Clone, Default)]
pub struct MaterialDefinition {
    pub name: String,
    pub shading: Shading,
    pub blending: BlendingMode,
    pub double_sided: bool,
    pub required_attributes: AttributeSet,
    /// Shader preprocessor defines selecting the variant
    pub defines: Vec<String>,
    /// Parameter names instances may set
    pub parameters: Vec<String>,
}

/// A material template owned by the engine
#[derive(Debug, Clone)]
pub struct Material {
    pub(super) definition: MaterialDefinition,
    pub(super) instance_count: usize,
}

impl Material {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn shading(&self) -> Shading {
        self.definition.shading
    }

    pub fn blending(&self) -> BlendingMode {
        self.definition.blending
    }

    pub fn is_double_sided(&self) -> bool {
        self.definition.double_sided
    }

    pub fn required_attributes(&self) -> AttributeSet {
        self.definition.required_attributes
    }

    pub fn defines(&self) -> &[String] {
        &self.definition.defines
    }

    pub fn has_define(&self, define: &str) -> bool {
        self.definition.defines.iter().any(|d| d == define)
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.definition.parameters.iter().any(|p| p == name)
    }

    pub fn parameters(&self) -> &[String] {
        &self.definition.parameters
    }

    /// Live instances derived from this template
    pub fn instance_count(&self) -> usize {
        self.instance_count
    }
}

/// Value of a material parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Float3([f32; 3]),
    Float4([f32; 4]),
    Int(i32),
    Bool(bool),
}

/// A renderable parameterization of a material template
#[derive(Debug, Clone)]
pub struct MaterialInstance {
    pub(super) material: MaterialHandle,
    pub(super) name: String,
    pub(super) parameters: HashMap<String, ParamValue>,
}

impl MaterialInstance {
    pub fn material(&self) -> MaterialHandle {
        self.material
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter(&self, name: &str) -> Option<ParamValue> {
        self.parameters.get(name).copied()
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }
}
