//! # Vertex Attributes
//!
//! Renderer-side vertex attribute slots and the bitset materials use to
//! declare which of them their shaders read.

use bitflags::bitflags;

/// Renderer vertex attribute slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VertexAttribute {
    Position = 0,
    Tangents = 1,
    Color = 2,
    Uv0 = 3,
    Uv1 = 4,
    BoneIndices = 5,
    BoneWeights = 6,
}

impl VertexAttribute {
    pub const ALL: [VertexAttribute; 7] = [
        VertexAttribute::Position,
        VertexAttribute::Tangents,
        VertexAttribute::Color,
        VertexAttribute::Uv0,
        VertexAttribute::Uv1,
        VertexAttribute::BoneIndices,
        VertexAttribute::BoneWeights,
    ];

    /// Attributes a decoder may have to synthesize when the source omits them
    pub const DUMMY_CANDIDATES: [VertexAttribute; 3] = [
        VertexAttribute::Color,
        VertexAttribute::Uv0,
        VertexAttribute::Uv1,
    ];

    /// Constant name in the Java `VertexBuffer.VertexAttribute` enum
    pub fn java_name(&self) -> &'static str {
        match self {
            VertexAttribute::Position => "POSITION",
            VertexAttribute::Tangents => "TANGENTS",
            VertexAttribute::Color => "COLOR",
            VertexAttribute::Uv0 => "UV0",
            VertexAttribute::Uv1 => "UV1",
            VertexAttribute::BoneIndices => "BONE_INDICES",
            VertexAttribute::BoneWeights => "BONE_WEIGHTS",
        }
    }

    /// Map the ordinal used by the Java `VertexBuffer.VertexAttribute` enum
    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| *a as i32 == ordinal)
    }
}

bitflags! {
    /// Set of vertex attributes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AttributeSet: u16 {
        const POSITION = 1 << 0;
        const TANGENTS = 1 << 1;
        const COLOR = 1 << 2;
        const UV0 = 1 << 3;
        const UV1 = 1 << 4;
        const BONE_INDICES = 1 << 5;
        const BONE_WEIGHTS = 1 << 6;
    }
}

impl From<VertexAttribute> for AttributeSet {
    fn from(attribute: VertexAttribute) -> Self {
        AttributeSet::from_bits_truncate(1 << attribute as u16)
    }
}

impl AttributeSet {
    pub fn has(&self, attribute: VertexAttribute) -> bool {
        self.contains(AttributeSet::from(attribute))
    }

    pub fn with(self, attribute: VertexAttribute) -> Self {
        self | AttributeSet::from(attribute)
    }

    /// Iterate the attributes in slot order
    pub fn attributes(&self) -> impl Iterator<Item = VertexAttribute> + '_ {
        VertexAttribute::ALL.iter().copied().filter(move |a| self.has(*a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_bits_match_slots() {
        for attribute in VertexAttribute::ALL {
            let set = AttributeSet::from(attribute);
            assert_eq!(set.bits(), 1 << attribute as u16);
        }
    }

    #[test]
    fn test_set_iteration_order() {
        let set = AttributeSet::empty()
            .with(VertexAttribute::Uv1)
            .with(VertexAttribute::Position)
            .with(VertexAttribute::Color);
        let attributes: Vec<_> = set.attributes().collect();
        assert_eq!(
            attributes,
            vec![VertexAttribute::Position, VertexAttribute::Color, VertexAttribute::Uv1]
        );
    }

    #[test]
    fn test_from_ordinal() {
        assert_eq!(VertexAttribute::from_ordinal(3), Some(VertexAttribute::Uv0));
        assert_eq!(VertexAttribute::from_ordinal(42), None);
    }
}
