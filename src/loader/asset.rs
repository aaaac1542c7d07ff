//! # Assets
//!
//! What the loader hands back: entity hierarchies, the material instances
//! an asset owns, and per-primitive vertex layout information.

use glam::{Mat4, Vec3};
use slotmap::new_key_type;

use crate::engine::{AttributeSet, MaterialInstanceHandle};
use crate::entities::Entity;
use crate::material::UvMap;

new_key_type! {
    /// Handle to a loaded asset
    pub struct AssetHandle;
    /// Handle to one instance of an instanced asset
    pub struct InstanceHandle;
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(&mut self, other: &Aabb) {
        if !other.is_empty() {
            self.extend(other.min);
            self.extend(other.max);
        }
    }

    /// Bounds of the eight transformed corners
    pub fn transformed(&self, transform: &Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let mut out = Aabb::EMPTY;
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            out.extend(transform.transform_point3(corner));
        }
        out
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
}

/// Layout and material of one mesh primitive
#[derive(Debug, Clone)]
pub struct PrimitiveInfo {
    pub mesh: usize,
    pub primitive: usize,
    pub material: Option<MaterialInstanceHandle>,
    pub uvmap: UvMap,
    /// Attributes the source asset provides
    pub attributes: AttributeSet,
    /// Attributes the decoder must fill with placeholder data
    pub dummy_attributes: AttributeSet,
    pub vertex_count: usize,
    pub index_count: Option<usize>,
    pub morph_targets: usize,
}

/// Entity created for a glTF node
#[derive(Debug, Clone, Copy)]
pub struct NodeEntity {
    pub entity: Entity,
    pub parent: Entity,
    pub node: usize,
    pub mesh: Option<usize>,
    pub world_transform: Mat4,
}

/// A decoded glTF asset
#[derive(Debug)]
pub struct Asset {
    pub(crate) root: Entity,
    pub(crate) nodes: Vec<NodeEntity>,
    pub(crate) instances: Vec<InstanceHandle>,
    pub(crate) material_instances: Vec<MaterialInstanceHandle>,
    pub(crate) primitives: Vec<PrimitiveInfo>,
    pub(crate) bounding_box: Aabb,
    pub(crate) resource_uris: Vec<String>,
    pub(crate) skin_count: usize,
    pub(crate) camera_count: usize,
    pub(crate) light_count: usize,
}

impl Asset {
    /// Entity every node (or instance root) hangs from
    pub fn root(&self) -> Entity {
        self.root
    }

    /// Every entity owned by the asset, root first
    pub fn entities(&self) -> Vec<Entity> {
        std::iter::once(self.root)
            .chain(self.nodes.iter().map(|n| n.entity))
            .collect()
    }

    pub fn nodes(&self) -> &[NodeEntity] {
        &self.nodes
    }

    /// Node entities that carry a mesh
    pub fn renderables(&self) -> impl Iterator<Item = Entity> + '_ {
        self.nodes
            .iter()
            .filter(|n| n.mesh.is_some())
            .map(|n| n.entity)
    }

    pub fn instances(&self) -> &[InstanceHandle] {
        &self.instances
    }

    pub fn is_instanced(&self) -> bool {
        !self.instances.is_empty()
    }

    pub fn material_instances(&self) -> &[MaterialInstanceHandle] {
        &self.material_instances
    }

    pub fn primitives(&self) -> &[PrimitiveInfo] {
        &self.primitives
    }

    /// Bounds of one instance in asset space
    pub fn bounding_box(&self) -> Aabb {
        self.bounding_box
    }

    /// External buffer and image URIs a resource loader must fetch
    pub fn resource_uris(&self) -> &[String] {
        &self.resource_uris
    }

    pub fn skin_count(&self) -> usize {
        self.skin_count
    }

    pub fn camera_count(&self) -> usize {
        self.camera_count
    }

    pub fn light_count(&self) -> usize {
        self.light_count
    }
}

/// One copy of an instanced asset's node hierarchy
#[derive(Debug)]
pub struct AssetInstance {
    pub(crate) asset: AssetHandle,
    pub(crate) root: Entity,
    pub(crate) entities: Vec<Entity>,
}

impl AssetInstance {
    pub fn asset(&self) -> AssetHandle {
        self.asset
    }

    pub fn root(&self) -> Entity {
        self.root
    }

    /// Root followed by this instance's node entities
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }
}
