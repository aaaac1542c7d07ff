//! # Asset Decoding
//!
//! Walks a parsed glTF document: asks the material provider for one
//! instance per distinct material configuration, records vertex layouts,
//! and builds entity hierarchies.

use std::collections::HashMap;

use glam::{Mat4, Vec3};
use gltf::Semantic;

use super::asset::{Aabb, NodeEntity, PrimitiveInfo};
use super::extensions::{self as ext, RawDocument};
use crate::engine::{
    AttributeSet, MaterialInstanceHandle, ParamValue, SharedEngine, VertexAttribute,
};
use crate::entities::{Entity, NameComponentManager, SharedEntities};
use crate::error::{LoaderError, LoaderResult};
use crate::material::{params, AlphaMode, MaterialKey, MaterialProvider, UvMap, UvSet};

const GLB_MAGIC: &[u8; 4] = b"glTF";

/// Which container a creation entry point accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Binary,
    Json,
    Any,
}

pub fn is_glb(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && &bytes[..4] == GLB_MAGIC
}

/// Parse and validate a buffer. Nothing is created unless this succeeds.
pub fn parse(bytes: &[u8], container: Container) -> LoaderResult<(gltf::Document, RawDocument)> {
    if bytes.is_empty() {
        return Err(LoaderError::EmptyBuffer);
    }

    let binary = is_glb(bytes);
    match container {
        Container::Binary if !binary => return Err(LoaderError::NotBinary),
        Container::Json if binary => return Err(LoaderError::NotJson),
        _ => {}
    }

    let gltf = gltf::Gltf::from_slice(bytes)?;
    check_node_graph(&gltf.document)?;
    let raw = if binary {
        let glb = gltf::Glb::from_slice(bytes)?;
        RawDocument::parse(&glb.json)?
    } else {
        RawDocument::parse(bytes)?
    };

    Ok((gltf.document, raw))
}

/// Reject node graphs where a node is reachable from one of its children
fn check_node_graph(document: &gltf::Document) -> LoaderResult<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unseen,
        Open,
        Done,
    }

    let mut marks = vec![Mark::Unseen; document.nodes().count()];
    for start in document.nodes() {
        if marks[start.index()] != Mark::Unseen {
            continue;
        }

        marks[start.index()] = Mark::Open;
        let mut stack = vec![(start.index(), start.children())];
        loop {
            let next = match stack.last_mut() {
                Some((_, children)) => children.next(),
                None => break,
            };
            match next {
                Some(child) => match marks[child.index()] {
                    Mark::Open => return Err(LoaderError::NodeCycle { node: child.index() }),
                    Mark::Done => {}
                    Mark::Unseen => {
                        marks[child.index()] = Mark::Open;
                        stack.push((child.index(), child.children()));
                    }
                },
                None => {
                    if let Some((index, _)) = stack.pop() {
                        marks[index] = Mark::Done;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Material instance chosen for a (material index, vertex colors) pair
#[derive(Debug, Clone, Copy)]
struct MaterialEntry {
    instance: Option<MaterialInstanceHandle>,
    uvmap: UvMap,
}

/// Everything the decoder produced for one creation call
#[derive(Debug, Default)]
pub struct Decoded {
    pub nodes: Vec<NodeEntity>,
    pub instance_roots: Vec<(Entity, Vec<Entity>)>,
    pub material_instances: Vec<MaterialInstanceHandle>,
    pub primitives: Vec<PrimitiveInfo>,
    pub bounding_box: Aabb,
}

pub struct Decoder<'a> {
    pub document: &'a gltf::Document,
    pub raw: &'a RawDocument,
    pub engine: &'a SharedEngine,
    pub entities: &'a SharedEntities,
    pub names: Option<&'a mut NameComponentManager>,
    pub provider: &'a mut Box<dyn MaterialProvider>,
    pub diagnostics: bool,
}

impl<'a> Decoder<'a> {
    /// Root nodes of the default scene, else of the first scene, else every
    /// node that is nobody's child
    pub fn scene_roots(&self) -> Vec<gltf::Node<'a>> {
        let document = self.document;
        if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
            return scene.nodes().collect();
        }

        let mut is_child = vec![false; document.nodes().count()];
        for node in document.nodes() {
            for child in node.children() {
                is_child[child.index()] = true;
            }
        }
        document
            .nodes()
            .filter(|node| !is_child[node.index()])
            .collect()
    }

    /// Build the asset below `root`. `instances` is `None` for a plain
    /// asset, or the number of node hierarchies to create.
    pub fn decode(mut self, root: Entity, instances: Option<usize>) -> LoaderResult<Decoded> {
        let roots = self.scene_roots();
        if roots.is_empty() {
            return Err(LoaderError::NoNodes);
        }

        let mut decoded = Decoded::default();
        let materials = self.create_materials(&mut decoded.material_instances);
        decoded.primitives = self.describe_primitives(&materials);

        match instances {
            None => {
                decoded.bounding_box = self.build_hierarchy(root, &roots, &mut decoded.nodes);
            }
            Some(count) => {
                for _ in 0..count {
                    let instance_root = self.entities.write().create();
                    let first = decoded.nodes.len();
                    let bounds = self.build_hierarchy(instance_root, &roots, &mut decoded.nodes);
                    decoded.bounding_box = bounds;

                    let mut entities = vec![instance_root];
                    entities.extend(decoded.nodes[first..].iter().map(|n| n.entity));
                    decoded.instance_roots.push((instance_root, entities));
                }
            }
        }

        Ok(decoded)
    }

    fn create_materials(
        &mut self,
        owned: &mut Vec<MaterialInstanceHandle>,
    ) -> HashMap<(Option<usize>, bool), MaterialEntry> {
        let mut cache = HashMap::new();

        for mesh in self.document.meshes() {
            for primitive in mesh.primitives() {
                let material = primitive.material();
                let vertex_colors = primitive.get(&Semantic::Colors(0)).is_some();
                let cache_key = (material.index(), vertex_colors);
                if cache.contains_key(&cache_key) {
                    continue;
                }

                let mut key = self.material_key(&material, vertex_colors);
                let mut uvmap = [UvSet::Unused; crate::material::MAX_UV_INDEX];
                let label = material
                    .name()
                    .map(str::to_string)
                    .or_else(|| material.index().map(|i| format!("material_{}", i)));

                let instance =
                    self.provider
                        .create_material_instance(&mut key, &mut uvmap, label.as_deref());

                match instance {
                    Some(instance) => {
                        self.apply_factors(instance, &material);
                        owned.push(instance);
                        if self.diagnostics {
                            log::info!("Material {:?} -> {:?} ({:?})", label, instance, key);
                        }
                    }
                    None => {
                        log::warn!(
                            "Provider returned no instance for material {:?}, primitives will render without it",
                            label
                        );
                    }
                }

                cache.insert(cache_key, MaterialEntry { instance, uvmap });
            }
        }

        cache
    }

    fn material_key(&self, material: &gltf::Material, vertex_colors: bool) -> MaterialKey {
        let index = material.index();
        let pbr = material.pbr_metallic_roughness();
        let uv = |tex_coord: u32| u8::try_from(tex_coord).unwrap_or(u8::MAX);

        let mut key = MaterialKey {
            double_sided: material.double_sided(),
            unlit: self.raw.material_extension(index, ext::UNLIT).is_some(),
            has_vertex_colors: vertex_colors,
            alpha_mode: match material.alpha_mode() {
                gltf::material::AlphaMode::Opaque => AlphaMode::Opaque,
                gltf::material::AlphaMode::Mask => AlphaMode::Mask,
                gltf::material::AlphaMode::Blend => AlphaMode::Blend,
            },
            enable_diagnostics: self.diagnostics,
            has_texture_transforms: self.raw.uses_texture_transforms(index),
            ..Default::default()
        };

        if let Some(info) = pbr.base_color_texture() {
            key.has_base_color_texture = true;
            key.base_color_uv = uv(info.tex_coord());
        }
        if let Some(info) = pbr.metallic_roughness_texture() {
            key.has_metallic_roughness_texture = true;
            key.metallic_roughness_uv = uv(info.tex_coord());
        }
        if let Some(info) = material.normal_texture() {
            key.has_normal_texture = true;
            key.normal_uv = uv(info.tex_coord());
        }
        if let Some(info) = material.occlusion_texture() {
            key.has_occlusion_texture = true;
            key.ao_uv = uv(info.tex_coord());
        }
        if let Some(info) = material.emissive_texture() {
            key.has_emissive_texture = true;
            key.emissive_uv = uv(info.tex_coord());
        }

        if let Some(sg) = self.raw.material_extension(index, ext::SPECULAR_GLOSSINESS) {
            key.use_specular_glossiness = true;
            if let Some(tc) = ext::texture_uv(sg, "diffuseTexture") {
                key.has_base_color_texture = true;
                key.base_color_uv = tc;
            }
            if let Some(tc) = ext::texture_uv(sg, "specularGlossinessTexture") {
                key.has_metallic_roughness_texture = true;
                key.metallic_roughness_uv = tc;
            }
        }

        if let Some(cc) = self.raw.material_extension(index, ext::CLEARCOAT) {
            key.has_clear_coat = true;
            if let Some(tc) = ext::texture_uv(cc, "clearcoatTexture") {
                key.has_clear_coat_texture = true;
                key.clear_coat_uv = tc;
            }
            if let Some(tc) = ext::texture_uv(cc, "clearcoatRoughnessTexture") {
                key.has_clear_coat_roughness_texture = true;
                key.clear_coat_roughness_uv = tc;
            }
            if let Some(tc) = ext::texture_uv(cc, "clearcoatNormalTexture") {
                key.has_clear_coat_normal_texture = true;
                key.clear_coat_normal_uv = tc;
            }
        }

        if let Some(sheen) = self.raw.material_extension(index, ext::SHEEN) {
            key.has_sheen = true;
            if let Some(tc) = ext::texture_uv(sheen, "sheenColorTexture") {
                key.has_sheen_color_texture = true;
                key.sheen_color_uv = tc;
            }
            if let Some(tc) = ext::texture_uv(sheen, "sheenRoughnessTexture") {
                key.has_sheen_roughness_texture = true;
                key.sheen_roughness_uv = tc;
            }
        }

        if let Some(transmission) = self.raw.material_extension(index, ext::TRANSMISSION) {
            key.has_transmission = true;
            if let Some(tc) = ext::texture_uv(transmission, "transmissionTexture") {
                key.has_transmission_texture = true;
                key.transmission_uv = tc;
            }
        }

        key.has_ior = self.raw.material_extension(index, ext::IOR).is_some();
        key.has_volume = self.raw.material_extension(index, ext::VOLUME).is_some();
        key
    }

    /// Copy glTF factors into the instance, skipping parameters its
    /// template does not declare
    fn apply_factors(&self, instance: MaterialInstanceHandle, material: &gltf::Material) {
        let index = material.index();
        let pbr = material.pbr_metallic_roughness();
        let sg = self.raw.material_extension(index, ext::SPECULAR_GLOSSINESS);
        let cc = self.raw.material_extension(index, ext::CLEARCOAT);
        let sheen = self.raw.material_extension(index, ext::SHEEN);
        let transmission = self.raw.material_extension(index, ext::TRANSMISSION);
        let ior = self.raw.material_extension(index, ext::IOR);
        let volume = self.raw.material_extension(index, ext::VOLUME);

        let base_color = match sg {
            Some(_) => ext::float4(sg, "diffuseFactor", [1.0; 4]),
            None => pbr.base_color_factor(),
        };

        let values = [
            (params::BASE_COLOR_FACTOR, ParamValue::Float4(base_color)),
            (params::METALLIC_FACTOR, ParamValue::Float(pbr.metallic_factor())),
            (params::ROUGHNESS_FACTOR, ParamValue::Float(pbr.roughness_factor())),
            (
                params::SPECULAR_FACTOR,
                ParamValue::Float3(ext::float3(sg, "specularFactor", [1.0; 3])),
            ),
            (
                params::GLOSSINESS_FACTOR,
                ParamValue::Float(ext::float(sg, "glossinessFactor", 1.0)),
            ),
            (params::EMISSIVE_FACTOR, ParamValue::Float3(material.emissive_factor())),
            (
                params::NORMAL_SCALE,
                ParamValue::Float(material.normal_texture().map_or(1.0, |t| t.scale())),
            ),
            (
                params::AO_STRENGTH,
                ParamValue::Float(material.occlusion_texture().map_or(1.0, |t| t.strength())),
            ),
            (
                params::ALPHA_CUTOFF,
                ParamValue::Float(material.alpha_cutoff().unwrap_or(0.5)),
            ),
            (
                params::CLEAR_COAT_FACTOR,
                ParamValue::Float(ext::float(cc, "clearcoatFactor", 0.0)),
            ),
            (
                params::CLEAR_COAT_ROUGHNESS_FACTOR,
                ParamValue::Float(ext::float(cc, "clearcoatRoughnessFactor", 0.0)),
            ),
            (
                params::SHEEN_COLOR_FACTOR,
                ParamValue::Float3(ext::float3(sheen, "sheenColorFactor", [0.0; 3])),
            ),
            (
                params::SHEEN_ROUGHNESS_FACTOR,
                ParamValue::Float(ext::float(sheen, "sheenRoughnessFactor", 0.0)),
            ),
            (
                params::TRANSMISSION_FACTOR,
                ParamValue::Float(ext::float(transmission, "transmissionFactor", 0.0)),
            ),
            (params::IOR, ParamValue::Float(ext::float(ior, "ior", 1.5))),
            (
                params::THICKNESS_FACTOR,
                ParamValue::Float(ext::float(volume, "thicknessFactor", 0.0)),
            ),
        ];

        let mut engine = self.engine.write();
        let declared: Vec<&str> = match engine
            .material_instance(instance)
            .and_then(|mi| engine.material(mi.material()))
        {
            Some(template) => values
                .iter()
                .map(|(name, _)| *name)
                .filter(|name| template.has_parameter(name))
                .collect(),
            None => {
                log::warn!("Provider returned a stale material instance {:?}", instance);
                return;
            }
        };

        for (name, value) in values.iter().filter(|(name, _)| declared.contains(name)) {
            if let Err(e) = engine.set_parameter(instance, name, *value) {
                log::debug!("Skipping parameter {}: {}", name, e);
            }
        }
    }

    fn describe_primitives(
        &self,
        materials: &HashMap<(Option<usize>, bool), MaterialEntry>,
    ) -> Vec<PrimitiveInfo> {
        let mut out = Vec::new();

        for mesh in self.document.meshes() {
            for primitive in mesh.primitives() {
                let vertex_colors = primitive.get(&Semantic::Colors(0)).is_some();
                let entry = materials
                    .get(&(primitive.material().index(), vertex_colors))
                    .copied()
                    .unwrap_or(MaterialEntry {
                        instance: None,
                        uvmap: [UvSet::Unused; crate::material::MAX_UV_INDEX],
                    });

                let mut attributes = AttributeSet::empty();
                let mut vertex_count = 0;
                for (semantic, accessor) in primitive.attributes() {
                    let attribute = match semantic {
                        Semantic::Positions => {
                            vertex_count = accessor.count();
                            Some(VertexAttribute::Position)
                        }
                        Semantic::Normals | Semantic::Tangents => Some(VertexAttribute::Tangents),
                        Semantic::Colors(0) => Some(VertexAttribute::Color),
                        Semantic::TexCoords(set) => match entry.uvmap.get(set as usize) {
                            Some(UvSet::Uv0) => Some(VertexAttribute::Uv0),
                            Some(UvSet::Uv1) => Some(VertexAttribute::Uv1),
                            _ => None,
                        },
                        Semantic::Joints(0) => Some(VertexAttribute::BoneIndices),
                        Semantic::Weights(0) => Some(VertexAttribute::BoneWeights),
                        _ => None,
                    };
                    if let Some(attribute) = attribute {
                        attributes = attributes.with(attribute);
                    }
                }

                let mut dummy_attributes = AttributeSet::empty();
                for attribute in VertexAttribute::DUMMY_CANDIDATES {
                    if !attributes.has(attribute) && self.provider.needs_dummy_data(attribute) {
                        dummy_attributes = dummy_attributes.with(attribute);
                    }
                }

                if self.diagnostics {
                    log::info!(
                        "Mesh {} primitive {}: attributes {:?}, dummy {:?}",
                        mesh.index(),
                        primitive.index(),
                        attributes,
                        dummy_attributes
                    );
                }

                out.push(PrimitiveInfo {
                    mesh: mesh.index(),
                    primitive: primitive.index(),
                    material: entry.instance,
                    uvmap: entry.uvmap,
                    attributes,
                    dummy_attributes,
                    vertex_count,
                    index_count: primitive.indices().map(|a| a.count()),
                    morph_targets: primitive.morph_targets().count(),
                });
            }
        }

        out
    }

    /// Create entities for `roots` and their descendants below `parent`.
    /// Returns the bounds of every mesh in world space.
    fn build_hierarchy(
        &mut self,
        parent: Entity,
        roots: &[gltf::Node<'a>],
        nodes: &mut Vec<NodeEntity>,
    ) -> Aabb {
        let mut bounds = Aabb::EMPTY;
        let mut stack: Vec<(gltf::Node<'a>, Entity, Mat4)> = roots
            .iter()
            .rev()
            .map(|node| (node.clone(), parent, Mat4::IDENTITY))
            .collect();

        while let Some((node, parent, parent_transform)) = stack.pop() {
            let world = parent_transform * Mat4::from_cols_array_2d(&node.transform().matrix());
            let entity = self.entities.write().create();

            if let (Some(names), Some(name)) = (self.names.as_deref_mut(), node.name()) {
                names.set_name(entity, name);
            }

            if let Some(mesh) = node.mesh() {
                for primitive in mesh.primitives() {
                    if let Some(local) = primitive
                        .get(&Semantic::Positions)
                        .and_then(|accessor| accessor_bounds(&accessor))
                    {
                        bounds.union(&local.transformed(&world));
                    }
                }
            }

            nodes.push(NodeEntity {
                entity,
                parent,
                node: node.index(),
                mesh: node.mesh().map(|m| m.index()),
                world_transform: world,
            });

            let children: Vec<_> = node.children().collect();
            for child in children.into_iter().rev() {
                stack.push((child, entity, world));
            }
        }

        bounds
    }
}

fn accessor_bounds(accessor: &gltf::Accessor) -> Option<Aabb> {
    let min = ext::floats::<3>(accessor.min().as_ref())?;
    let max = ext::floats::<3>(accessor.max().as_ref())?;
    Some(Aabb::new(Vec3::from_array(min), Vec3::from_array(max)))
}

/// External buffer and image URIs, in document order
pub fn resource_uris(document: &gltf::Document) -> Vec<String> {
    let buffers = document.buffers().filter_map(|buffer| match buffer.source() {
        gltf::buffer::Source::Uri(uri) => Some(uri),
        gltf::buffer::Source::Bin => None,
    });
    let images = document.images().filter_map(|image| match image.source() {
        gltf::image::Source::Uri { uri, .. } => Some(uri),
        gltf::image::Source::View { .. } => None,
    });

    buffers
        .chain(images)
        .filter(|uri| !uri.starts_with("data:"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_detection() {
        assert!(is_glb(b"glTF\x02\x00\x00\x00"));
        assert!(!is_glb(b"{\"asset\":{}}"));
        assert!(!is_glb(b"gl"));
    }

    #[test]
    fn test_empty_buffer_rejected() {
        assert!(matches!(parse(b"", Container::Any), Err(LoaderError::EmptyBuffer)));
    }

    #[test]
    fn test_container_mismatch() {
        let json = br#"{"asset":{"version":"2.0"}}"#;
        assert!(matches!(parse(json, Container::Binary), Err(LoaderError::NotBinary)));
        assert!(parse(json, Container::Json).is_ok());

        assert!(matches!(
            parse(b"glTF\x02\x00\x00\x00", Container::Json),
            Err(LoaderError::NotJson)
        ));
    }

    #[test]
    fn test_node_cycle_rejected() {
        let json = br#"{
            "asset": { "version": "2.0" },
            "nodes": [ { "children": [1] }, { "children": [2] }, { "children": [0] } ]
        }"#;
        assert!(matches!(
            parse(json, Container::Json),
            Err(LoaderError::NodeCycle { .. })
        ));

        let self_parent = br#"{
            "asset": { "version": "2.0" },
            "nodes": [ { "children": [0] } ]
        }"#;
        assert!(matches!(
            parse(self_parent, Container::Json),
            Err(LoaderError::NodeCycle { node: 0 })
        ));
    }

    #[test]
    fn test_deep_chain_accepted() {
        let json = br#"{
            "asset": { "version": "2.0" },
            "scenes": [ { "nodes": [0] } ],
            "nodes": [ { "children": [1, 2] }, { "children": [2] }, {} ]
        }"#;
        assert!(parse(json, Container::Json).is_ok());
    }

    #[test]
    fn test_truncated_glb_fails_to_parse() {
        assert!(matches!(
            parse(b"glTF\x02\x00\x00\x00\xff\x00\x00\x00", Container::Binary),
            Err(LoaderError::Parse(_))
        ));
    }
}
