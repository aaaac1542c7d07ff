//! # Asset Loader
//!
//! Turns glTF buffers into assets: entity hierarchies plus the material
//! instances a [`MaterialProvider`] supplied for them. Creation entry points
//! return `None` on failure and log the cause; nothing from a failed call
//! stays alive and the loader remains usable.

pub mod asset;
pub mod decode;
pub mod extensions;

use slotmap::SlotMap;

use crate::config::LoaderConfig;
use crate::engine::SharedEngine;
use crate::entities::{NameComponentManager, SharedEntities};
use crate::error::{LoaderError, LoaderResult};
use crate::material::MaterialProvider;

pub use asset::{Aabb, Asset, AssetHandle, AssetInstance, InstanceHandle, NodeEntity, PrimitiveInfo};
pub use decode::Container;
use decode::Decoder;

/// Everything a loader needs at creation
pub struct AssetConfiguration {
    pub engine: SharedEngine,
    pub materials: Box<dyn MaterialProvider>,
    /// Registry for node names; names are not recorded when absent
    pub names: Option<NameComponentManager>,
    pub entities: SharedEntities,
    pub config: LoaderConfig,
}

/// What a destroyed loader hands back to its creator
pub struct LoaderParts {
    pub materials: Box<dyn MaterialProvider>,
    pub names: Option<NameComponentManager>,
}

/// glTF asset loader
pub struct AssetLoader {
    engine: SharedEngine,
    entities: SharedEntities,
    provider: Box<dyn MaterialProvider>,
    names: Option<NameComponentManager>,
    config: LoaderConfig,
    diagnostics: bool,
    assets: SlotMap<AssetHandle, Asset>,
    instances: SlotMap<InstanceHandle, AssetInstance>,
}

impl AssetLoader {
    pub fn create(configuration: AssetConfiguration) -> Self {
        let AssetConfiguration {
            engine,
            materials,
            names,
            entities,
            config,
        } = configuration;

        log::info!(
            "Creating asset loader (diagnostics: {}, max instances: {})",
            config.enable_diagnostics,
            config.max_instances
        );

        Self {
            engine,
            entities,
            provider: materials,
            names,
            diagnostics: config.enable_diagnostics,
            config,
            assets: SlotMap::with_key(),
            instances: SlotMap::with_key(),
        }
    }

    /// Destroy every live asset and return the provider and name registry,
    /// which the loader never frees
    pub fn destroy(mut self) -> LoaderParts {
        let handles: Vec<AssetHandle> = self.assets.keys().collect();
        if !handles.is_empty() {
            log::warn!("Destroying loader with {} live asset(s)", handles.len());
        }
        for handle in handles {
            self.destroy_asset(handle);
        }

        log::info!("Asset loader destroyed");
        LoaderParts {
            materials: self.provider,
            names: self.names,
        }
    }

    /// Load a binary (GLB) asset
    pub fn create_asset_from_binary(&mut self, bytes: &[u8]) -> Option<AssetHandle> {
        report(self.try_create_asset(bytes, Container::Binary))
    }

    /// Load a JSON glTF asset
    pub fn create_asset_from_json(&mut self, bytes: &[u8]) -> Option<AssetHandle> {
        report(self.try_create_asset(bytes, Container::Json))
    }

    /// Load an asset with `count` copies of its node hierarchy. Returns
    /// exactly `count` instance handles on success.
    pub fn create_instanced_asset(
        &mut self,
        bytes: &[u8],
        count: usize,
    ) -> Option<(AssetHandle, Vec<InstanceHandle>)> {
        report(self.try_create_instanced_asset(bytes, count))
    }

    pub fn try_create_asset(&mut self, bytes: &[u8], container: Container) -> LoaderResult<AssetHandle> {
        let _span = tracing::debug_span!("create_asset", bytes = bytes.len(), ?container).entered();
        let (document, raw) = decode::parse(bytes, container)?;
        let root = self.entities.write().create();

        let result = self.decoder(&document, &raw).decode(root, None);
        let decoded = match result {
            Ok(decoded) => decoded,
            Err(e) => {
                self.entities.write().destroy(root);
                return Err(e);
            }
        };

        let asset = Asset {
            root,
            nodes: decoded.nodes,
            instances: Vec::new(),
            material_instances: decoded.material_instances,
            primitives: decoded.primitives,
            bounding_box: decoded.bounding_box,
            resource_uris: decode::resource_uris(&document),
            skin_count: document.skins().count(),
            camera_count: document.nodes().filter(|n| n.camera().is_some()).count(),
            light_count: raw.light_count(),
        };

        log::info!(
            "Created asset: {} node(s), {} primitive(s), {} material instance(s)",
            asset.nodes.len(),
            asset.primitives.len(),
            asset.material_instances.len()
        );
        Ok(self.assets.insert(asset))
    }

    pub fn try_create_instanced_asset(
        &mut self,
        bytes: &[u8],
        count: usize,
    ) -> LoaderResult<(AssetHandle, Vec<InstanceHandle>)> {
        let _span = tracing::debug_span!("create_instanced_asset", bytes = bytes.len(), count).entered();
        let max = self.config.max_instances as usize;
        if count == 0 || count > max {
            return Err(LoaderError::InstanceCount {
                requested: count,
                max,
            });
        }

        let (document, raw) = decode::parse(bytes, Container::Any)?;
        let root = self.entities.write().create();

        let result = self.decoder(&document, &raw).decode(root, Some(count));
        let decoded = match result {
            Ok(decoded) => decoded,
            Err(e) => {
                self.entities.write().destroy(root);
                return Err(e);
            }
        };

        let asset = Asset {
            root,
            nodes: decoded.nodes,
            instances: Vec::with_capacity(count),
            material_instances: decoded.material_instances,
            primitives: decoded.primitives,
            bounding_box: decoded.bounding_box,
            resource_uris: decode::resource_uris(&document),
            skin_count: document.skins().count(),
            camera_count: document.nodes().filter(|n| n.camera().is_some()).count(),
            light_count: raw.light_count(),
        };
        let handle = self.assets.insert(asset);

        let instances: Vec<InstanceHandle> = decoded
            .instance_roots
            .into_iter()
            .map(|(root, entities)| {
                self.instances.insert(AssetInstance {
                    asset: handle,
                    root,
                    entities,
                })
            })
            .collect();

        if let Some(asset) = self.assets.get_mut(handle) {
            asset.instances.clone_from(&instances);
        }

        log::info!("Created instanced asset with {} instance(s)", instances.len());
        Ok((handle, instances))
    }

    /// Destroy an asset, its instances, entities, names and material
    /// instances. Returns false for stale handles.
    pub fn destroy_asset(&mut self, handle: AssetHandle) -> bool {
        let Some(asset) = self.assets.remove(handle) else {
            log::warn!("destroy_asset: stale asset handle {:?}", handle);
            return false;
        };

        for instance in &asset.instances {
            if let Some(instance) = self.instances.remove(*instance) {
                self.entities.write().destroy(instance.root);
            }
        }

        {
            let mut entities = self.entities.write();
            for entity in asset.entities() {
                entities.destroy(entity);
                if let Some(names) = self.names.as_mut() {
                    names.remove(entity);
                }
            }
        }

        let mut engine = self.engine.write();
        for instance in &asset.material_instances {
            if let Err(e) = engine.destroy_material_instance(*instance) {
                log::warn!("Material instance already gone: {}", e);
            }
        }

        log::debug!("Destroyed asset {:?}", handle);
        true
    }

    pub fn enable_diagnostics(&mut self, enable: bool) {
        log::info!("Diagnostics {}", if enable { "enabled" } else { "disabled" });
        self.diagnostics = enable;
    }

    pub fn diagnostics_enabled(&self) -> bool {
        self.diagnostics
    }

    pub fn asset(&self, handle: AssetHandle) -> Option<&Asset> {
        self.assets.get(handle)
    }

    pub fn instance(&self, handle: InstanceHandle) -> Option<&AssetInstance> {
        self.instances.get(handle)
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    pub fn provider(&self) -> &dyn MaterialProvider {
        self.provider.as_ref()
    }

    pub fn provider_mut(&mut self) -> &mut (dyn MaterialProvider + 'static) {
        self.provider.as_mut()
    }

    pub fn names(&self) -> Option<&NameComponentManager> {
        self.names.as_ref()
    }

    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    fn decoder<'a>(
        &'a mut self,
        document: &'a gltf::Document,
        raw: &'a extensions::RawDocument,
    ) -> Decoder<'a> {
        let names = if self.config.register_names {
            self.names.as_mut()
        } else {
            None
        };

        Decoder {
            document,
            raw,
            engine: &self.engine,
            entities: &self.entities,
            names,
            provider: &mut self.provider,
            diagnostics: self.diagnostics,
        }
    }
}

fn report<T>(result: LoaderResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::error!("Asset creation failed: {}", e);
            None
        }
    }
}
