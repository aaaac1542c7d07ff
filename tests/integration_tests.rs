//! # Integration Tests
//!
//! End-to-end flows across the engine, loaders, providers and the handle
//! registry the JNI entry points use.

mod common;

use common::*;
use gltfio_native::jni::handles::{self, Registry};
use gltfio_native::jni::NativeHandle;
use gltfio_native::*;

fn jit_loader(engine: &SharedEngine, entities: &SharedEntities, config: LoaderConfig) -> AssetLoader {
    AssetLoader::create(AssetConfiguration {
        engine: engine.clone(),
        materials: Box::new(JitShaderProvider::new(engine.clone())),
        names: Some(NameComponentManager::new()),
        entities: entities.clone(),
        config,
    })
}

#[cfg(test)]
mod library_tests {
    use super::*;

    #[test]
    fn test_initialize_is_idempotent() {
        initialize();
        initialize();
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "gltfio_native");
    }

    #[test]
    fn test_config_from_host_bytes() {
        let config = LoaderConfig::from_bytes(br#"{"maxInstances": 8, "enableDiagnostics": true}"#).unwrap();
        assert_eq!(config.max_instances, 8);
        assert!(config.enable_diagnostics);
        assert!(config.register_names);

        let round = LoaderConfig::from_bytes(&config.to_bytes()).unwrap();
        assert_eq!(round, config);

        assert_eq!(LoaderConfig::from_bytes(b"").unwrap(), LoaderConfig::default());
        assert!(LoaderConfig::from_bytes(b"[1, 2]").is_err());
    }
}

#[cfg(test)]
mod shared_engine_tests {
    use super::*;

    #[test_log::test]
    fn test_loaders_share_engine_and_entities() {
        let engine = Engine::shared();
        let entities = EntityManager::shared();
        let mut first = jit_loader(&engine, &entities, LoaderConfig::default());
        let mut second = jit_loader(&engine, &entities, LoaderConfig::default());

        let a = first.create_asset_from_json(TRIANGLE_JSON.as_bytes()).unwrap();
        let b = second.create_asset_from_binary(&triangle_glb()).unwrap();
        assert_eq!(entities.read().len(), 3 + 2);
        assert_eq!(engine.read().material_instance_count(), 2);

        assert_eq!(first.asset_count(), 1);
        assert_eq!(second.asset_count(), 1);
        assert!(first.asset(a).is_some());

        let parts = first.destroy();
        assert_eq!(entities.read().len(), 2);
        assert!(second.asset(b).is_some());
        drop(parts);

        assert!(second.destroy_asset(b));
        assert!(entities.read().is_empty());
    }

    #[test_log::test]
    fn test_provider_outlives_loader() {
        let engine = Engine::shared();
        let entities = EntityManager::shared();
        let mut loader = jit_loader(&engine, &entities, LoaderConfig::default());
        loader.create_asset_from_json(SHARED_MATERIALS_JSON.as_bytes()).unwrap();

        let LoaderParts { mut materials, .. } = loader.destroy();
        assert_eq!(materials.materials().len(), 2);

        // A new loader can adopt the provider
        let mut adopted = AssetLoader::create(AssetConfiguration {
            engine: engine.clone(),
            materials,
            names: None,
            entities: entities.clone(),
            config: LoaderConfig::default(),
        });
        let handle = adopted.create_asset_from_json(SHARED_MATERIALS_JSON.as_bytes()).unwrap();
        assert_eq!(adopted.provider_mut().materials().len(), 2);
        assert!(adopted.names().is_none());

        assert!(adopted.destroy_asset(handle));
        let mut parts = adopted.destroy();
        parts.materials.destroy_materials();
        assert_eq!(engine.read().material_count(), 0);
    }
}

#[cfg(test)]
mod registry_tests {
    use super::*;

    #[test_log::test]
    fn test_loader_round_trip_through_handles() {
        let mut registry = Registry::default();
        let engine = registry.insert_engine(Engine::shared());
        let entities = registry.insert_entity_manager(EntityManager::shared());

        let shared_engine = registry.engine(engine).unwrap();
        let shared_entities = registry.entity_manager(entities).unwrap();
        let loader = registry.insert_loader(jit_loader(&shared_engine, &shared_entities, LoaderConfig::default()));

        let asset = {
            let shared = registry.loader(loader).unwrap();
            let mut loader = shared.lock();
            loader.create_asset_from_json(TRIANGLE_JSON.as_bytes()).unwrap()
        };
        let asset = NativeHandle::from_key(asset);
        assert!(asset.is_valid());

        let shared = registry.loader(loader).unwrap();
        let key: AssetHandle = asset.to_key().unwrap();
        assert!(shared.lock().destroy_asset(key));
        assert!(!shared.lock().destroy_asset(key));
        drop(shared);

        let removed = registry.remove_loader(loader).unwrap();
        let parts = std::sync::Arc::try_unwrap(removed).ok().unwrap().into_inner().destroy();
        assert_eq!(parts.materials.materials_count(), 0);

        assert!(registry.loader(loader).is_none());
        assert_eq!(registry.loader_count(), 0);
        assert!(shared_entities.read().is_empty());
    }

    #[test]
    fn test_destroyed_engine_handle_is_rejected() {
        let mut registry = Registry::default();
        let engine = registry.insert_engine(Engine::shared());
        let kept = registry.engine(engine).unwrap();

        assert!(registry.remove_engine(engine).is_some());
        assert!(registry.engine(engine).is_none());
        // Loaders holding the engine keep it alive
        assert_eq!(kept.read().material_count(), 0);
    }

    #[test]
    fn test_process_registry_is_shared() {
        let handle = handles::registry().insert_entity_manager(EntityManager::shared());
        assert!(handles::registry().entity_manager(handle).is_some());
        assert!(handles::registry().remove_entity_manager(handle).is_some());
        assert!(handles::registry().entity_manager(handle).is_none());
    }
}
