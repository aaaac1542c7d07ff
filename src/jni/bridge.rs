//! # JNI Bridge Implementation
//!
//! Native methods behind the `com.google.android.filament.gltfio` Java
//! classes.
//!
//! ## Function Naming Convention
//!
//! JNI functions must follow this pattern:
//! `Java_<package>_<class>_<method>`
//!
//! For example:
//! `Java_com_google_android_filament_gltfio_AssetLoader_nCreateAssetLoader`
//!
//! ## Failure
//!
//! Nothing here panics or throws. A failed call logs the cause and returns
//! `0` (null handle) or `JNI_FALSE`.

use jni::objects::{JByteArray, JClass, JLongArray, JObject, JString};
use jni::sys::{jboolean, jint, jlong, JNI_FALSE};
use jni::JNIEnv;

use super::buffer::AutoBuffer;
use super::handles::{self, SharedLoader};
use super::provider::JavaMaterialProvider;
use super::types::{from_jboolean, to_jboolean, NativeHandle, TaggedKey};
use crate::config::LoaderConfig;
use crate::engine::{
    BlendingMode, Engine, MaterialDefinition, MaterialHandle, MaterialInstanceHandle, Shading,
    SharedEngine,
};
use crate::entities::{EntityManager, NameComponentManager};
use crate::error::{BridgeError, BridgeResult};
use crate::loader::{AssetConfiguration, AssetHandle, AssetLoader, Container};
use crate::material::params;

// ============================================================================
// LIBRARY
// ============================================================================

/// Initialize logging and the library
#[no_mangle]
pub unsafe extern "system" fn Java_com_google_android_filament_gltfio_Gltfio_nInit(
    _env: JNIEnv,
    _class: JClass,
) {
    crate::initialize();
}

#[no_mangle]
pub unsafe extern "system" fn Java_com_google_android_filament_gltfio_Gltfio_nGetVersion<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> JString<'local> {
    match env.new_string(crate::VERSION) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Failed to create version string: {}", e);
            JString::default()
        }
    }
}

// ============================================================================
// ENGINE
// ============================================================================

#[no_mangle]
pub unsafe extern "system" fn Java_com_google_android_filament_gltfio_Engine_nCreateEngine(
    _env: JNIEnv,
    _class: JClass,
) -> jlong {
    let handle = handles::registry().insert_engine(Engine::shared());
    log::info!("JNI: engine created ({:#x})", handle.0);
    handle.to_jlong()
}

#[no_mangle]
pub unsafe extern "system" fn Java_com_google_android_filament_gltfio_Engine_nDestroyEngine(
    _env: JNIEnv,
    _class: JClass,
    engine: jlong,
) {
    match handles::registry().remove_engine(engine.into()) {
        Some(_) => log::info!("JNI: engine destroyed"),
        None => log::warn!("JNI: nDestroyEngine with invalid handle {:#x}", engine),
    }
}

/// Create a material template. Java providers build their materials here so
/// that `getNativeObject()` has a handle to return.
#[no_mangle]
pub unsafe extern "system" fn Java_com_google_android_filament_gltfio_Engine_nCreateMaterial(
    mut env: JNIEnv,
    _class: JClass,
    engine: jlong,
    name: JString,
    shading: jint,
    blending: jint,
    double_sided: jboolean,
) -> jlong {
    let result = create_material(&mut env, engine, &name, shading, blending, from_jboolean(double_sided));
    handle_or_null("nCreateMaterial", result)
}

#[no_mangle]
pub unsafe extern "system" fn Java_com_google_android_filament_gltfio_Engine_nDestroyMaterial(
    _env: JNIEnv,
    _class: JClass,
    engine: jlong,
    material: jlong,
) -> jboolean {
    let result = shared_engine(engine).and_then(|engine| {
        let material: MaterialHandle = key_of(material, "material")?;
        Ok(engine.write().destroy_material(material)?)
    });
    success("nDestroyMaterial", result)
}

#[no_mangle]
pub unsafe extern "system" fn Java_com_google_android_filament_gltfio_Engine_nCreateMaterialInstance(
    mut env: JNIEnv,
    _class: JClass,
    engine: jlong,
    material: jlong,
    name: JString,
) -> jlong {
    let result = create_material_instance(&mut env, engine, material, &name);
    handle_or_null("nCreateMaterialInstance", result)
}

#[no_mangle]
pub unsafe extern "system" fn Java_com_google_android_filament_gltfio_Engine_nDestroyMaterialInstance(
    _env: JNIEnv,
    _class: JClass,
    engine: jlong,
    instance: jlong,
) -> jboolean {
    let result = shared_engine(engine).and_then(|engine| {
        let instance: MaterialInstanceHandle = key_of(instance, "material instance")?;
        Ok(engine.write().destroy_material_instance(instance)?)
    });
    success("nDestroyMaterialInstance", result)
}

// ============================================================================
// ENTITY MANAGER
// ============================================================================

#[no_mangle]
pub unsafe extern "system" fn Java_com_google_android_filament_gltfio_EntityManager_nCreateEntityManager(
    _env: JNIEnv,
    _class: JClass,
) -> jlong {
    let handle = handles::registry().insert_entity_manager(EntityManager::shared());
    log::info!("JNI: entity manager created ({:#x})", handle.0);
    handle.to_jlong()
}

#[no_mangle]
pub unsafe extern "system" fn Java_com_google_android_filament_gltfio_EntityManager_nDestroyEntityManager(
    _env: JNIEnv,
    _class: JClass,
    entities: jlong,
) {
    match handles::registry().remove_entity_manager(entities.into()) {
        Some(_) => log::info!("JNI: entity manager destroyed"),
        None => log::warn!("JNI: nDestroyEntityManager with invalid handle {:#x}", entities),
    }
}

// ============================================================================
// ASSET LOADER
// ============================================================================

#[no_mangle]
pub unsafe extern "system" fn Java_com_google_android_filament_gltfio_AssetLoader_nCreateAssetLoader(
    mut env: JNIEnv,
    _class: JClass,
    engine: jlong,
    provider: JObject,
    entities: jlong,
) -> jlong {
    log::info!("JNI: nCreateAssetLoader called");
    let result = create_loader(&mut env, engine, &provider, entities, LoaderConfig::default());
    handle_or_null("nCreateAssetLoader", result)
}

/// Same as `nCreateAssetLoader`, with a JSON-encoded `LoaderConfig`
#[no_mangle]
pub unsafe extern "system" fn Java_com_google_android_filament_gltfio_AssetLoader_nCreateAssetLoaderWithConfig(
    mut env: JNIEnv,
    _class: JClass,
    engine: jlong,
    provider: JObject,
    entities: jlong,
    config: JByteArray,
) -> jlong {
    log::info!("JNI: nCreateAssetLoaderWithConfig called");
    let result = read_config(&env, &config)
        .and_then(|config| create_loader(&mut env, engine, &provider, entities, config));
    handle_or_null("nCreateAssetLoaderWithConfig", result)
}

/// Destroy the loader and every asset it still owns. The Java provider is
/// released, not destroyed; its owner frees it separately.
#[no_mangle]
pub unsafe extern "system" fn Java_com_google_android_filament_gltfio_AssetLoader_nDestroyAssetLoader(
    _env: JNIEnv,
    _class: JClass,
    loader: jlong,
) {
    let Some(shared) = handles::registry().remove_loader(loader.into()) else {
        log::warn!("JNI: nDestroyAssetLoader with invalid handle {:#x}", loader);
        return;
    };

    match std::sync::Arc::try_unwrap(shared) {
        Ok(loader) => {
            let parts = loader.into_inner().destroy();
            log::info!(
                "JNI: asset loader destroyed, provider released with {} material(s) in its last snapshot",
                parts.materials.materials_count()
            );
        }
        Err(_) => log::warn!("JNI: asset loader still in use, released by its last user"),
    }
}

#[no_mangle]
pub unsafe extern "system" fn Java_com_google_android_filament_gltfio_AssetLoader_nCreateAssetFromBinary<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    loader: jlong,
    buffer: JObject<'local>,
    remaining: jint,
) -> jlong {
    let result = create_asset(&mut env, loader, buffer, remaining, Container::Binary);
    handle_or_null("nCreateAssetFromBinary", result)
}

#[no_mangle]
pub unsafe extern "system" fn Java_com_google_android_filament_gltfio_AssetLoader_nCreateAssetFromJson<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    loader: jlong,
    buffer: JObject<'local>,
    remaining: jint,
) -> jlong {
    let result = create_asset(&mut env, loader, buffer, remaining, Container::Json);
    handle_or_null("nCreateAssetFromJson", result)
}

/// Create `instances.length` instances. On success every slot of
/// `instances` holds an instance handle; on failure it is left untouched.
#[no_mangle]
pub unsafe extern "system" fn Java_com_google_android_filament_gltfio_AssetLoader_nCreateInstancedAsset<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    loader: jlong,
    buffer: JObject<'local>,
    remaining: jint,
    instances: JLongArray<'local>,
) -> jlong {
    let result = create_instanced_asset(&mut env, loader, buffer, remaining, &instances);
    handle_or_null("nCreateInstancedAsset", result)
}

#[no_mangle]
pub unsafe extern "system" fn Java_com_google_android_filament_gltfio_AssetLoader_nEnableDiagnostics(
    _env: JNIEnv,
    _class: JClass,
    loader: jlong,
    enable: jboolean,
) {
    match shared_loader(loader) {
        Ok(shared) => shared.lock().enable_diagnostics(from_jboolean(enable)),
        Err(e) => log::error!("JNI: nEnableDiagnostics failed: {}", e),
    }
}

#[no_mangle]
pub unsafe extern "system" fn Java_com_google_android_filament_gltfio_AssetLoader_nDestroyAsset(
    _env: JNIEnv,
    _class: JClass,
    loader: jlong,
    asset: jlong,
) {
    let result = shared_loader(loader).and_then(|shared| {
        let asset: AssetHandle = key_of(asset, "asset")?;
        if shared.lock().destroy_asset(asset) {
            Ok(())
        } else {
            Err(BridgeError::InvalidHandle("asset"))
        }
    });
    if let Err(e) = result {
        log::error!("JNI: nDestroyAsset failed: {}", e);
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn create_material(
    env: &mut JNIEnv,
    engine: jlong,
    name: &JString,
    shading: jint,
    blending: jint,
    double_sided: bool,
) -> BridgeResult<NativeHandle> {
    let engine = shared_engine(engine)?;
    let shading = Shading::from_ordinal(shading).ok_or(BridgeError::InvalidOrdinal {
        what: "shading",
        ordinal: shading,
    })?;
    let blending = BlendingMode::from_ordinal(blending).ok_or(BridgeError::InvalidOrdinal {
        what: "blending",
        ordinal: blending,
    })?;
    let name = optional_string(env, name)?.unwrap_or_else(|| "java_material".to_string());

    let material = engine.write().create_material(MaterialDefinition {
        name,
        shading,
        blending,
        double_sided,
        parameters: params::parameters_for_shading(shading),
        ..Default::default()
    });
    Ok(NativeHandle::from_key(material))
}

fn create_material_instance(
    env: &mut JNIEnv,
    engine: jlong,
    material: jlong,
    name: &JString,
) -> BridgeResult<NativeHandle> {
    let engine = shared_engine(engine)?;
    let material: MaterialHandle = key_of(material, "material")?;
    let name = optional_string(env, name)?;
    let instance = engine.write().create_material_instance(material, name.as_deref())?;
    Ok(NativeHandle::from_key(instance))
}

fn create_loader(
    env: &mut JNIEnv,
    engine: jlong,
    provider: &JObject,
    entities: jlong,
    config: LoaderConfig,
) -> BridgeResult<NativeHandle> {
    let engine = shared_engine(engine)?;
    let entities = handles::registry()
        .entity_manager(entities.into())
        .ok_or(BridgeError::InvalidHandle("entity manager"))?;
    let materials = Box::new(JavaMaterialProvider::new(env, provider)?);

    let loader = AssetLoader::create(AssetConfiguration {
        engine,
        materials,
        names: Some(NameComponentManager::new()),
        entities,
        config,
    });
    Ok(handles::registry().insert_loader(loader))
}

fn create_asset<'local>(
    env: &mut JNIEnv<'local>,
    loader: jlong,
    buffer: JObject<'local>,
    remaining: jint,
    container: Container,
) -> BridgeResult<NativeHandle> {
    let shared = shared_loader(loader)?;
    let bytes = AutoBuffer::new(env, buffer, remaining)?;
    let asset = shared.lock().try_create_asset(bytes.data(), container)?;
    Ok(NativeHandle::from_key(asset))
}

fn create_instanced_asset<'local>(
    env: &mut JNIEnv<'local>,
    loader: jlong,
    buffer: JObject<'local>,
    remaining: jint,
    instances: &JLongArray<'local>,
) -> BridgeResult<NativeHandle> {
    if instances.is_null() {
        return Err(BridgeError::NullPointer("instance array"));
    }
    let count = env.get_array_length(instances)?.max(0) as usize;

    let shared = shared_loader(loader)?;
    let bytes = AutoBuffer::new(env, buffer, remaining)?;
    let mut loader = shared.lock();
    let (asset, created) = loader.try_create_instanced_asset(bytes.data(), count)?;

    let raw: Vec<jlong> = created
        .iter()
        .map(|instance| NativeHandle::from_key(*instance).to_jlong())
        .collect();
    if let Err(e) = env.set_long_array_region(instances, 0, &raw) {
        loader.destroy_asset(asset);
        return Err(e.into());
    }
    Ok(NativeHandle::from_key(asset))
}

fn read_config(env: &JNIEnv, config: &JByteArray) -> BridgeResult<LoaderConfig> {
    if config.is_null() {
        return Ok(LoaderConfig::default());
    }
    let bytes = env.convert_byte_array(config)?;
    LoaderConfig::from_bytes(&bytes).map_err(|e| BridgeError::Config(e.to_string()))
}

fn shared_engine(engine: jlong) -> BridgeResult<SharedEngine> {
    handles::registry()
        .engine(engine.into())
        .ok_or(BridgeError::InvalidHandle("engine"))
}

/// The registry lock is released before the caller locks the loader
fn shared_loader(loader: jlong) -> BridgeResult<SharedLoader> {
    handles::registry()
        .loader(loader.into())
        .ok_or(BridgeError::InvalidHandle("asset loader"))
}

fn key_of<K: TaggedKey>(value: jlong, what: &'static str) -> BridgeResult<K> {
    NativeHandle::from_jlong(value)
        .to_key()
        .ok_or(BridgeError::InvalidHandle(what))
}

fn optional_string(env: &mut JNIEnv, value: &JString) -> BridgeResult<Option<String>> {
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(env.get_string(value)?.into()))
}

fn handle_or_null(method: &str, result: BridgeResult<NativeHandle>) -> jlong {
    match result {
        Ok(handle) => handle.to_jlong(),
        Err(e) => {
            log::error!("JNI: {} failed: {}", method, e);
            0
        }
    }
}

fn success(method: &str, result: BridgeResult<()>) -> jboolean {
    match result {
        Ok(()) => to_jboolean(true),
        Err(e) => {
            log::error!("JNI: {} failed: {}", method, e);
            JNI_FALSE
        }
    }
}
