//! # Java Material Provider
//!
//! Adapts a Java `MaterialProvider` to the native [`MaterialProvider`]
//! trait. Keys and UV maps are copied into Java objects for each call and
//! copied back afterwards, since the Java side may relax the key.
//!
//! Java material objects report their native identity through
//! `getNativeObject()`, which must return a handle issued by the engine
//! entry points in this library.

use jni::objects::{GlobalRef, JObject, JObjectArray, JValue};
use jni::sys::{jint, jsize};
use jni::{JNIEnv, JavaVM};

use super::types::{to_jboolean, NativeHandle};
use crate::engine::{MaterialHandle, MaterialInstanceHandle, VertexAttribute};
use crate::error::{BridgeError, BridgeResult};
use crate::material::{AlphaMode, MaterialKey, MaterialProvider, UvMap, UvSet, MAX_UV_INDEX};

const KEY_CLASS: &str = "com/google/android/filament/gltfio/MaterialProvider$MaterialKey";
const ALPHA_MODE_CLASS: &str = "com/google/android/filament/gltfio/MaterialProvider$AlphaMode";
const ALPHA_MODE_SIG: &str = "Lcom/google/android/filament/gltfio/MaterialProvider$AlphaMode;";
const UV_SET_CLASS: &str = "com/google/android/filament/gltfio/MaterialProvider$UvSet";
const UV_SET_SIG: &str = "Lcom/google/android/filament/gltfio/MaterialProvider$UvSet;";
const VERTEX_ATTRIBUTE_CLASS: &str = "com/google/android/filament/VertexBuffer$VertexAttribute";

const CREATE_INSTANCE_SIG: &str = "(Lcom/google/android/filament/gltfio/MaterialProvider$MaterialKey;\
[Lcom/google/android/filament/gltfio/MaterialProvider$UvSet;Ljava/lang/String;)\
Lcom/google/android/filament/MaterialInstance;";
const GET_MATERIALS_SIG: &str = "()[Lcom/google/android/filament/Material;";
const NEEDS_DUMMY_DATA_SIG: &str = "(Lcom/google/android/filament/VertexBuffer$VertexAttribute;)Z";

/// A Java `MaterialProvider` seen through the native trait
pub struct JavaMaterialProvider {
    vm: JavaVM,
    provider: GlobalRef,
    snapshot: Vec<MaterialHandle>,
}

impl JavaMaterialProvider {
    pub fn new(env: &mut JNIEnv, provider: &JObject) -> BridgeResult<Self> {
        if provider.is_null() {
            return Err(BridgeError::NullPointer("material provider"));
        }
        Ok(Self {
            vm: env.get_java_vm()?,
            provider: env.new_global_ref(provider)?,
            snapshot: Vec::new(),
        })
    }

    fn call_create(
        &self,
        key: &mut MaterialKey,
        uvmap: &mut UvMap,
        label: Option<&str>,
    ) -> BridgeResult<Option<MaterialInstanceHandle>> {
        let mut env = self.vm.attach_current_thread()?;

        // Local references die with the frame
        env.with_local_frame(16, |env| {
            let jkey = key_to_java(env, key)?;
            let unused = enum_constant(env, UV_SET_CLASS, UV_SET_SIG, UvSet::Unused.java_name())?;
            let juvmap = env.new_object_array(MAX_UV_INDEX as jsize, UV_SET_CLASS, &unused)?;
            let jlabel = match label {
                Some(label) => JObject::from(env.new_string(label)?),
                None => JObject::null(),
            };

            let result = env.call_method(
                self.provider.as_obj(),
                "createMaterialInstance",
                CREATE_INSTANCE_SIG,
                &[
                    JValue::Object(&jkey),
                    JValue::Object(&juvmap),
                    JValue::Object(&jlabel),
                ],
            );
            let instance = check_exception(env, "createMaterialInstance", result)?.l()?;

            key_from_java(env, &jkey, key)?;
            uvmap_from_java(env, &juvmap, uvmap)?;

            if instance.is_null() {
                return Ok(None);
            }
            Ok(native_object(env, &instance)?.to_key())
        })
    }

    fn call_get_materials(&self) -> BridgeResult<Vec<MaterialHandle>> {
        let mut env = self.vm.attach_current_thread()?;

        let result = env.call_method(self.provider.as_obj(), "getMaterials", GET_MATERIALS_SIG, &[]);
        let array = check_exception(&mut env, "getMaterials", result)?.l()?;
        if array.is_null() {
            return Ok(Vec::new());
        }

        let array = JObjectArray::from(array);
        let len = env.get_array_length(&array)?;
        let mut materials = Vec::with_capacity(len.max(0) as usize);
        for i in 0..len {
            let material = env.get_object_array_element(&array, i)?;
            if material.is_null() {
                continue;
            }
            match native_object(&mut env, &material)?.to_key() {
                Some(handle) => materials.push(handle),
                None => log::warn!("getMaterials returned a material without a native handle"),
            }
            env.delete_local_ref(material)?;
        }
        Ok(materials)
    }

    fn call_needs_dummy_data(&self, attribute: VertexAttribute) -> BridgeResult<bool> {
        let mut env = self.vm.attach_current_thread()?;

        let sig = format!("L{};", VERTEX_ATTRIBUTE_CLASS);
        let jattribute = enum_constant(&mut env, VERTEX_ATTRIBUTE_CLASS, &sig, attribute.java_name())?;
        let result = env.call_method(
            self.provider.as_obj(),
            "needsDummyData",
            NEEDS_DUMMY_DATA_SIG,
            &[JValue::Object(&jattribute)],
        );
        Ok(check_exception(&mut env, "needsDummyData", result)?.z()?)
    }

    fn call_destroy_materials(&self) -> BridgeResult<()> {
        let mut env = self.vm.attach_current_thread()?;
        let result = env.call_method(self.provider.as_obj(), "destroyMaterials", "()V", &[]);
        check_exception(&mut env, "destroyMaterials", result)?;
        Ok(())
    }
}

impl MaterialProvider for JavaMaterialProvider {
    fn create_material_instance(
        &mut self,
        key: &mut MaterialKey,
        uvmap: &mut UvMap,
        label: Option<&str>,
    ) -> Option<MaterialInstanceHandle> {
        match self.call_create(key, uvmap, label) {
            Ok(instance) => instance,
            Err(e) => {
                log::error!("Java provider failed to create a material instance: {}", e);
                None
            }
        }
    }

    fn materials(&mut self) -> &[MaterialHandle] {
        self.snapshot = self.call_get_materials().unwrap_or_else(|e| {
            log::error!("Java provider failed to list materials: {}", e);
            Vec::new()
        });
        &self.snapshot
    }

    fn materials_count(&self) -> usize {
        self.snapshot.len()
    }

    fn destroy_materials(&mut self) {
        if let Err(e) = self.call_destroy_materials() {
            log::error!("Java provider failed to destroy materials: {}", e);
        }
        self.snapshot.clear();
    }

    fn needs_dummy_data(&self, attribute: VertexAttribute) -> bool {
        self.call_needs_dummy_data(attribute).unwrap_or_else(|e| {
            log::error!("Java provider failed to answer needsDummyData: {}", e);
            false
        })
    }
}

/// Clear a pending Java exception and turn it into an error
fn check_exception<T>(
    env: &mut JNIEnv,
    method: &'static str,
    result: jni::errors::Result<T>,
) -> BridgeResult<T> {
    if env.exception_check()? {
        env.exception_describe()?;
        env.exception_clear()?;
        return Err(BridgeError::JavaException(method));
    }
    Ok(result?)
}

fn native_object(env: &mut JNIEnv, object: &JObject) -> BridgeResult<NativeHandle> {
    let result = env.call_method(object, "getNativeObject", "()J", &[]);
    let value = check_exception(env, "getNativeObject", result)?.j()?;
    Ok(NativeHandle::from_jlong(value))
}

fn enum_constant<'local>(
    env: &mut JNIEnv<'local>,
    class: &str,
    sig: &str,
    name: &str,
) -> BridgeResult<JObject<'local>> {
    Ok(env.get_static_field(class, name, sig)?.l()?)
}

fn enum_ordinal(env: &mut JNIEnv, value: &JObject) -> BridgeResult<jint> {
    Ok(env.call_method(value, "ordinal", "()I", &[])?.i()?)
}

fn key_to_java<'local>(env: &mut JNIEnv<'local>, key: &mut MaterialKey) -> BridgeResult<JObject<'local>> {
    let jkey = env.new_object(KEY_CLASS, "()V", &[])?;

    for (name, value) in key.java_bool_fields_mut() {
        env.set_field(&jkey, name, "Z", JValue::Bool(to_jboolean(*value)))?;
    }
    for (name, value) in key.java_uv_fields_mut() {
        env.set_field(&jkey, name, "I", JValue::Int(*value as jint))?;
    }

    let alpha = enum_constant(env, ALPHA_MODE_CLASS, ALPHA_MODE_SIG, key.alpha_mode.java_name())?;
    env.set_field(&jkey, "alphaMode", ALPHA_MODE_SIG, JValue::Object(&alpha))?;
    Ok(jkey)
}

fn key_from_java(env: &mut JNIEnv, jkey: &JObject, key: &mut MaterialKey) -> BridgeResult<()> {
    for (name, value) in key.java_bool_fields_mut() {
        *value = env.get_field(jkey, name, "Z")?.z()?;
    }
    for (name, value) in key.java_uv_fields_mut() {
        let index = env.get_field(jkey, name, "I")?.i()?;
        *value = u8::try_from(index).unwrap_or(u8::MAX);
    }

    let alpha = env.get_field(jkey, "alphaMode", ALPHA_MODE_SIG)?.l()?;
    if !alpha.is_null() {
        let ordinal = enum_ordinal(env, &alpha)?;
        if let Some(mode) = AlphaMode::from_ordinal(ordinal) {
            key.alpha_mode = mode;
        }
    }
    Ok(())
}

fn uvmap_from_java(env: &mut JNIEnv, juvmap: &JObjectArray, uvmap: &mut UvMap) -> BridgeResult<()> {
    for (i, slot) in uvmap.iter_mut().enumerate() {
        let set = env.get_object_array_element(juvmap, i as jsize)?;
        *slot = if set.is_null() {
            UvSet::Unused
        } else {
            UvSet::from_ordinal(enum_ordinal(env, &set)?).unwrap_or(UvSet::Unused)
        };
    }
    Ok(())
}
