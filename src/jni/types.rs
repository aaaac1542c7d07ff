//! # JNI Type Conversions
//!
//! Helper types and conversions for JNI interop.

use jni::sys::{jboolean, jlong, JNI_FALSE, JNI_TRUE};
use slotmap::{Key, KeyData};

use super::handles::{EngineKey, EntityManagerKey, LoaderKey};
use crate::engine::{MaterialHandle, MaterialInstanceHandle};
use crate::loader::{AssetHandle, InstanceHandle};

/// Convert Rust bool to JNI boolean
#[inline]
pub fn to_jboolean(b: bool) -> jboolean {
    if b { JNI_TRUE } else { JNI_FALSE }
}

/// Convert JNI boolean to Rust bool
#[inline]
pub fn from_jboolean(b: jboolean) -> bool {
    b != JNI_FALSE
}

/// Which arena a handle belongs to. Stored in the top byte of the value
/// Java sees, so a handle from one arena never decodes as another's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HandleKind {
    Engine = 1,
    EntityManager = 2,
    Loader = 3,
    Material = 4,
    MaterialInstance = 5,
    Asset = 6,
    AssetInstance = 7,
}

/// A slotmap key type that may cross the boundary
pub trait TaggedKey: Key {
    const KIND: HandleKind;
}

impl TaggedKey for EngineKey {
    const KIND: HandleKind = HandleKind::Engine;
}

impl TaggedKey for EntityManagerKey {
    const KIND: HandleKind = HandleKind::EntityManager;
}

impl TaggedKey for LoaderKey {
    const KIND: HandleKind = HandleKind::Loader;
}

impl TaggedKey for MaterialHandle {
    const KIND: HandleKind = HandleKind::Material;
}

impl TaggedKey for MaterialInstanceHandle {
    const KIND: HandleKind = HandleKind::MaterialInstance;
}

impl TaggedKey for AssetHandle {
    const KIND: HandleKind = HandleKind::Asset;
}

impl TaggedKey for InstanceHandle {
    const KIND: HandleKind = HandleKind::AssetInstance;
}

const TAG_SHIFT: u32 = 56;
const TAG_MASK: u64 = 0xff << TAG_SHIFT;

/// A generational handle as it crosses the boundary. Zero is null; every
/// live key encodes to a non-zero, positive value tagged with its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NativeHandle(pub u64);

impl NativeHandle {
    pub const INVALID: NativeHandle = NativeHandle(0);

    pub fn from_key<K: TaggedKey>(key: K) -> Self {
        if key.is_null() {
            return Self::INVALID;
        }

        let raw = key.data().as_ffi();
        if raw & TAG_MASK != 0 {
            // Slot version ran into the tag byte
            log::error!("{:?} handle {:#x} cannot be tagged", K::KIND, raw);
            return Self::INVALID;
        }
        NativeHandle(raw | (K::KIND as u64) << TAG_SHIFT)
    }

    /// Decode into a typed key. Null handles and handles tagged for another
    /// arena give `None`; a stale key is left for its arena to reject.
    pub fn to_key<K: TaggedKey>(&self) -> Option<K> {
        if !self.is_valid() || self.kind_tag() != K::KIND as u8 {
            return None;
        }
        Some(K::from(KeyData::from_ffi(self.0 & !TAG_MASK)))
    }

    fn kind_tag(&self) -> u8 {
        (self.0 >> TAG_SHIFT) as u8
    }

    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }

    pub fn to_jlong(&self) -> jlong {
        self.0 as jlong
    }

    pub fn from_jlong(value: jlong) -> Self {
        NativeHandle(value as u64)
    }
}

impl From<jlong> for NativeHandle {
    fn from(value: jlong) -> Self {
        NativeHandle::from_jlong(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_jboolean_round_trip() {
        assert!(from_jboolean(to_jboolean(true)));
        assert!(!from_jboolean(to_jboolean(false)));
    }

    #[test]
    fn test_live_key_is_never_null() {
        let mut map: SlotMap<AssetHandle, u32> = SlotMap::with_key();
        let key = map.insert(7);
        let handle = NativeHandle::from_key(key);

        assert!(handle.is_valid());
        assert!(handle.to_jlong() > 0);
        assert_eq!(handle.to_key::<AssetHandle>(), Some(key));
        assert_eq!(NativeHandle::from_jlong(handle.to_jlong()), handle);
    }

    #[test]
    fn test_null_handle() {
        assert_eq!(NativeHandle::from_key(AssetHandle::null()), NativeHandle::INVALID);
        assert_eq!(NativeHandle::INVALID.to_key::<AssetHandle>(), None);
    }

    #[test]
    fn test_handle_from_another_arena_is_rejected() {
        let mut assets: SlotMap<AssetHandle, u32> = SlotMap::with_key();
        let mut materials: SlotMap<MaterialHandle, u32> = SlotMap::with_key();
        let asset = assets.insert(1);
        let material = materials.insert(2);

        // First keys of both arenas share slot index and version
        assert_eq!(asset.data().as_ffi(), material.data().as_ffi());

        let handle = NativeHandle::from_key(asset);
        assert_eq!(handle.to_key::<MaterialHandle>(), None);
        assert_eq!(handle.to_key::<InstanceHandle>(), None);
        assert_eq!(handle.to_key::<AssetHandle>(), Some(asset));
        assert_ne!(handle, NativeHandle::from_key(material));
    }

    #[test]
    fn test_untagged_value_is_rejected() {
        let mut map: SlotMap<LoaderKey, u32> = SlotMap::with_key();
        let key = map.insert(1);
        let raw = NativeHandle(key.data().as_ffi());
        assert_eq!(raw.to_key::<LoaderKey>(), None);
    }

    #[test]
    fn test_stale_handle_misses() {
        let mut map: SlotMap<AssetHandle, u32> = SlotMap::with_key();
        let key = map.insert(1);
        let handle = NativeHandle::from_key(key);
        map.remove(key);
        map.insert(2);

        let decoded: AssetHandle = handle.to_key().unwrap();
        assert!(map.get(decoded).is_none());
    }
}
