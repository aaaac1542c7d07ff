//! # Buffer Adapter
//!
//! Gives native code a byte slice over a `java.nio.ByteBuffer` for the
//! duration of one JNI call.

use jni::objects::{JByteArray, JByteBuffer, JObject};
use jni::sys::jint;
use jni::JNIEnv;

use crate::error::{BridgeError, BridgeResult};

enum Storage {
    /// Memory owned by a direct buffer, valid while the Java object is
    Direct { ptr: *const u8, len: usize },
    /// Copy of a heap buffer's backing array
    Copied(Vec<u8>),
}

/// The `remaining` bytes of a `ByteBuffer`, starting at its position
pub struct AutoBuffer<'local> {
    storage: Storage,
    _buffer: JByteBuffer<'local>,
}

impl<'local> AutoBuffer<'local> {
    pub fn new(env: &mut JNIEnv<'local>, buffer: JObject<'local>, remaining: jint) -> BridgeResult<Self> {
        if buffer.is_null() {
            return Err(BridgeError::NullPointer("buffer"));
        }
        let buffer = JByteBuffer::from(buffer);
        let position = env.call_method(&buffer, "position", "()I", &[])?.i()? as usize;
        let len = usize::try_from(remaining).map_err(|_| BridgeError::BufferRange {
            start: position,
            end: position,
            available: 0,
        })?;

        let direct = env.get_direct_buffer_address(&buffer).ok().filter(|p| !p.is_null());
        let storage = match direct {
            Some(address) => {
                let capacity = env.get_direct_buffer_capacity(&buffer)?;
                check_range(position, len, capacity)?;
                // SAFETY: the range lies inside the buffer's capacity.
                let ptr = unsafe { address.add(position) } as *const u8;
                Storage::Direct { ptr, len }
            }
            None => Storage::Copied(copy_heap_buffer(env, &buffer, position, len)?),
        };

        Ok(Self {
            storage,
            _buffer: buffer,
        })
    }

    pub fn data(&self) -> &[u8] {
        match &self.storage {
            Storage::Direct { len: 0, .. } => &[],
            // SAFETY: `_buffer` keeps the local reference alive for the
            // lifetime of `self`, and the JVM never moves direct buffer memory.
            Storage::Direct { ptr, len } => unsafe { std::slice::from_raw_parts(*ptr, *len) },
            Storage::Copied(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_direct(&self) -> bool {
        matches!(self.storage, Storage::Direct { .. })
    }
}

fn copy_heap_buffer(
    env: &mut JNIEnv,
    buffer: &JByteBuffer,
    position: usize,
    len: usize,
) -> BridgeResult<Vec<u8>> {
    if !env.call_method(buffer, "hasArray", "()Z", &[])?.z()? {
        return Err(BridgeError::NullPointer("buffer backing array"));
    }
    let offset = env.call_method(buffer, "arrayOffset", "()I", &[])?.i()? as usize;
    let array = JByteArray::from(env.call_method(buffer, "array", "()[B", &[])?.l()?);

    let mut bytes = env.convert_byte_array(&array)?;
    let start = offset + position;
    check_range(start, len, bytes.len())?;
    bytes.truncate(start + len);
    bytes.drain(..start);

    log::debug!("Copied {} byte(s) from a heap buffer", len);
    Ok(bytes)
}

fn check_range(start: usize, len: usize, available: usize) -> BridgeResult<()> {
    let end = start.saturating_add(len);
    if end > available {
        return Err(BridgeError::BufferRange {
            start,
            end,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_inside_capacity() {
        assert!(check_range(0, 16, 16).is_ok());
        assert!(check_range(8, 0, 8).is_ok());
    }

    #[test]
    fn test_range_past_capacity() {
        let err = check_range(4, 16, 16).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::BufferRange {
                start: 4,
                end: 20,
                available: 16
            }
        ));
        assert!(check_range(usize::MAX, 1, 16).is_err());
    }
}
