//! # JNI Bindings
//!
//! Entry points that let Java drive the asset loader, plus the adapter that
//! lets a Java `MaterialProvider` serve the loader.
//!
//! ## Safety
//!
//! All JNI functions are inherently unsafe as they deal with raw pointers
//! from the JVM. Objects cross the boundary only as generational handles,
//! so a stale `long` from Java is rejected instead of dereferenced.

pub mod bridge;
pub mod buffer;
pub mod handles;
pub mod provider;
pub mod types;

pub use bridge::*;
pub use buffer::AutoBuffer;
pub use handles::Registry;
pub use provider::JavaMaterialProvider;
pub use types::NativeHandle;
