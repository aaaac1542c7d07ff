//! # gltfio native
//!
//! glTF asset loading with pluggable material providers, exposed to a Java
//! host through JNI.
//!
//! ## Modules
//!
//! - **Engine**: material templates and instances in generational arenas
//! - **Entities**: entity allocator and node name registry
//! - **Material**: the `MaterialProvider` capability, material keys, and
//!   the JIT and ubershader providers
//! - **Loader**: binary, JSON and instanced asset creation
//! - **JNI**: cross-boundary entry points and the Java provider adapter

pub mod config;
pub mod engine;
pub mod entities;
pub mod error;
pub mod jni;
pub mod loader;
pub mod material;
pub mod util;

// Re-exports
pub use config::{LoaderConfig, UbershaderConfig};
pub use engine::{Engine, MaterialHandle, MaterialInstanceHandle, SharedEngine, VertexAttribute};
pub use entities::{Entity, EntityManager, NameComponentManager, SharedEntities};
pub use error::{BridgeError, EngineError, LoaderError};
pub use loader::{Asset, AssetConfiguration, AssetHandle, AssetLoader, InstanceHandle, LoaderParts};
pub use material::{
    JitShaderProvider, MaterialKey, MaterialProvider, UbershaderProvider, UvMap, UvSet,
};

use std::sync::Once;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = "gltfio_native";

static INIT: Once = Once::new();

/// Initialize the library. Safe to call repeatedly.
pub fn initialize() {
    INIT.call_once(|| {
        init_logging();
        log::info!("{} v{} on {} {}", NAME, VERSION, std::env::consts::OS, std::env::consts::ARCH);
    });
}

/// Install the fmt subscriber. Does nothing if one is already installed.
pub fn init_logging() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let _ = tracing_subscriber::registry()
        .with(fmt::layer())
        .try_init();
}
