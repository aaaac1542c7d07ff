//! # Error Types
//!
//! Failures are terminal for the call in which they occur. The loader
//! surface turns them into sentinel returns; these enums carry the cause
//! as far as the log.

use thiserror::Error;

/// Errors raised by the engine's material arenas
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("stale or foreign {0} handle")]
    StaleHandle(&'static str),

    #[error("material '{name}' still has {instances} live instance(s)")]
    MaterialInUse { name: String, instances: usize },

    #[error("material '{material}' has no parameter '{parameter}'")]
    UnknownParameter { material: String, parameter: String },
}

/// Errors raised while turning a glTF buffer into an asset
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("empty asset buffer")]
    EmptyBuffer,

    #[error("buffer is not a binary glTF (missing 'glTF' magic)")]
    NotBinary,

    #[error("buffer is a binary glTF, expected JSON")]
    NotJson,

    #[error("glTF parse failed: {0}")]
    Parse(#[from] gltf::Error),

    #[error("glTF JSON could not be read: {0}")]
    Json(#[from] serde_json::Error),

    #[error("requested {requested} instances, allowed range is 1..={max}")]
    InstanceCount { requested: usize, max: usize },

    #[error("asset contains no scene nodes")]
    NoNodes,

    #[error("node {node} is its own ancestor")]
    NodeCycle { node: usize },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors raised at the JNI boundary
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("JNI call failed: {0}")]
    Jni(#[from] jni::errors::Error),

    #[error("invalid {0} handle")]
    InvalidHandle(&'static str),

    #[error("unknown {what} ordinal {ordinal}")]
    InvalidOrdinal { what: &'static str, ordinal: i32 },

    #[error("null {0}")]
    NullPointer(&'static str),

    #[error("Java method {0} threw an exception")]
    JavaException(&'static str),

    #[error("buffer range {start}..{end} exceeds {available} byte(s)")]
    BufferRange {
        start: usize,
        end: usize,
        available: usize,
    },

    #[error("configuration rejected: {0}")]
    Config(String),

    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type LoaderResult<T> = Result<T, LoaderError>;
pub type EngineResult<T> = Result<T, EngineError>;
pub type BridgeResult<T> = Result<T, BridgeError>;
