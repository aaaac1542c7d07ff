//! # Utilities

pub mod hash;

pub use hash::{stable_hash, FnvBuildHasher};
