//! relpack-core: Core logic for relpack
//!
//! This crate provides the deterministic archive builder, content
//! fingerprinting, and release manifest assembly for relpack.

mod archive;
mod error;
mod hash;
mod manifest;

pub use archive::{AddOption, Builder};
pub use error::CoreError;
pub use hash::fingerprint;
pub use manifest::{JobRecord, Manifest, PackageMode, PackageRecord, Stemcell};

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
