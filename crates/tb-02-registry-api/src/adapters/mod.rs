//! Adapters for the registry API.

pub mod registry_fs;

pub use registry_fs::{RegistryFiles, MANIFEST_DOCUMENT};
