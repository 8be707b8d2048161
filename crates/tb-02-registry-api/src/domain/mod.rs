//! Domain layer: configuration, errors, path containment, media decoding.

pub mod config;
pub mod error;
pub mod media;
pub mod path;
pub mod types;

pub use config::{ApiConfig, AuthConfig, ConfigError, CorsConfig, HttpConfig, PathsConfig};
pub use error::{ApiError, ApiResult, ServiceError};
pub use media::{MediaKind, ResourceError};
pub use path::{PathError, RegistryPath};
pub use types::*;
