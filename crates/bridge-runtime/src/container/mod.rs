//! # Bridge Container
//!
//! Configuration and the shared state the runtime wires together.
//!
//! - `config` - `BridgeConfig`, file and environment loading
//! - `context` - `BridgeContext`, owner of the registry store and event queue

pub mod config;
pub mod context;

pub use config::{load_config, BridgeConfig, RouterConfig, CONFIG_PATH_ENV};
pub use context::BridgeContext;
