//! Ports for the relation registry.

pub mod inbound;
pub mod outbound;

pub use inbound::RegistryReader;
pub use outbound::SourceReader;
