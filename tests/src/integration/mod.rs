//! Cross-crate integration flows.

#[cfg(test)]
pub mod fixtures;

pub mod e2e_events;
pub mod flows;
