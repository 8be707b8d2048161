//! # Outbound Port - SourceReader
//!
//! Where relation text comes from. The loader only ever asks for a whole
//! document by location.

use crate::domain::RegistryError;
use async_trait::async_trait;

#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Read the full text at `location`.
    ///
    /// # Errors
    ///
    /// `SourceNotFound` when nothing exists there, `SourceUnreadable` for any
    /// other failure.
    async fn read_text(&self, location: &str) -> Result<String, RegistryError>;
}
