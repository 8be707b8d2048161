//! Filesystem `SourceReader`.

use crate::domain::RegistryError;
use crate::ports::SourceReader;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Reads relation sources relative to a root directory.
///
/// Locations come from configuration, not from clients, so they are joined
/// without a containment check.
#[derive(Debug, Clone)]
pub struct FsSourceReader {
    root: PathBuf,
}

impl FsSourceReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SourceReader for FsSourceReader {
    async fn read_text(&self, location: &str) -> Result<String, RegistryError> {
        let path = self.root.join(location);
        tokio::fs::read_to_string(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => RegistryError::SourceNotFound(location.to_string()),
            _ => RegistryError::SourceUnreadable {
                location: location.to_string(),
                reason: e.to_string(),
            },
        })
    }
}
