//! # Registry Path Containment
//!
//! Turns a client-supplied sub-path into a normalized, root-relative segment
//! list. This is purely lexical and runs before any filesystem access; a path
//! that would climb above the registry root is rejected outright.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Public prefix for every registry path.
pub const REGISTRY_PREFIX: &str = "/registry";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// A `..` segment would leave the registry root.
    #[error("path escapes registry root")]
    Escapes,
    #[error("path contains a NUL byte")]
    NulByte,
    /// A segment such as `C:` would be read as a drive on some platforms.
    #[error("path contains a drive prefix")]
    DrivePrefix,
}

/// A sub-path known to stay inside the registry root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryPath {
    segments: Vec<String>,
}

impl RegistryPath {
    /// The registry root itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Normalize `raw` and check containment.
    ///
    /// Backslashes count as separators, empty and `.` segments are dropped,
    /// and `..` pops the previous segment.
    pub fn resolve(raw: &str) -> Result<Self, PathError> {
        if raw.contains('\0') {
            return Err(PathError::NulByte);
        }

        let normalized = raw.replace('\\', "/");
        let mut segments: Vec<String> = Vec::new();
        for segment in normalized.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(PathError::Escapes);
                    }
                }
                s if is_drive_prefix(s) => return Err(PathError::DrivePrefix),
                s => segments.push(s.to_string()),
            }
        }

        Ok(Self { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Root-relative form, `/`-joined. Empty for the root.
    pub fn relative(&self) -> String {
        self.segments.join("/")
    }

    /// Path as clients see it, e.g. `/registry/maps/a.csv`.
    pub fn public_path(&self) -> String {
        if self.is_root() {
            REGISTRY_PREFIX.to_string()
        } else {
            format!("{REGISTRY_PREFIX}/{}", self.relative())
        }
    }

    /// Child entry, for directory listings.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// Location on disk under `root`.
    pub fn to_fs_path(&self, root: &Path) -> PathBuf {
        self.segments
            .iter()
            .fold(root.to_path_buf(), |path, segment| path.join(segment))
    }

    /// Lower-cased extension of the last segment including its dot, or `""`.
    ///
    /// A leading dot alone (`.hidden`) is not an extension.
    pub fn extension(&self) -> String {
        let Some(name) = self.segments.last() else {
            return String::new();
        };
        match name.rfind('.') {
            Some(idx) if idx > 0 => name[idx..].to_ascii_lowercase(),
            _ => String::new(),
        }
    }
}

fn is_drive_prefix(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
