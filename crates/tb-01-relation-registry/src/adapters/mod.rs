//! Adapters for the relation registry.

pub mod fs_reader;

pub use fs_reader::FsSourceReader;
