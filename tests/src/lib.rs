//! # Tesseract Bridge Test Suite
//!
//! Unified test crate for flows that cross crate boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs       # On-disk registry trees
//!     ├── flows.rs          # load → store → query (direct and over HTTP)
//!     └── e2e_events.rs     # enqueue → drain → receipt → /sync
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tb-tests
//! cargo test -p tb-tests integration::e2e_events
//! ```

#![allow(dead_code)]

pub mod integration;
