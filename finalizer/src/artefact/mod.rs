//! Artifact retrieval and archive extraction.
//!
//! # Sub-modules
//!
//! - [`source`] - Local-build and build-server retrieval behind one trait.
//! - [`extraction`] - Zip extraction with path traversal protection.

pub mod extraction;
pub mod source;
