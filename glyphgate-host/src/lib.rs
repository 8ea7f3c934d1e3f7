//! Glyphgate host library
//!
//! This crate wires the capability layer together for an embedding
//! application: configuration loading, the host builder that registers the
//! standard capability set, and the bootstrap entry point.

pub mod config;
pub mod host;
