//! Core types and trait definitions for the cartograph retrieval pipeline.
//!
//! This crate is deliberately free of HTTP and storage dependencies. The
//! corpus index, the language-model providers and the query orchestrator all
//! depend on it; it depends on nothing service-specific.

pub mod attribution;
pub mod error;
pub mod project;
pub mod relationship;
pub mod request;
pub mod response;
pub mod retrieve;
pub mod synthesis;
pub mod text;

pub use error::{Error, Result};
