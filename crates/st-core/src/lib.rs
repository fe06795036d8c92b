//! # st-core
//!
//! Core types, traits, and utilities for SiteTrack.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - Common error types
//! - Result type aliases
//! - Core traits (Entity, Identifiable, Timestamped)
//! - Shared domain types (Reference, Tag)
//! - Configuration types

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::*;
pub use result::*;
pub use traits::*;
pub use types::*;
