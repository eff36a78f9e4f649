//! Core types for Folio.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod project_type;
pub mod role;

pub use id::*;
pub use project_type::{ProjectType, ProjectTypeError};
pub use role::Role;
