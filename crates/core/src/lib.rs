//! Folio Core - Shared types library.
//!
//! This crate provides common types used across all Folio components:
//! - `server` - The portfolio HTTP API (projects, contact messages, sessions)
//! - `cli` - Command-line tools for migrations and secrets
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, the access [`Role`], and [`ProjectType`]

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
