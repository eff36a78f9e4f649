//! Folio server library.
//!
//! The portfolio content API as a library, so the router can be exercised in
//! tests with in-memory stores.
//!
//! # Modules
//!
//! - [`config`] - Environment configuration
//! - [`db`] - Project and message stores
//! - [`storage`] - Object storage for images
//! - [`services`] - Session roles, uploads, and permission-gated mutations
//! - [`routes`] - HTTP handlers and the application router

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
