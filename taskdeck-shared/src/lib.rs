//! # Taskdeck Shared Library
//!
//! This crate contains shared types, utilities, and business logic used across
//! the Taskdeck API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Password hashing and token issuance/verification
//! - `db`: Connection pool and embedded migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Taskdeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
