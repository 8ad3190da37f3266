//! API module for shared HTTP API functionality
//!
//! # Design Principle
//!
//! This module contains ONLY pure functions and shared types.
//! No HTTP framework dependencies: quoter-server wraps these with axum
//! extractors and error mapping.

pub mod auth;

pub use auth::{attachment_id, hash_access_key, verify_access_key};
