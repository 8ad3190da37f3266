//! # Quoter Common Library
//!
//! Shared code for the quoter backend:
//! - Database initialization, row models and v2 repository tables
//! - Access-key hashing and attachment id derivation
//! - Configuration loading
//! - Time helpers

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
