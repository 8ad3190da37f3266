//! Database models and schema

pub mod init;
pub mod models;
pub mod repos;

pub use init::*;
pub use models::*;
pub use repos::*;
