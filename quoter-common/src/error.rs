//! Errors raised below the HTTP layer
//!
//! Database, config and resolver code return [`Error`]. The server maps
//! `NotFound` to 404 and `InvalidInput` to 400; everything else is a 500.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Query or connection failure, including SQLITE_BUSY after the busy timeout
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Config file or database directory could not be read or created
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `config.toml` failed to parse or holds an unusable value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Nothing stored under the requested id or name
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected request value, such as a malformed repository name
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = Error::NotFound("Quote 7 in uadaf".to_string());
        assert_eq!(err.to_string(), "Not found: Quote 7 in uadaf");

        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml").into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().starts_with("IO error: "));
    }
}
