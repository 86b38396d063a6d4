// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A required input is absent or malformed. Computation never proceeds on partial data.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unknown option type: {0}")]
    UnknownOptionType(String),
}

pub type Result<T> = std::result::Result<T, Error>;
