// In crates/risk/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Return sample cannot be empty")]
    EmptySample,

    #[error("Return sample contains a non-numeric value at position {index}")]
    NonNumeric { index: usize },

    #[error("Invalid risk parameters: {0}")]
    InvalidParameters(String),
}

pub type Result<T> = std::result::Result<T, Error>;
