// src/error.rs

//! Error types for the artifact resolver
//!
//! Every fallible library operation returns [`Result`]. Errors carry a coarse
//! [`ErrorClass`] so a transport layer can map them onto client errors,
//! missing resources, or internal failures without inspecting messages.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while canonicalizing, storing, or resolving records
#[derive(Error, Debug)]
pub enum Error {
    /// Request parameters are malformed, unsupported, or ambiguous
    #[error("{0}")]
    InvalidCriteria(String),

    /// A raw provider record lacks required fields or has unusable values
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// No record satisfies the request
    #[error("{0}")]
    NotFoundError(String),

    /// SQLite failure in the record store
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON, TOML, or date text could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Configuration is inconsistent or names an unknown value
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ParseError(err.to_string())
    }
}

/// Coarse classification of an [`Error`] for transport boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BadRequest,
    NotFound,
    Internal,
}

impl ErrorClass {
    /// HTTP-style status code for this class
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorClass::BadRequest => 400,
            ErrorClass::NotFound => 404,
            ErrorClass::Internal => 500,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ErrorClass::BadRequest => "Bad Request",
            ErrorClass::NotFound => "Not Found",
            ErrorClass::Internal => "Internal Server Error",
        }
    }
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::InvalidCriteria(_) => ErrorClass::BadRequest,
            Error::NotFoundError(_) => ErrorClass::NotFound,
            _ => ErrorClass::Internal,
        }
    }
}
