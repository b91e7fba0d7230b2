//! Error types shared across the system

use thiserror::Error;

/// Base error type for the scheduling domain
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("infrastructure error: {0}")]
    Infrastructure(String),

    #[error("timeout: {0}")]
    Timeout(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
