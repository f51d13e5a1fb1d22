//! Common error types for vgen

use thiserror::Error;

/// Common result type for vgen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the vgen crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested template name absent from the template store
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// Project lacks the host tool's baseline groups/views
    #[error("Project not initialised: {0}")]
    ProjectNotInitialised(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Group tree walk exceeded the depth bound (cycle or corrupt tree)
    #[error("Group tree too deep or cyclic at group {0}")]
    GroupTreeTooDeep(i64),
}
