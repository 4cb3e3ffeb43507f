//! Catalog errors.

use thiserror::Error;

/// Errors that can occur while loading or installing a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// YAML parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog parsed but is not usable.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A process-wide catalog was already installed.
    #[error("Catalog already loaded")]
    AlreadyLoaded,
}
