//! CLI error types.

use confmark_adf::AdfError;
use confmark_config::ConfigError;
use confmark_confluence::publisher::PublishError;
use confmark_confluence::{ConfluenceError, ExportError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Confluence(#[from] ConfluenceError),

    #[error("{0}")]
    Export(#[from] ExportError),

    #[error("{0}")]
    Publish(#[from] PublishError),

    #[error("{0}")]
    Adf(#[from] AdfError),

    #[error("{0}")]
    Validation(String),
}
