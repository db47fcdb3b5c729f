use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ProviderKind;

/// Errors raised while collecting, classifying or exporting businesses.
///
/// Only `Configuration` is fatal for a query. Provider and parse failures are
/// downgraded to warnings by the collector, and export failures leave the
/// result set untouched.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{provider} request failed: {message}")]
    ProviderRequest {
        provider: ProviderKind,
        message: String,
    },

    #[error("{provider} returned a malformed response: {message}")]
    Parse {
        provider: ProviderKind,
        message: String,
    },

    #[error("failed to write {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl SearchError {
    pub fn config(message: impl Into<String>) -> Self {
        SearchError::Configuration(message.into())
    }

    pub fn request(provider: ProviderKind, message: impl Into<String>) -> Self {
        SearchError::ProviderRequest {
            provider,
            message: message.into(),
        }
    }

    pub fn parse(provider: ProviderKind, message: impl Into<String>) -> Self {
        SearchError::Parse {
            provider,
            message: message.into(),
        }
    }

    pub fn export(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        SearchError::Export {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Whether this error must abort the query instead of becoming a warning
    pub fn is_fatal(&self) -> bool {
        matches!(self, SearchError::Configuration(_))
    }
}
