//! Page pipeline errors

use std::path::PathBuf;
use thiserror::Error;

/// Failure while resolving or rendering a page
#[derive(Debug, Error)]
pub enum PageError {
    #[error("invalid page key {0:?}")]
    InvalidKey(String),

    #[error("not found: {}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed metadata in {}: {source}", .path.display())]
    MalformedMetadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("template syntax error in {}: {source}", .path.display())]
    TemplateSyntax {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },

    #[error("template execution failed: {0}")]
    RenderExecution(#[source] tera::Error),
}

/// Coarse classification of a [`PageError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidKey,
    NotFound,
    MalformedMetadata,
    TemplateSyntax,
    RenderExecution,
}

impl PageError {
    pub(crate) fn not_found(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::NotFound {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidKey(_) => ErrorKind::InvalidKey,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::MalformedMetadata { .. } => ErrorKind::MalformedMetadata,
            Self::TemplateSyntax { .. } => ErrorKind::TemplateSyntax,
            Self::RenderExecution(_) => ErrorKind::RenderExecution,
        }
    }

    /// Whether the failure means the page does not exist, as opposed to
    /// being present but broken
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidKey | ErrorKind::NotFound)
    }

    /// Full description including nested causes, for server-side logs
    ///
    /// Tera keeps the useful part of its messages several sources deep.
    pub fn diagnostic(&self) -> String {
        let mut message = self.to_string();
        let mut source = match self {
            Self::TemplateSyntax { source, .. } | Self::RenderExecution(source) => {
                std::error::Error::source(source)
            }
            _ => None,
        };
        while let Some(inner) = source {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            source = inner.source();
        }
        message
    }
}
