//! Content loading errors

use std::path::PathBuf;
use thiserror::Error;

use super::ContentKind;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid front-matter in {path}: {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid {kind} {path}: {reason}")]
    Invalid {
        kind: ContentKind,
        path: PathBuf,
        reason: String,
    },

    #[error("duplicate {kind} slug `{slug}`: {first} and {second}")]
    DuplicateSlug {
        kind: ContentKind,
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl ContentError {
    /// Whether this error only affects a single item.
    ///
    /// Per-item errors are logged and skipped during listing; the rest abort it.
    pub fn is_per_item(&self) -> bool {
        !matches!(self, ContentError::DuplicateSlug { .. })
    }
}
