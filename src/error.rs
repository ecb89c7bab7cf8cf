use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    /// The file is neither a gzip-compressed tar nor a plain tar.
    #[error("Cannot open archive {path}: {reason}")]
    ArchiveOpen { path: PathBuf, reason: String },

    /// No `scandata` member, or it could not be decoded.
    #[error("Scan manifest missing or unreadable: {0}")]
    ManifestMissing(String),

    /// I/O failure while materializing archive members into the workspace.
    #[error("Extraction failed for {member}: {source}")]
    Extraction {
        member: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No report for {0}")]
    NotFound(String),

    #[error("Parent directory {parent} of {path} is not in the tree")]
    PathInconsistency { path: String, parent: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ViewerError {
    /// Recoverable errors skip one item; everything else aborts the operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ViewerError::NotFound(_) | ViewerError::PathInconsistency { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_lookup_and_tree_errors_are_recoverable() {
        assert!(ViewerError::NotFound("x".into()).is_recoverable());
        assert!(ViewerError::PathInconsistency {
            path: "a/b".into(),
            parent: "a".into()
        }
        .is_recoverable());
        assert!(!ViewerError::ManifestMissing("gone".into()).is_recoverable());
        assert!(!ViewerError::ArchiveOpen {
            path: PathBuf::from("x.tar"),
            reason: "bad".into()
        }
        .is_recoverable());
    }
}
