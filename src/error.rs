use std::path::PathBuf;
use thiserror::Error;

use crate::index::types::ArtifactKind;

/// Errors raised while building, writing or loading an index
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {artifact} artifact at line {line}: {reason}")]
    Malformed {
        artifact: ArtifactKind,
        line: usize,
        reason: String,
    },

    #[error("{artifact} artifact declares {declared} entries but contains {actual}")]
    CountMismatch {
        artifact: ArtifactKind,
        declared: usize,
        actual: usize,
    },

    #[error("index integrity violation: {0}")]
    Integrity(String),
}

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

impl IndexError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IndexError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(artifact: ArtifactKind, line: usize, reason: impl Into<String>) -> Self {
        IndexError::Malformed {
            artifact,
            line,
            reason: reason.into(),
        }
    }

    /// Whether the failure came from the artifact contents rather than the filesystem
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            IndexError::Malformed { .. }
                | IndexError::CountMismatch { .. }
                | IndexError::Integrity(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IndexError::malformed(ArtifactKind::Postings, 3, "expected 2 fields");
        assert_eq!(
            err.to_string(),
            "malformed postings artifact at line 3: expected 2 fields"
        );

        let err = IndexError::CountMismatch {
            artifact: ArtifactKind::Dictionary,
            declared: 4,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "dictionary artifact declares 4 entries but contains 2"
        );
    }

    #[test]
    fn test_corruption_classification() {
        let io = IndexError::io(
            "/missing/dictionary.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(!io.is_corruption());
        assert!(IndexError::Integrity("bad".into()).is_corruption());
    }
}
