use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures surfaced by corpus loading and the processing pipelines.
///
/// `DirectoryNotFound` and `InvalidParameter` abort a run; the per-file
/// variants are logged and counted by the batch loops.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Could not read {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not write {}: {reason}", path.display())]
    FileUnwritable { path: PathBuf, reason: String },

    #[error("Could not decode {}: {reason}", path.display())]
    DecodeFailure { path: PathBuf, reason: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl PipelineError {
    pub fn unreadable(path: &Path, source: std::io::Error) -> Self {
        PipelineError::FileUnreadable {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn unwritable(path: &Path, reason: impl ToString) -> Self {
        PipelineError::FileUnwritable {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_path() {
        let err = PipelineError::DirectoryNotFound(PathBuf::from("/no/such/dir"));
        assert_eq!(err.to_string(), "Directory not found: /no/such/dir");

        let err = PipelineError::DecodeFailure {
            path: PathBuf::from("a.png"),
            reason: "bad header".into(),
        };
        assert!(err.to_string().contains("a.png"));
        assert!(err.to_string().contains("bad header"));

        let err = PipelineError::unwritable(Path::new("out.png"), "denied");
        assert_eq!(err.to_string(), "Could not write out.png: denied");
    }
}
