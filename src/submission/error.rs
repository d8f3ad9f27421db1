use thiserror::Error;

use crate::{backend::BufferError, submission::RenderPath};

/// A failure confined to one render path. The path renders nothing this frame; other
/// paths are unaffected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("failed to create the {path:?} instance buffer")]
    Create {
        path: RenderPath,
        #[source]
        source: BufferError,
    },
    #[error("failed to grow the {path:?} instance buffer to {capacity} elements")]
    Resize {
        path: RenderPath,
        capacity: u64,
        #[source]
        source: BufferError,
    },
    #[error("failed to map the {path:?} instance buffer")]
    Map {
        path: RenderPath,
        #[source]
        source: BufferError,
    },
}

impl SubmissionError {
    pub fn path(&self) -> RenderPath {
        match self {
            SubmissionError::Create { path, .. }
            | SubmissionError::Resize { path, .. }
            | SubmissionError::Map { path, .. } => *path,
        }
    }
}
