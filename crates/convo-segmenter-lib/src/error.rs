use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while decoding or loading a message log.
///
/// Every variant is fatal for the input it came from: a log is either fully
/// valid and processed, or rejected without producing any transcripts.
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("record {index}: missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("record {index}: unparseable timestamp {value:?}")]
    InvalidTimestamp { index: usize, value: String },

    #[error("record {index}: unknown role {role:?} (expected \"user\" or \"assistant\")")]
    UnknownRole { index: usize, role: String },

    #[error("input is not a JSON array of message records: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SegmentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SegmentError::Io {
            path: path.into(),
            source,
        }
    }
}
