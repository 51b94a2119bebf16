use thiserror::Error;

/// A line that could not be turned into an [`Event`](super::Event).
///
/// Always recoverable: the caller drops the line and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed line: {reason}")]
pub struct MalformedLine {
    pub reason: MalformedReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("line does not match the extraction pattern")]
    NoMatch,

    #[error("status is not an integer")]
    InvalidStatus,

    #[error("bytes is not an integer")]
    InvalidBytes,

    #[error("request path has no segment")]
    MissingSection,
}

impl From<MalformedReason> for MalformedLine {
    fn from(reason: MalformedReason) -> Self {
        Self { reason }
    }
}

/// Returned by series queries made before the first bucket was appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("time series is empty")]
pub struct EmptySeries;
