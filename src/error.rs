//! Error types surfaced by the trip pipeline.

use thiserror::Error;

/// A backend response (or part of one) could not be decoded.
///
/// Decoding is all-or-nothing: any of these aborts the whole result.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON in `{field}`: {source}")]
    InvalidJson {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("record {record} of `{field}` has no `step`")]
    MissingStep { field: &'static str, record: usize },
    #[error("unrecognised geometry collection shape")]
    UnknownGeometryShape,
}

/// Failure of one submission, after validation passed.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Application-level error reported by the backend, verbatim.
    #[error("{0}")]
    Backend(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("backend returned status {status}: {body}")]
    Http { status: u16, body: String },
    #[error("could not encode payload: {0}")]
    Payload(#[source] serde_json::Error),
}

impl SimulationError {
    /// True for failures the user caused or can simply retry, as opposed
    /// to faults worth a diagnostic log.
    pub fn is_application_error(&self) -> bool {
        matches!(self, SimulationError::Backend(_))
    }
}

/// A shared-link parameter could not be turned back into steps.
#[derive(Debug, Error)]
pub enum ShareLinkError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing `{0}` query parameter")]
    MissingParameter(&'static str),
    #[error("invalid JSON in `{param}`: {source}")]
    InvalidJson {
        param: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("step {position} has {len} fields, expected 2 to 4")]
    BadTupleLength { position: usize, len: usize },
    #[error("step {position}: {message}")]
    InvalidField { position: usize, message: String },
    #[error("step {position}: extra value does not match transport `{mode}`")]
    ExtraMismatch { position: usize, mode: String },
    #[error("could not encode steps: {0}")]
    Encode(#[source] serde_json::Error),
}
