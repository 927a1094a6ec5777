//! Error types for histogram plotting
//!
//! - [`RenderError`]: drawing, encoding, and worker-process failures
//! - [`RetrievalError`]: failures of the results storage collaborator
//! - [`HistogramError`]: everything the plot service can surface

use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while producing a plot artifact.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The plotting backend refused to draw
    #[error("drawing failed: {0}")]
    Draw(String),

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// The worker process could not be started or talked to
    #[error("could not run render worker {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The worker exited without handing back a PNG
    #[error("render worker failed ({status}): {stderr}")]
    WorkerFailed { status: ExitStatus, stderr: String },

    /// The worker did not finish in time and was killed
    #[error("render worker timed out after {after:?}")]
    Timeout { after: Duration },

    /// A render job could not be encoded or decoded
    #[error("invalid render job: {0}")]
    Job(#[from] serde_json::Error),
}

/// Errors raised by a results storage backend.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// No stored results for this execution id
    #[error("no results stored for execution '{execution_id}'")]
    NotFound { execution_id: String },

    /// The backend failed while reading results
    #[error("failed to retrieve results for execution '{execution_id}'")]
    Backend {
        execution_id: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Main error type for the plot service
#[derive(Error, Debug)]
pub enum HistogramError {
    /// Propagated unchanged from the storage backend
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    /// Stored parameters cannot drive a plot
    #[error("invalid matchup parameters: {0}")]
    InvalidParams(String),

    /// Rendering failed
    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),
}

impl HistogramError {
    /// Whether this is the storage backend's not-found signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, HistogramError::Retrieval(RetrievalError::NotFound { .. }))
    }
}
