//! Pipeline error taxonomy.
//!
//! Configuration problems never reach this type: the resolver recovers them
//! with defaults. Everything else is caught at the orchestrator boundary and
//! converted into a degrade transition; only [`PipelineError::FallbackExhausted`]
//! may surface to the caller.

use cerebras_client::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// The text-completion provider failed after retries
    #[error("provider error: {0}")]
    Provider(#[from] ClientError),

    /// Provider text did not match the expected structure, even heuristically
    #[error("parse error: {0}")]
    Parse(String),

    /// The request could not be resolved into any runnable configuration.
    /// The only error allowed to surface to the caller.
    #[error("no runnable configuration: {0}")]
    FallbackExhausted(String),
}

impl PipelineError {
    /// True for provider failures that retrying cannot fix (bad credential,
    /// rejected request). Drives the orchestrator's whole-pipeline switch.
    pub fn is_permanent_provider(&self) -> bool {
        matches!(self, PipelineError::Provider(err) if !err.is_transient())
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
