//! Simulated user-research pipeline
//!
//! This module runs a research study end-to-end: resolve the caller's request
//! into a canonical config, plan the interview script, generate personas,
//! interview each persona concurrently, synthesize insights from all
//! transcripts, and assemble the externally-visible result envelope.
//!
//! Every stage that talks to the text-completion provider has a deterministic
//! fallback; the orchestrator in [`workflow`] substitutes fallbacks on failure
//! so a run always completes with a schema-valid result.

pub mod assemble;
pub mod cli;
pub mod config;
pub mod error;
pub mod interview;
pub mod personas;
pub mod questions;
pub mod strategy;
pub mod synthesis;
pub mod types;
pub mod workflow;

// Re-export commonly used types
pub use error::{PipelineError, PipelineResult};
pub use types::{
    ExecutionReport, InterviewTranscript, Persona, PipelineState, QuestionSet, ResearchConfig,
    ResponseEntry, ResultEnvelope, StrategyKind, StudyResponse, SynthesisResult,
};
pub use workflow::{run_study, StudyRunner};
