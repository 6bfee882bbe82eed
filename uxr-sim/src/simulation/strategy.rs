//! Primary and fallback execution strategies.
//!
//! One interface, two implementations: the provider-backed primary path and
//! the deterministic fallback the orchestrator swaps in on failure. The
//! fallback never fails, which is what guarantees every run reaches a valid
//! result.

use std::sync::Arc;

use async_trait::async_trait;
use cerebras_client::{RetryPolicy, TextCompletion};

use crate::simulation::error::PipelineResult;
use crate::simulation::interview::{self, InterviewOutcome};
use crate::simulation::types::{
    InterviewTranscript, Persona, QuestionSet, ResearchConfig, StrategyKind, SynthesisResult,
};
use crate::simulation::{personas, questions, synthesis};

/// Stage operations shared by both execution strategies.
#[async_trait]
pub trait ResearchStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn plan_questions(&self, config: &ResearchConfig) -> PipelineResult<QuestionSet>;

    async fn generate_personas(&self, config: &ResearchConfig) -> PipelineResult<Vec<Persona>>;

    async fn run_interview(
        &self,
        config: &ResearchConfig,
        persona: &Persona,
        questions: &[String],
    ) -> InterviewOutcome;

    /// Returns the synthesis plus the failure reason when the provider call
    /// had to be substituted with placeholder insights.
    async fn synthesize(
        &self,
        config: &ResearchConfig,
        personas: &[Persona],
        transcripts: &[InterviewTranscript],
    ) -> (SynthesisResult, Option<String>);
}

/// Provider-backed strategy; every call goes through the shared retry
/// decorator.
pub struct PrimaryStrategy {
    client: Arc<dyn TextCompletion>,
    retry: RetryPolicy,
}

impl PrimaryStrategy {
    pub fn new(client: Arc<dyn TextCompletion>, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }
}

#[async_trait]
impl ResearchStrategy for PrimaryStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Primary
    }

    async fn plan_questions(&self, config: &ResearchConfig) -> PipelineResult<QuestionSet> {
        questions::plan(self.client.as_ref(), self.retry, config).await
    }

    async fn generate_personas(&self, config: &ResearchConfig) -> PipelineResult<Vec<Persona>> {
        personas::generate(self.client.as_ref(), self.retry, config).await
    }

    async fn run_interview(
        &self,
        config: &ResearchConfig,
        persona: &Persona,
        questions: &[String],
    ) -> InterviewOutcome {
        interview::run(self.client.as_ref(), self.retry, config, persona, questions).await
    }

    async fn synthesize(
        &self,
        config: &ResearchConfig,
        personas: &[Persona],
        transcripts: &[InterviewTranscript],
    ) -> (SynthesisResult, Option<String>) {
        synthesis::extract(self.client.as_ref(), self.retry, config, personas, transcripts).await
    }
}

/// Deterministic strategy: template personas, scripted non-adaptive answers,
/// fixed synthesis. Infallible by construction.
pub struct FallbackStrategy;

#[async_trait]
impl ResearchStrategy for FallbackStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Fallback
    }

    async fn plan_questions(&self, config: &ResearchConfig) -> PipelineResult<QuestionSet> {
        Ok(questions::scripted_questions(config))
    }

    async fn generate_personas(&self, config: &ResearchConfig) -> PipelineResult<Vec<Persona>> {
        Ok(personas::fallback_personas(config, 1))
    }

    async fn run_interview(
        &self,
        _config: &ResearchConfig,
        persona: &Persona,
        questions: &[String],
    ) -> InterviewOutcome {
        InterviewOutcome {
            transcript: interview::scripted_transcript(persona, questions),
            failure: None,
        }
    }

    async fn synthesize(
        &self,
        _config: &ResearchConfig,
        _personas: &[Persona],
        _transcripts: &[InterviewTranscript],
    ) -> (SynthesisResult, Option<String>) {
        (synthesis::fallback_synthesis(), None)
    }
}
