//! Data structures for simulated research studies.

use serde::{Deserialize, Serialize};

/// Canonical study configuration produced by the resolver.
/// Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchConfig {
    pub question: String,
    pub audience: String,
    pub num_interviews: usize,
    pub num_questions: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_credential: Option<String>,
}

/// The interview script: generated once per run, shared read-only across
/// all interviews.
pub type QuestionSet = Vec<String>;

/// A synthetic interview subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    /// Sequential, 1-based, unique within a run
    pub id: usize,
    pub name: String,
    pub audience_type: String,
    pub traits: Vec<String>,
    pub age: u32,
    pub occupation: String,
    #[serde(default)]
    pub communication_style: String,
    #[serde(default)]
    pub background: String,
}

/// One question/answer exchange within a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEntry {
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_followup: bool,
}

/// The ordered question/answer record for one persona's interview.
/// References its persona by id; never mutated after the interview completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewTranscript {
    pub persona_id: usize,
    pub responses: Vec<ResponseEntry>,
}

/// Insight fields extracted from the aggregated analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub key_insights: String,
    pub observations: String,
    pub takeaways: String,
    /// Raw analysis text the fields were extracted from
    #[serde(default)]
    pub full_text: String,
}

/// Which execution strategy a stage (or the whole run) used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Primary,
    Fallback,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Primary => "primary",
            StrategyKind::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot threaded between pipeline stages.
///
/// Each stage receives the previous snapshot and the orchestrator replaces it
/// with an extended copy; stages never share mutable state.
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub config: ResearchConfig,
    pub question_set: QuestionSet,
    pub personas: Vec<Persona>,
    pub transcripts: Vec<InterviewTranscript>,
    pub strategy: StrategyKind,
}

impl PipelineState {
    pub fn new(config: ResearchConfig) -> Self {
        Self {
            config,
            question_set: Vec::new(),
            personas: Vec::new(),
            transcripts: Vec::new(),
            strategy: StrategyKind::Primary,
        }
    }

    pub fn with_questions(self, question_set: QuestionSet) -> Self {
        Self {
            question_set,
            ..self
        }
    }

    pub fn with_personas(self, personas: Vec<Persona>) -> Self {
        Self { personas, ..self }
    }

    pub fn with_transcripts(self, transcripts: Vec<InterviewTranscript>) -> Self {
        Self {
            transcripts,
            ..self
        }
    }

    pub fn with_strategy(self, strategy: StrategyKind) -> Self {
        Self { strategy, ..self }
    }
}

/// Orchestrator's account of how the run went; attached to the final result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub workflow_used: StrategyKind,
    pub execution_time_seconds: f64,
    pub degraded: bool,
    pub failure_reasons: Vec<String>,
}

/// A persona together with its transcript, as exposed to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewRecord {
    pub persona: Persona,
    pub responses: Vec<ResponseEntry>,
}

/// One row of the dashboard participant table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: usize,
    pub header: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub target: String,
    pub limit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview: Option<InterviewRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeMetadata {
    pub workflow: StrategyKind,
    pub execution_time: String,
    pub degraded: bool,
}

/// Externally-visible result schema consumed by the dashboard layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEnvelope {
    #[serde(rename = "keyInsights")]
    pub key_insights: String,
    pub observations: String,
    pub takeaways: String,
    pub participants: Vec<Participant>,
    pub all_interviews: Vec<InterviewRecord>,
    pub interview_questions: Vec<String>,
    /// Full analysis text for the detail view
    pub synthesis: String,
    pub timestamp: String,
    pub metadata: EnvelopeMetadata,
}

/// Response shape handed back to the request-forwarding layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResultEnvelope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
