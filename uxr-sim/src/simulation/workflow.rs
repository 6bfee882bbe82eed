//! Orchestration of the simulation pipeline.
//!
//! The run moves linearly through Resolving, GeneratingPersonas,
//! Interviewing, Synthesizing, and Assembling. Each stage is wrapped with
//! failure detection: an unrecovered failure substitutes that stage's
//! deterministic fallback and marks the run degraded, and a permanent
//! provider error (or two failed stages in a row) switches the remaining
//! pipeline to the fallback strategy outright. Once a request has been
//! resolved there is no fatal-abort path; the terminal state is always
//! reached.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use cerebras_client::{RetryPolicy, TextCompletion};
use uxr_sim_sdk::{
    log_degrade, log_interview_complete, log_interview_failed, log_interview_start,
    log_phase_complete, log_phase_start,
};

use crate::simulation::assemble::assemble;
use crate::simulation::error::PipelineError;
use crate::simulation::interview::InterviewOutcome;
use crate::simulation::strategy::{FallbackStrategy, PrimaryStrategy, ResearchStrategy};
use crate::simulation::types::{
    ExecutionReport, PipelineState, ResultEnvelope, StrategyKind, StudyResponse,
};
use crate::simulation::{config, personas};

pub const TOTAL_PHASES: usize = 5;

/// Upper bound on concurrent interviews, to respect provider rate limits.
pub const MAX_CONCURRENT_INTERVIEWS: usize = 4;

/// Consecutive stage failures that switch the remaining pipeline to the
/// fallback strategy.
const STAGE_FAILURE_SWITCH_THRESHOLD: usize = 2;

/// Tracks degrade transitions across the run.
struct DegradeTracker {
    degraded: bool,
    failures: Vec<String>,
    consecutive_failures: usize,
    switched: bool,
}

impl DegradeTracker {
    fn new() -> Self {
        Self {
            degraded: false,
            failures: Vec::new(),
            consecutive_failures: 0,
            switched: false,
        }
    }

    /// A fallback substitution happened (stage-level or per-interview).
    fn substitution(&mut self, phase: usize, reason: String) {
        self.degraded = true;
        log_degrade!(phase, &reason);
        self.failures.push(reason);
    }

    /// A whole stage failed on the primary path.
    fn stage_failed(&mut self, phase: usize, label: &str, err: &PipelineError) {
        self.substitution(phase, format!("{}: {}", label, err));
        self.consecutive_failures += 1;
        if err.is_permanent_provider()
            || self.consecutive_failures >= STAGE_FAILURE_SWITCH_THRESHOLD
        {
            self.switched = true;
        }
    }

    /// The primary path failed at stage level without a typed error
    /// (e.g. every interview in the stage degraded).
    fn escalate(&mut self) {
        self.consecutive_failures += 1;
        if self.consecutive_failures >= STAGE_FAILURE_SWITCH_THRESHOLD {
            self.switched = true;
        }
    }

    fn stage_ok(&mut self) {
        self.consecutive_failures = 0;
    }

    fn active(&self) -> StrategyKind {
        if self.switched {
            StrategyKind::Fallback
        } else {
            StrategyKind::Primary
        }
    }
}

/// Top-level controller: selects the primary or fallback strategy per stage
/// and degrades between them on failure.
pub struct StudyRunner {
    primary: Arc<dyn ResearchStrategy>,
    fallback: Arc<dyn ResearchStrategy>,
    max_concurrency: usize,
}

impl StudyRunner {
    pub fn new(client: Arc<dyn TextCompletion>) -> Self {
        Self::with_retry(client, RetryPolicy::default())
    }

    pub fn with_retry(client: Arc<dyn TextCompletion>, retry: RetryPolicy) -> Self {
        Self {
            primary: Arc::new(PrimaryStrategy::new(client, retry)),
            fallback: Arc::new(FallbackStrategy),
            max_concurrency: MAX_CONCURRENT_INTERVIEWS,
        }
    }

    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    fn pick(&self, tracker: &DegradeTracker) -> Arc<dyn ResearchStrategy> {
        if tracker.switched {
            self.fallback.clone()
        } else {
            self.primary.clone()
        }
    }

    /// Run a study and wrap the result in the caller-facing response shape.
    pub async fn run_study(&self, raw: &serde_json::Value) -> StudyResponse {
        match self.run(raw).await {
            Ok(envelope) => StudyResponse {
                success: true,
                data: Some(envelope),
                error: None,
            },
            Err(err) => StudyResponse {
                success: false,
                data: None,
                error: Some(err.to_string()),
            },
        }
    }

    /// Run the full pipeline.
    ///
    /// The only error is [`PipelineError::FallbackExhausted`], raised when
    /// the request cannot be interpreted as a configuration object at all;
    /// every other failure degrades into the fallback path.
    pub async fn run(&self, raw: &serde_json::Value) -> Result<ResultEnvelope, PipelineError> {
        if !raw.is_object() {
            return Err(PipelineError::FallbackExhausted(
                "request payload is not a JSON object".into(),
            ));
        }

        let start = Instant::now();
        let mut tracker = DegradeTracker::new();

        // Phase 0: Resolving. Normalize the request and plan the script.
        log_phase_start!(0, "Resolve Config", TOTAL_PHASES);
        let resolved = config::resolve(raw);
        eprintln!(
            "Planning {} interviews with {} questions each: {}",
            resolved.num_interviews, resolved.num_questions, resolved.question
        );

        let question_set = match self.pick(&tracker).plan_questions(&resolved).await {
            Ok(questions) => {
                tracker.stage_ok();
                questions
            }
            Err(err) => {
                tracker.stage_failed(0, "question planning", &err);
                crate::simulation::questions::scripted_questions(&resolved)
            }
        };
        let state = PipelineState::new(resolved)
            .with_questions(question_set)
            .with_strategy(tracker.active());
        log_phase_complete!(0, "Resolve Config");

        // Phase 1: GeneratingPersonas
        log_phase_start!(1, "Generate Personas", TOTAL_PHASES);
        let mut batch = match self.pick(&tracker).generate_personas(&state.config).await {
            Ok(personas) => {
                tracker.stage_ok();
                personas
            }
            Err(err) => {
                tracker.stage_failed(1, "persona generation", &err);
                personas::fallback_personas(&state.config, 1)
            }
        };
        // top up so the interview-count invariant holds even for a short batch
        if batch.len() < state.config.num_interviews {
            let next_id = batch.len() + 1;
            batch.extend(personas::fallback_personas(&state.config, next_id));
        }
        batch.truncate(state.config.num_interviews);
        let state = state.with_personas(batch).with_strategy(tracker.active());
        log_phase_complete!(1, "Generate Personas");

        // Phase 2: Interviewing. Concurrent under a bounded worker pool.
        log_phase_start!(2, "Run Interviews", TOTAL_PHASES);
        let outcomes = self
            .run_all_interviews(&state, self.pick(&tracker))
            .await;

        let mut failed_interviews = 0;
        let mut transcripts = Vec::with_capacity(outcomes.len());
        for (persona_id, outcome) in outcomes {
            if let Some(reason) = outcome.failure {
                tracker.substitution(2, format!("interview {}: {}", persona_id, reason));
                failed_interviews += 1;
            }
            transcripts.push(outcome.transcript);
        }
        if failed_interviews > 0 && failed_interviews == state.personas.len() {
            tracker.escalate();
        } else if failed_interviews == 0 {
            tracker.stage_ok();
        }
        let state = state
            .with_transcripts(transcripts)
            .with_strategy(tracker.active());
        log_phase_complete!(2, "Run Interviews");

        // Phase 3: Synthesizing. Join point: every transcript is in.
        log_phase_start!(3, "Synthesize Insights", TOTAL_PHASES);
        let (synthesis, synthesis_failure) = self
            .pick(&tracker)
            .synthesize(&state.config, &state.personas, &state.transcripts)
            .await;
        match synthesis_failure {
            Some(reason) => {
                tracker.substitution(3, reason);
                tracker.escalate();
            }
            None => tracker.stage_ok(),
        }
        log_phase_complete!(3, "Synthesize Insights");

        // Phase 4: Assembling
        log_phase_start!(4, "Assemble Result", TOTAL_PHASES);
        let report = ExecutionReport {
            workflow_used: tracker.active(),
            execution_time_seconds: start.elapsed().as_secs_f64(),
            degraded: tracker.degraded,
            failure_reasons: tracker.failures.clone(),
        };
        let envelope = assemble(
            &state.config,
            &state.personas,
            &state.transcripts,
            &state.question_set,
            &synthesis,
            &report,
        );
        log_phase_complete!(4, "Assemble Result");

        eprintln!(
            "Study complete: {} interviews in {:.1}s ({})",
            envelope.participants.len(),
            report.execution_time_seconds,
            report.workflow_used
        );

        Ok(envelope)
    }

    /// Run every persona's interview concurrently under the worker-pool cap.
    /// Results are re-sorted by persona id so transcript order matches
    /// persona order regardless of completion order.
    async fn run_all_interviews(
        &self,
        state: &PipelineState,
        strategy: Arc<dyn ResearchStrategy>,
    ) -> Vec<(usize, InterviewOutcome)> {
        let permits = self.max_concurrency.min(state.personas.len()).max(1);
        let sem = Arc::new(Semaphore::new(permits));

        let mut tasks = FuturesUnordered::new();
        for persona in state.personas.iter().cloned() {
            let sem = sem.clone();
            let strategy = strategy.clone();
            let config = state.config.clone();
            let questions = state.question_set.clone();

            tasks.push(async move {
                let _permit = sem.acquire().await.ok();
                log_interview_start!(persona.id, &persona.name);

                let outcome = strategy.run_interview(&config, &persona, &questions).await;
                match &outcome.failure {
                    Some(error) => log_interview_failed!(persona.id, error),
                    None => log_interview_complete!(persona.id, outcome.transcript.responses.len()),
                }
                (persona.id, outcome)
            });
        }

        let mut results = Vec::new();
        while let Some(result) = tasks.next().await {
            results.push(result);
        }
        results.sort_by_key(|(persona_id, _)| *persona_id);
        results
    }
}

/// Run a study with default retry and concurrency settings.
pub async fn run_study(raw: &serde_json::Value, client: Arc<dyn TextCompletion>) -> StudyResponse {
    StudyRunner::new(client).run_study(raw).await
}
