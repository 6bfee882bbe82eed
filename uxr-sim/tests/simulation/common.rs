//! Common utilities for simulation tests

use async_trait::async_trait;
use cerebras_client::{ClientError, Result, RetryPolicy, TextCompletion};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Retry policy that keeps failing tests fast.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 2,
        base_delay: Duration::from_millis(1),
    }
}

/// How the scripted provider double behaves.
pub enum Behavior {
    /// Every call fails with a transient error
    AlwaysFail,
    /// Calls whose prompt contains the marker fail; the rest are scripted
    FailMatching(&'static str),
    /// Plausible canned responses for every stage
    Scripted,
    /// Interview answers are too short, forcing follow-ups
    ShortAnswers,
    /// Interview answers hedge, forcing follow-ups
    HedgedAnswers,
    /// Persona batches always reuse the same name
    DuplicateNames,
}

/// Scripted provider double. Routes prompts to canned responses by prompt
/// content so each pipeline stage can be driven independently.
pub struct MockCompletion {
    calls: AtomicUsize,
    behavior: Behavior,
}

impl MockCompletion {
    pub fn with(behavior: Behavior) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            behavior,
        }
    }

    pub fn scripted() -> Self {
        Self::with(Behavior::Scripted)
    }

    pub fn always_fail() -> Self {
        Self::with(Behavior::AlwaysFail)
    }

    pub fn fail_matching(marker: &'static str) -> Self {
        Self::with(Behavior::FailMatching(marker))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextCompletion for MockCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::AlwaysFail => Err(ClientError::Network("provider offline".into())),
            Behavior::FailMatching(marker) if prompt.contains(marker) => {
                Err(ClientError::Network("provider offline".into()))
            }
            Behavior::DuplicateNames if prompt.contains("diverse user personas") => {
                Ok(duplicate_persona_batch(requested_count(prompt)))
            }
            Behavior::ShortAnswers if is_interview_answer(prompt) => Ok("Fine.".to_string()),
            Behavior::HedgedAnswers if is_interview_answer(prompt) => Ok(
                "I guess it could work for people like me, but honestly I would have to try \
                 it for a while before forming a real opinion."
                    .to_string(),
            ),
            _ => Ok(scripted_response(prompt)),
        }
    }
}

fn is_interview_answer(prompt: &str) -> bool {
    prompt.contains("Answer the following question")
}

/// First integer mentioned in the prompt ("Generate exactly N ...").
fn requested_count(prompt: &str) -> usize {
    prompt
        .split_whitespace()
        .find_map(|word| word.parse().ok())
        .unwrap_or(3)
}

pub fn scripted_response(prompt: &str) -> String {
    if prompt.contains("interview questions about") {
        r#"["How do you feel about this product?", "What would you change about it?", "When would you use it?", "What concerns do you have?", "Who else might benefit from it?"]"#
            .to_string()
    } else if prompt.contains("diverse user personas") {
        persona_batch(requested_count(prompt))
    } else if prompt.contains("Generate ONE natural follow-up question") {
        "Could you walk me through why you feel that way?".to_string()
    } else if prompt.contains("Answer the follow-up question") {
        "When I think it through, it mostly comes down to cost and how well it would hold \
         up over a year of daily use."
            .to_string()
    } else if prompt.contains("Analyze these") {
        "KEY THEMES: Users want variety and reliability.\n\
         DIVERSE PERSPECTIVES: Opinions split by occupation and age.\n\
         PAIN POINTS & OPPORTUNITIES: Price sensitivity came up repeatedly.\n\
         ACTIONABLE RECOMMENDATIONS: Ship an entry-level option first."
            .to_string()
    } else {
        // interview answer: long and confident, so no follow-up triggers
        "Honestly, I would use this every day because it fits my commute and the price \
         seems fair for what it offers."
            .to_string()
    }
}

pub fn persona_batch(count: usize) -> String {
    let items: Vec<String> = (0..count)
        .map(|index| {
            format!(
                r#"{{"name": "Mock Person {id}", "age": {age}, "job": "Job {id}", "traits": ["curious", "practical"], "communication_style": "casual", "background": "test subject"}}"#,
                id = index + 1,
                age = 20 + index
            )
        })
        .collect();
    format!("[{}]", items.join(", "))
}

fn duplicate_persona_batch(count: usize) -> String {
    let items: Vec<String> = (0..count)
        .map(|index| {
            format!(
                r#"{{"name": "Mock Person 1", "age": {age}, "job": "Job {id}", "traits": ["curious"], "communication_style": "casual", "background": "test subject"}}"#,
                id = index + 1,
                age = 20 + index
            )
        })
        .collect();
    format!("[{}]", items.join(", "))
}
