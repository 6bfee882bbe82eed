//! End-to-end pipeline tests against the scripted provider double

use std::sync::Arc;

use serde_json::json;

use uxr_sim::simulation::synthesis::{
    FALLBACK_KEY_INSIGHTS, FALLBACK_OBSERVATIONS, FALLBACK_TAKEAWAYS,
};
use uxr_sim::simulation::{StrategyKind, StudyRunner};

use super::common::{fast_retry, MockCompletion};

fn runner(mock: MockCompletion) -> StudyRunner {
    StudyRunner::with_retry(Arc::new(mock), fast_retry()).with_concurrency(2)
}

fn pink_iphone_request() -> serde_json::Value {
    json!({
        "question": "How would users feel about a pink iPhone?",
        "audience": "Gen Z",
        "numInterviews": 3,
        "numQuestions": 2
    })
}

#[tokio::test]
async fn test_happy_path_envelope() {
    let response = runner(MockCompletion::scripted())
        .run_study(&pink_iphone_request())
        .await;

    assert!(response.success);
    assert!(response.error.is_none());

    let data = response.data.unwrap();
    assert_eq!(data.participants.len(), 3);
    assert_eq!(data.all_interviews.len(), 3);
    assert_eq!(data.interview_questions.len(), 2);

    let ids: Vec<usize> = data.participants.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    assert!(!data.metadata.degraded);
    assert_eq!(data.metadata.workflow, StrategyKind::Primary);
    assert_eq!(data.key_insights, "Users want variety and reliability.");
    assert!(!data.observations.is_empty());
    assert!(!data.takeaways.is_empty());
}

#[tokio::test]
async fn test_transcript_order_matches_persona_order() {
    let response = runner(MockCompletion::scripted())
        .run_study(&json!({"question": "q?", "numInterviews": 4, "numQuestions": 1}))
        .await;

    let data = response.data.unwrap();
    for participant in &data.participants {
        let interview = participant.interview.as_ref().unwrap();
        assert_eq!(interview.persona.id, participant.id);
    }
    let interview_ids: Vec<usize> = data
        .all_interviews
        .iter()
        .map(|record| record.persona.id)
        .collect();
    assert_eq!(interview_ids, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_default_interview_count() {
    let response = runner(MockCompletion::scripted()).run_study(&json!({})).await;

    let data = response.data.unwrap();
    assert_eq!(data.participants.len(), 5);
    assert_eq!(data.all_interviews.len(), 5);
}

#[tokio::test]
async fn test_provider_down_still_completes() {
    let response = runner(MockCompletion::always_fail())
        .run_study(&pink_iphone_request())
        .await;

    assert!(response.success);
    let data = response.data.unwrap();

    assert_eq!(data.participants.len(), 3);
    assert!(data.participants.iter().all(|p| p.interview.is_some()));
    assert!(data.metadata.degraded);
    assert_eq!(data.metadata.workflow, StrategyKind::Fallback);

    assert_eq!(data.key_insights, FALLBACK_KEY_INSIGHTS);
    assert_eq!(data.observations, FALLBACK_OBSERVATIONS);
    assert_eq!(data.takeaways, FALLBACK_TAKEAWAYS);
}

#[tokio::test]
async fn test_persona_failure_only_degrades_that_stage() {
    let response = runner(MockCompletion::fail_matching("diverse user personas"))
        .run_study(&pink_iphone_request())
        .await;

    assert!(response.success);
    let data = response.data.unwrap();

    // the count invariant holds with template personas
    assert_eq!(data.participants.len(), 3);
    assert_eq!(data.participants[0].header, "Alex Rivera");
    assert!(data.metadata.degraded);

    // one failed stage does not switch the remaining pipeline: synthesis
    // still came from the provider
    assert_eq!(data.metadata.workflow, StrategyKind::Primary);
    assert_eq!(data.key_insights, "Users want variety and reliability.");
    assert_ne!(data.key_insights, FALLBACK_KEY_INSIGHTS);
}

#[tokio::test]
async fn test_non_object_request_is_rejected() {
    let response = runner(MockCompletion::scripted())
        .run_study(&json!("not a request"))
        .await;

    assert!(!response.success);
    assert!(response.data.is_none());
    assert!(response
        .error
        .unwrap()
        .contains("no runnable configuration"));
}

#[tokio::test]
async fn test_insight_fields_never_collide() {
    let response = runner(MockCompletion::scripted())
        .run_study(&pink_iphone_request())
        .await;

    let data = response.data.unwrap();
    for sentence in data
        .observations
        .split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        assert!(
            !data.takeaways.contains(sentence),
            "observation sentence duplicated in takeaways: {}",
            sentence
        );
    }
}
