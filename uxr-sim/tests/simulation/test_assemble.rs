//! Envelope assembly and schema tests

use serde_json::json;

use uxr_sim::simulation::assemble::assemble;
use uxr_sim::simulation::config::resolve;
use uxr_sim::simulation::interview::scripted_transcript;
use uxr_sim::simulation::personas::fallback_personas;
use uxr_sim::simulation::questions::scripted_questions;
use uxr_sim::simulation::synthesis::fallback_synthesis;
use uxr_sim::simulation::{ExecutionReport, ResultEnvelope, StrategyKind};

fn fixture() -> ResultEnvelope {
    let config = resolve(&json!({
        "question": "How would users feel about a pink iPhone?",
        "audience": "Gen Z",
        "numInterviews": 2,
        "numQuestions": 2
    }));
    let personas = fallback_personas(&config, 1);
    let questions = scripted_questions(&config);
    let transcripts: Vec<_> = personas
        .iter()
        .map(|p| scripted_transcript(p, &questions))
        .collect();
    let report = ExecutionReport {
        workflow_used: StrategyKind::Fallback,
        execution_time_seconds: 0.04,
        degraded: true,
        failure_reasons: vec!["persona generation: provider error".into()],
    };

    assemble(
        &config,
        &personas,
        &transcripts,
        &questions,
        &fallback_synthesis(),
        &report,
    )
}

#[test]
fn test_participant_rows_map_persona_fields() {
    let envelope = fixture();

    assert_eq!(envelope.participants.len(), 2);
    let first = &envelope.participants[0];
    assert_eq!(first.id, 1);
    assert_eq!(first.header, "Alex Rivera");
    assert_eq!(first.kind, "Gen Z");
    assert_eq!(first.status, "pragmatic, budget-conscious");
    assert_eq!(first.target, "19");
    assert_eq!(first.limit, "Retail Associate");
    assert!(first.interview.is_some());
}

#[test]
fn test_all_interviews_is_the_flat_transcript_list() {
    let envelope = fixture();

    assert_eq!(envelope.all_interviews.len(), 2);
    assert_eq!(envelope.all_interviews[0].persona.id, 1);
    assert_eq!(envelope.all_interviews[1].persona.id, 2);
    assert_eq!(envelope.all_interviews[0].responses.len(), 2);
}

#[test]
fn test_envelope_serializes_with_dashboard_keys() {
    let envelope = fixture();
    let value = serde_json::to_value(&envelope).unwrap();

    assert!(value.get("keyInsights").is_some());
    assert!(value.get("key_insights").is_none());
    assert_eq!(value["participants"][0]["type"], "Gen Z");
    assert!(value["participants"][0].get("kind").is_none());
    assert_eq!(value["metadata"]["workflow"], "fallback");
    assert_eq!(value["metadata"]["degraded"], true);

    // scripted answers are not follow-ups, so the flag is omitted entirely
    let response = &value["all_interviews"][0]["responses"][0];
    assert!(response.get("is_followup").is_none());
}

#[test]
fn test_metadata_formats_execution_time() {
    let envelope = fixture();
    assert_eq!(envelope.metadata.execution_time, "0.0s");
    assert_eq!(envelope.metadata.workflow, StrategyKind::Fallback);
}

#[test]
fn test_envelope_round_trips_through_json() {
    let envelope = fixture();
    let json = serde_json::to_string(&envelope).unwrap();
    let back: ResultEnvelope = serde_json::from_str(&json).unwrap();

    assert_eq!(back.participants.len(), envelope.participants.len());
    assert_eq!(back.key_insights, envelope.key_insights);
    assert_eq!(back.metadata.degraded, envelope.metadata.degraded);
}
