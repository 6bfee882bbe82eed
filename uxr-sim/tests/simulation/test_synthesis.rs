//! Heading extraction and insight fallback tests

use serde_json::json;

use uxr_sim::simulation::config::resolve;
use uxr_sim::simulation::interview::scripted_transcript;
use uxr_sim::simulation::personas::fallback_personas;
use uxr_sim::simulation::questions::scripted_questions;
use uxr_sim::simulation::synthesis::{
    build_synthesis_prompt, extract, fallback_synthesis, from_analysis_text,
    FALLBACK_KEY_INSIGHTS, FALLBACK_OBSERVATIONS, FALLBACK_TAKEAWAYS,
};

use super::common::{fast_retry, MockCompletion};

#[test]
fn test_marker_slicing() {
    let result = from_analysis_text(
        "KEY THEMES: Users want variety\nPAIN POINTS: confusion\nTAKEAWAYS: ship pastel colors",
    );

    assert_eq!(result.key_insights, "Users want variety");
    assert_eq!(result.observations, "confusion");
    assert_eq!(result.takeaways, "ship pastel colors");
}

#[test]
fn test_first_writer_wins_across_synonyms() {
    let result = from_analysis_text(
        "OBSERVATIONS: participants compared it to older models\n\
         PAIN POINTS: the price came up in every session\n\
         RECOMMENDATIONS: publish a comparison page",
    );

    // PAIN POINTS is a later synonym of the already-filled observations field
    assert_eq!(
        result.observations,
        "participants compared it to older models"
    );
    assert!(!result.takeaways.contains("price"));
}

#[test]
fn test_content_spanning_lines_is_joined() {
    let result = from_analysis_text(
        "KEY THEMES:\n- color matters\n- price matters\nTAKEAWAYS: test with a larger group",
    );

    assert_eq!(result.key_insights, "color matters; price matters");
    assert_eq!(result.takeaways, "test with a larger group");
}

#[test]
fn test_markerless_text_splits_into_three_chunks() {
    let result = from_analysis_text(
        "People liked the color. They worried about price. Some wanted more options. \
         Battery life was praised. Cases are a concern. Resale value came up.",
    );

    assert_eq!(result.key_insights, "People liked the color. They worried about price.");
    assert_eq!(result.observations, "Some wanted more options. Battery life was praised.");
    assert_eq!(result.takeaways, "Cases are a concern. Resale value came up.");
}

#[test]
fn test_empty_text_still_yields_non_empty_fields() {
    let result = from_analysis_text("");

    assert!(!result.key_insights.is_empty());
    assert!(!result.observations.is_empty());
    assert!(!result.takeaways.is_empty());
}

#[test]
fn test_observation_sentences_are_dropped_from_takeaways() {
    let result = from_analysis_text(
        "OBSERVATIONS: Users love blue.\nTAKEAWAYS: Users love blue. Ship blue first.",
    );

    assert_eq!(result.observations, "Users love blue.");
    assert_eq!(result.takeaways, "Ship blue first.");
}

#[test]
fn test_fully_duplicated_takeaways_fall_back_to_default() {
    let result =
        from_analysis_text("OBSERVATIONS: Users love blue.\nTAKEAWAYS: Users love blue.");

    assert_eq!(result.observations, "Users love blue.");
    assert!(!result.takeaways.is_empty());
    assert_ne!(result.takeaways, result.observations);
}

#[test]
fn test_fallback_synthesis_is_fixed_and_labeled() {
    let fallback = fallback_synthesis();
    assert_eq!(fallback.key_insights, FALLBACK_KEY_INSIGHTS);
    assert_eq!(fallback.observations, FALLBACK_OBSERVATIONS);
    assert_eq!(fallback.takeaways, FALLBACK_TAKEAWAYS);
    assert!(fallback.key_insights.starts_with("Automated analysis unavailable"));
}

#[tokio::test]
async fn test_extract_substitutes_placeholders_on_provider_failure() {
    let config = resolve(&json!({"numInterviews": 2, "numQuestions": 1}));
    let personas = fallback_personas(&config, 1);
    let questions = scripted_questions(&config);
    let transcripts: Vec<_> = personas
        .iter()
        .map(|p| scripted_transcript(p, &questions))
        .collect();

    let mock = MockCompletion::always_fail();
    let (result, failure) = extract(&mock, fast_retry(), &config, &personas, &transcripts).await;

    assert!(failure.unwrap().starts_with("synthesis:"));
    assert_eq!(result.key_insights, FALLBACK_KEY_INSIGHTS);
}

#[test]
fn test_prompt_contains_every_transcript() {
    let config = resolve(&json!({"numInterviews": 2, "numQuestions": 2}));
    let personas = fallback_personas(&config, 1);
    let questions = scripted_questions(&config);
    let transcripts: Vec<_> = personas
        .iter()
        .map(|p| scripted_transcript(p, &questions))
        .collect();

    let prompt = build_synthesis_prompt(&config, &personas, &transcripts);
    assert!(prompt.contains("Interview 1 - Alex Rivera"));
    assert!(prompt.contains("Interview 2 - Jordan Kim"));
    assert!(prompt.contains("Q1:"));
    assert!(prompt.contains("A2:"));
}
