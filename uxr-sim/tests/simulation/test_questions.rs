//! Interview script planning tests

use serde_json::json;

use uxr_sim::simulation::config::resolve;
use uxr_sim::simulation::questions::{plan, scripted_questions};
use uxr_sim::simulation::{PipelineError, ResearchConfig};

use super::common::{fast_retry, MockCompletion};

fn config(num_questions: usize) -> ResearchConfig {
    resolve(&json!({
        "question": "How would users feel about a pink iPhone?",
        "numQuestions": num_questions
    }))
}

#[tokio::test]
async fn test_plan_truncates_to_requested_count() {
    let mock = MockCompletion::scripted();
    let questions = plan(&mock, fast_retry(), &config(2)).await.unwrap();

    // the double returns five questions; only two survive
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0], "How do you feel about this product?");
}

#[tokio::test]
async fn test_plan_pads_a_short_batch() {
    let mock = MockCompletion::scripted();
    let questions = plan(&mock, fast_retry(), &config(7)).await.unwrap();

    assert_eq!(questions.len(), 7);
    // padded entries come from the scripted set
    assert!(questions.contains(&"What concerns or excitement does this bring up for you?".to_string()));
}

#[tokio::test]
async fn test_plan_provider_error_propagates() {
    let mock = MockCompletion::always_fail();
    let err = plan(&mock, fast_retry(), &config(3)).await.unwrap_err();
    assert!(matches!(err, PipelineError::Provider(_)));
}

#[test]
fn test_scripted_questions_reference_the_research_question() {
    let questions = scripted_questions(&config(3));
    assert_eq!(questions.len(), 3);
    assert!(questions[0].contains("a pink iPhone"));
}
