//! Interview script planning.
//!
//! The script is generated once per run and shared read-only across all
//! interviews. The provider is asked for a JSON array; prose answers are
//! salvaged line by line before giving up.

use cerebras_client::{complete_with_retry, RetryPolicy, TextCompletion};

use crate::simulation::error::{PipelineError, PipelineResult};
use crate::simulation::types::{QuestionSet, ResearchConfig};

/// Plan the interview script with one provider call.
///
/// The result always holds exactly `config.num_questions` entries: surplus
/// questions are dropped, a shortfall is padded from the scripted set.
pub async fn plan(
    client: &dyn TextCompletion,
    retry: RetryPolicy,
    config: &ResearchConfig,
) -> PipelineResult<QuestionSet> {
    let prompt = build_question_prompt(config);
    let text = complete_with_retry(client, &prompt, retry).await?;

    let mut questions = parse_questions(&text);
    if questions.is_empty() {
        return Err(PipelineError::Parse(
            "no interview questions found in provider output".into(),
        ));
    }

    questions.truncate(config.num_questions);
    let scripted = scripted_questions(config);
    for filler in scripted {
        if questions.len() >= config.num_questions {
            break;
        }
        if !questions.contains(&filler) {
            questions.push(filler);
        }
    }
    // scripted fillers can collide with generated questions; cycle until full
    let mut index = 0;
    while questions.len() < config.num_questions {
        questions.push(format!(
            "Is there anything else about this topic you want to share? ({})",
            index + 1
        ));
        index += 1;
    }

    Ok(questions)
}

fn build_question_prompt(config: &ResearchConfig) -> String {
    format!(
        "Generate exactly {} interview questions about: \"{}\"\n\n\
         Requirements:\n\
         - Each question must be open-ended (not yes/no)\n\
         - Keep questions conversational and clear\n\
         - Focus on understanding user feelings, motivations, and experiences\n\
         - Return as JSON array of strings",
        config.num_questions, config.question
    )
}

/// Extract questions from provider text: strict JSON array first, then one
/// question per line.
pub fn parse_questions(text: &str) -> Vec<String> {
    if let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) {
        if start < end {
            if let Ok(parsed) = serde_json::from_str::<Vec<String>>(&text[start..=end]) {
                let parsed: Vec<String> = parsed
                    .into_iter()
                    .map(|q| q.trim().to_string())
                    .filter(|q| !q.is_empty())
                    .collect();
                if !parsed.is_empty() {
                    return parsed;
                }
            }
        }
    }

    text.lines()
        .map(strip_listing)
        .filter(|line| line.contains('?'))
        .map(str::to_string)
        .collect()
}

/// Strip bullets, numbering, and stray JSON punctuation from a line.
fn strip_listing(line: &str) -> &str {
    let line = line
        .trim()
        .trim_start_matches(['-', '*', '•'])
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .trim_start_matches(['.', ')'])
        .trim();
    line.trim_matches(['"', ','].as_slice()).trim()
}

/// Deterministic interview script used by the fallback path.
pub fn scripted_questions(config: &ResearchConfig) -> QuestionSet {
    let templates = [
        format!("How do you feel about {}?", config.question),
        "What concerns or excitement does this bring up for you?".to_string(),
        "How might this impact your daily routine?".to_string(),
        "What would make this more appealing to you?".to_string(),
        "Can you describe a recent experience that shaped your view on this?".to_string(),
        "Who else do you think would care about this, and why?".to_string(),
    ];

    (0..config.num_questions)
        .map(|i| templates[i % templates.len()].clone())
        .collect()
}
