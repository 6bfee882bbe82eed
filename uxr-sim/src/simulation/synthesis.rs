//! Insight synthesis and extraction.
//!
//! One provider call analyzes every transcript; the free-form answer is
//! sliced into the three insight fields by heading detection. The heading
//! grammar is an ordered list of canonical fields, each with a synonym set
//! and a first-writer-wins rule so the same content never lands in two
//! fields. Without any recognizable heading the text is split into three
//! sentence chunks; without any provider text at all the fixed placeholder
//! insights are returned.

use cerebras_client::{complete_with_retry, RetryPolicy, TextCompletion};

use crate::simulation::types::{InterviewTranscript, Persona, ResearchConfig, SynthesisResult};

pub const FALLBACK_KEY_INSIGHTS: &str =
    "Automated analysis unavailable: participant reactions to the research question were varied.";
pub const FALLBACK_OBSERVATIONS: &str = "Automated analysis unavailable: responses reflected \
each participant's background rather than a shared pattern.";
pub const FALLBACK_TAKEAWAYS: &str = "Automated analysis unavailable: review the raw interview \
transcripts before acting on these results.";

const DEFAULT_OBSERVATIONS: &str =
    "Participants showed varied perspectives based on their backgrounds and experiences.";
const DEFAULT_TAKEAWAYS: &str =
    "Consider implementing changes based on user feedback and identified patterns.";

/// Sentences kept per field by the markerless last-resort split.
const CHUNK_SENTENCES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CanonicalField {
    KeyInsights = 0,
    Observations = 1,
    Takeaways = 2,
}

/// Ordered heading grammar: canonical field and its recognized synonyms.
const HEADING_GRAMMAR: &[(CanonicalField, &[&str])] = &[
    (
        CanonicalField::KeyInsights,
        &["KEY THEMES", "KEY INSIGHTS", "THEMES"],
    ),
    (
        CanonicalField::Observations,
        &[
            "DIVERSE PERSPECTIVES",
            "OBSERVATIONS",
            "PAIN POINTS",
            "OPPORTUNITIES",
            "PERSPECTIVES",
        ],
    ),
    (
        CanonicalField::Takeaways,
        &["ACTIONABLE RECOMMENDATIONS", "RECOMMENDATIONS", "TAKEAWAYS"],
    ),
];

/// Run the synthesis call and extract the insight fields.
///
/// A provider failure is answered with the fixed placeholder insights and
/// reported to the caller; it never fails the run.
pub async fn extract(
    client: &dyn TextCompletion,
    retry: RetryPolicy,
    config: &ResearchConfig,
    personas: &[Persona],
    transcripts: &[InterviewTranscript],
) -> (SynthesisResult, Option<String>) {
    let prompt = build_synthesis_prompt(config, personas, transcripts);
    match complete_with_retry(client, &prompt, retry).await {
        Ok(text) => (from_analysis_text(&text), None),
        Err(err) => (fallback_synthesis(), Some(format!("synthesis: {}", err))),
    }
}

/// Fixed placeholder insights for a failed or skipped synthesis call.
pub fn fallback_synthesis() -> SynthesisResult {
    SynthesisResult {
        key_insights: FALLBACK_KEY_INSIGHTS.to_string(),
        observations: FALLBACK_OBSERVATIONS.to_string(),
        takeaways: FALLBACK_TAKEAWAYS.to_string(),
        full_text: format!(
            "KEY THEMES: {}\nOBSERVATIONS: {}\nTAKEAWAYS: {}",
            FALLBACK_KEY_INSIGHTS, FALLBACK_OBSERVATIONS, FALLBACK_TAKEAWAYS
        ),
    }
}

/// Slice free-form analysis text into the three insight fields.
pub fn from_analysis_text(text: &str) -> SynthesisResult {
    let mut fields: [Option<Vec<String>>; 3] = [None, None, None];
    let mut current: Option<usize> = None;

    for line in text.lines() {
        if let Some((field, rest)) = detect_marker(line) {
            let index = field as usize;
            if fields[index].is_some() {
                // first writer wins; a later synonym never overwrites
                current = None;
            } else {
                let mut content = Vec::new();
                if !rest.is_empty() {
                    content.push(clean_content_line(rest));
                }
                fields[index] = Some(content);
                current = Some(index);
            }
            continue;
        }

        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }
        if let Some(index) = current {
            if let Some(content) = fields[index].as_mut() {
                content.push(clean_content_line(stripped));
            }
        }
    }

    let no_markers = fields.iter().all(Option::is_none);
    let [key_insights, observations, takeaways] = if no_markers {
        three_chunks(text)
    } else {
        fields.map(|content| {
            content
                .map(|lines| lines.join("; "))
                .unwrap_or_default()
        })
    };

    let key_insights = if key_insights.is_empty() {
        first_sentence(text).unwrap_or_else(|| FALLBACK_KEY_INSIGHTS.to_string())
    } else {
        key_insights
    };
    let observations = if observations.is_empty() {
        DEFAULT_OBSERVATIONS.to_string()
    } else {
        observations
    };
    let takeaways = if takeaways.is_empty() {
        DEFAULT_TAKEAWAYS.to_string()
    } else {
        takeaways
    };
    let takeaways = drop_duplicated_sentences(&observations, takeaways);

    SynthesisResult {
        key_insights,
        observations,
        takeaways,
        full_text: text.to_string(),
    }
}

/// Find a heading marker on a line; returns the canonical field and the
/// content remaining after the marker (and its colon, if any).
fn detect_marker(line: &str) -> Option<(CanonicalField, &str)> {
    let upper = line.to_ascii_uppercase();
    for (field, markers) in HEADING_GRAMMAR {
        for marker in *markers {
            if let Some(pos) = upper.find(marker) {
                let rest = &line[pos + marker.len()..];
                let rest = match rest.find(':') {
                    Some(colon) => &rest[colon + 1..],
                    None => rest,
                };
                return Some((*field, rest.trim().trim_start_matches(['-', '*', '•']).trim()));
            }
        }
    }
    None
}

/// Strip bullet and numbering prefixes from a content line.
fn clean_content_line(line: &str) -> String {
    let line = line.trim();
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
        .unwrap_or(line);
    let line = line
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .strip_prefix(". ")
        .unwrap_or(line);
    line.trim().to_string()
}

/// Last-resort split when the text carries no recognizable headings:
/// three roughly equal sentence chunks, each truncated.
fn three_chunks(text: &str) -> [String; 3] {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return [String::new(), String::new(), String::new()];
    }

    let per_chunk = sentences.len().div_ceil(3);
    let mut chunks = sentences
        .chunks(per_chunk)
        .map(|chunk| {
            chunk
                .iter()
                .take(CHUNK_SENTENCES)
                .cloned()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>();
    chunks.resize(3, String::new());

    [chunks[0].clone(), chunks[1].clone(), chunks[2].clone()]
}

fn split_sentences(text: &str) -> Vec<String> {
    text.split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn first_sentence(text: &str) -> Option<String> {
    split_sentences(text).into_iter().next()
}

/// Conservative duplication rule: a sentence present verbatim in
/// `observations` is removed from `takeaways`.
fn drop_duplicated_sentences(observations: &str, takeaways: String) -> String {
    let observed: Vec<String> = split_sentences(observations);
    let sentences = split_sentences(&takeaways);
    let kept: Vec<String> = sentences
        .iter()
        .filter(|sentence| !observed.contains(sentence))
        .cloned()
        .collect();

    if kept.len() == sentences.len() {
        return takeaways; // nothing dropped, keep the original text untouched
    }
    if kept.is_empty() {
        return DEFAULT_TAKEAWAYS.to_string();
    }
    kept.join(" ")
}

/// Compose the synthesis prompt from every transcript.
pub fn build_synthesis_prompt(
    config: &ResearchConfig,
    personas: &[Persona],
    transcripts: &[InterviewTranscript],
) -> String {
    let mut summary = format!("Research Question: {}\n", config.question);
    summary.push_str(&format!("Target Demographic: {}\n", config.audience));
    summary.push_str(&format!("Number of Interviews: {}\n\n", transcripts.len()));

    for (index, transcript) in transcripts.iter().enumerate() {
        if let Some(persona) = personas.iter().find(|p| p.id == transcript.persona_id) {
            summary.push_str(&format!(
                "Interview {} - {} ({}, {}):\n",
                index + 1,
                persona.name,
                persona.age,
                persona.occupation
            ));
            summary.push_str(&format!("Persona Traits: {}\n", persona.traits.join(", ")));
        }
        for (qn, entry) in transcript.responses.iter().enumerate() {
            summary.push_str(&format!(
                "Q{}: {}\nA{}: {}\n",
                qn + 1,
                entry.question,
                qn + 1,
                entry.answer
            ));
        }
        summary.push('\n');
    }

    format!(
        "Analyze these {} user interviews about \"{}\" among {} and provide a concise yet \
         comprehensive analysis:\n\n\
         1. KEY THEMES: What patterns and common themes emerged across all interviews?\n\n\
         2. DIVERSE PERSPECTIVES: What different viewpoints or unique insights did \
         different personas provide?\n\n\
         3. PAIN POINTS & OPPORTUNITIES: What challenges, frustrations, or unmet needs \
         were identified?\n\n\
         4. ACTIONABLE RECOMMENDATIONS: Based on these insights, what specific actions \
         should be taken?\n\n\
         Keep the analysis thorough but well-organized and actionable.\n\n\
         Interview Data:\n{}",
        transcripts.len(),
        config.question,
        config.audience,
        summary
    )
}
