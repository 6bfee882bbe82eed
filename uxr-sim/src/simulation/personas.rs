//! Persona generation.
//!
//! One provider call requests all personas as a JSON array. Parsing is
//! two-tier: a strict structured parse over the first array found in the
//! response, then a line-based heuristic for prose answers. The generator
//! retries when parsing fails or names collide; the deterministic template
//! pool backs the fallback path and tops up short batches.

use std::collections::HashSet;

use cerebras_client::{complete_with_retry, RetryPolicy, TextCompletion};
use serde_json::Value;

use crate::simulation::error::{PipelineError, PipelineResult};
use crate::simulation::types::{Persona, ResearchConfig};

/// Attempts at a diverse, parseable batch before keeping what we have.
const MAX_GENERATION_ATTEMPTS: u32 = 3;

const DEFAULT_AGE: u32 = 25;

const FALLBACK_NAMES: &[&str] = &[
    "Alex Rivera",
    "Jordan Kim",
    "Sam Patel",
    "Casey Nguyen",
    "Morgan Lee",
    "Riley Okafor",
    "Taylor Brooks",
    "Jamie Alvarez",
    "Drew Tanaka",
    "Avery Johnson",
];

const FALLBACK_OCCUPATIONS: &[&str] = &[
    "Retail Associate",
    "Graduate Student",
    "Software Developer",
    "Nurse",
    "Graphic Designer",
    "Teacher",
    "Barista",
    "Marketing Coordinator",
];

const FALLBACK_TRAITS: &[[&str; 2]] = &[
    ["pragmatic", "budget-conscious"],
    ["curious", "early adopter"],
    ["skeptical", "detail-oriented"],
    ["social", "trend-aware"],
    ["cautious", "brand-loyal"],
    ["outspoken", "value-driven"],
];

const FALLBACK_STYLES: &[&str] = &["casual", "enthusiastic", "skeptical", "formal"];

/// Generate exactly `config.num_interviews` personas with unique ids 1..N.
///
/// Provider and parse failures propagate so the orchestrator can degrade the
/// stage; a name collision triggers a regeneration, and after the attempt
/// budget duplicates are kept rather than failing the run.
pub async fn generate(
    client: &dyn TextCompletion,
    retry: RetryPolicy,
    config: &ResearchConfig,
) -> PipelineResult<Vec<Persona>> {
    let prompt = build_persona_prompt(config);
    let mut last_parse_error = None;

    for attempt in 0..MAX_GENERATION_ATTEMPTS {
        let text = complete_with_retry(client, &prompt, retry).await?;

        match parse_personas(&text, config) {
            Ok(personas) => {
                if has_duplicate_names(&personas) && attempt + 1 < MAX_GENERATION_ATTEMPTS {
                    continue;
                }
                return Ok(personas);
            }
            Err(err) => last_parse_error = Some(err),
        }
    }

    Err(last_parse_error.unwrap_or_else(|| {
        PipelineError::Parse("persona generation produced no parseable output".into())
    }))
}

fn build_persona_prompt(config: &ResearchConfig) -> String {
    format!(
        "Generate exactly {} diverse user personas for researching: \"{}\"\n\
         Target audience: {}\n\n\
         Create realistic, detailed personas with varied backgrounds that would have \
         different perspectives on this topic. Consider different demographics, values, \
         lifestyles, and relevant experiences that would influence their opinion.\n\n\
         Return ONLY a JSON array with this exact structure:\n\
         [\n  {{\n    \"name\": \"First Last\",\n    \"age\": 22,\n    \"job\": \"Job Title\",\n    \
         \"traits\": [\"trait1\", \"trait2\", \"trait3\"],\n    \
         \"communication_style\": \"casual/formal/enthusiastic/skeptical etc\",\n    \
         \"background\": \"relevant detail that influences their perspective\"\n  }}\n]\n\n\
         Make each persona unique with different ages, varied jobs, distinct personalities, \
         and backgrounds that would lead to diverse opinions about: {}",
        config.num_interviews, config.question, config.audience, config.question
    )
}

/// Parse provider text into exactly `config.num_interviews` personas.
///
/// Fewer parseable personas than requested is a parse failure for the
/// attempt; a surplus is truncated. Ids are assigned in generation order.
pub fn parse_personas(text: &str, config: &ResearchConfig) -> PipelineResult<Vec<Persona>> {
    let mut personas = parse_structured(text, config);
    if personas.is_empty() {
        personas = parse_prose(text, config);
    }

    if personas.len() < config.num_interviews {
        return Err(PipelineError::Parse(format!(
            "expected {} personas, found {}",
            config.num_interviews,
            personas.len()
        )));
    }

    personas.truncate(config.num_interviews);
    for (index, persona) in personas.iter_mut().enumerate() {
        persona.id = index + 1;
    }
    Ok(personas)
}

/// Strict parse: first JSON array in the response.
fn parse_structured(text: &str, config: &ResearchConfig) -> Vec<Persona> {
    let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) else {
        return Vec::new();
    };
    if end <= start {
        return Vec::new();
    }
    let Ok(value) = serde_json::from_str::<Value>(&text[start..=end]) else {
        return Vec::new();
    };
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let name = item["name"].as_str()?.trim().to_string();
            if name.is_empty() {
                return None;
            }
            Some(Persona {
                id: 0, // assigned after parsing
                name,
                audience_type: config.audience.clone(),
                traits: item["traits"]
                    .as_array()
                    .map(|seq| {
                        seq.iter()
                            .filter_map(|t| t.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default(),
                age: coerce_age(&item["age"]),
                occupation: item["job"]
                    .as_str()
                    .or_else(|| item["occupation"].as_str())
                    .unwrap_or("Unknown")
                    .to_string(),
                communication_style: item["communication_style"]
                    .as_str()
                    .unwrap_or("casual")
                    .to_string(),
                background: item["background"]
                    .as_str()
                    .unwrap_or("general user")
                    .to_string(),
            })
        })
        .collect()
}

fn coerce_age(value: &Value) -> u32 {
    value
        .as_u64()
        .map(|age| age as u32)
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .unwrap_or(DEFAULT_AGE)
}

/// Heuristic parse for prose answers: `key: value` lines, one persona per
/// `name:` occurrence.
fn parse_prose(text: &str, config: &ResearchConfig) -> Vec<Persona> {
    let mut personas = Vec::new();
    let mut current: Option<Persona> = None;

    for line in text.lines() {
        let line = line.trim().trim_start_matches(['-', '*', '•']).trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().trim_matches('"').to_ascii_lowercase();
        let value = value.trim().trim_matches(['"', ','].as_slice()).trim();
        if value.is_empty() {
            continue;
        }

        match key.as_str() {
            "name" => {
                if let Some(done) = current.take() {
                    personas.push(done);
                }
                current = Some(Persona {
                    id: 0,
                    name: value.to_string(),
                    audience_type: config.audience.clone(),
                    traits: Vec::new(),
                    age: DEFAULT_AGE,
                    occupation: "Unknown".to_string(),
                    communication_style: "casual".to_string(),
                    background: "general user".to_string(),
                });
            }
            "age" => {
                if let (Some(persona), Ok(age)) = (current.as_mut(), value.parse()) {
                    persona.age = age;
                }
            }
            "job" | "occupation" => {
                if let Some(persona) = current.as_mut() {
                    persona.occupation = value.to_string();
                }
            }
            "traits" => {
                if let Some(persona) = current.as_mut() {
                    persona.traits = value
                        .trim_matches(['[', ']'].as_slice())
                        .split(',')
                        .map(|t| t.trim().trim_matches('"').to_string())
                        .filter(|t| !t.is_empty())
                        .collect();
                }
            }
            "communication_style" | "communication style" => {
                if let Some(persona) = current.as_mut() {
                    persona.communication_style = value.to_string();
                }
            }
            "background" => {
                if let Some(persona) = current.as_mut() {
                    persona.background = value.to_string();
                }
            }
            _ => {}
        }
    }

    if let Some(done) = current.take() {
        personas.push(done);
    }
    personas
}

fn has_duplicate_names(personas: &[Persona]) -> bool {
    let mut seen = HashSet::new();
    personas
        .iter()
        .any(|p| !seen.insert(p.name.to_ascii_lowercase()))
}

/// Deterministic template personas for the fallback path.
///
/// Generates ids `start_id..=config.num_interviews`, so it can both replace a
/// failed batch (`start_id = 1`) and top up a short one.
pub fn fallback_personas(config: &ResearchConfig, start_id: usize) -> Vec<Persona> {
    (start_id..=config.num_interviews)
        .map(|id| {
            let index = id - 1;
            let name = FALLBACK_NAMES
                .get(index)
                .map(|n| n.to_string())
                .unwrap_or_else(|| format!("Participant {}", id));
            let traits = FALLBACK_TRAITS[index % FALLBACK_TRAITS.len()];

            Persona {
                id,
                name,
                audience_type: config.audience.clone(),
                traits: traits.iter().map(|t| t.to_string()).collect(),
                age: 19 + ((index * 7) % 42) as u32,
                occupation: FALLBACK_OCCUPATIONS[index % FALLBACK_OCCUPATIONS.len()].to_string(),
                communication_style: FALLBACK_STYLES[index % FALLBACK_STYLES.len()].to_string(),
                background: format!(
                    "Has formed opinions about {} through day-to-day experience",
                    config.question
                ),
            }
        })
        .collect()
}
