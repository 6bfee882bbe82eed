//! Result assembly.
//!
//! Pure mapping from internal entities onto the dashboard schema; no
//! external calls. Table-display fields come straight from persona fields,
//! and each persona's transcript is attached under `interview`.

use chrono::Utc;

use crate::simulation::types::{
    EnvelopeMetadata, ExecutionReport, InterviewRecord, InterviewTranscript, Participant, Persona,
    ResearchConfig, ResultEnvelope, SynthesisResult,
};

pub fn assemble(
    config: &ResearchConfig,
    personas: &[Persona],
    transcripts: &[InterviewTranscript],
    question_set: &[String],
    synthesis: &SynthesisResult,
    report: &ExecutionReport,
) -> ResultEnvelope {
    let participants: Vec<Participant> = personas
        .iter()
        .map(|persona| {
            let interview = transcripts
                .iter()
                .find(|t| t.persona_id == persona.id)
                .map(|t| InterviewRecord {
                    persona: persona.clone(),
                    responses: t.responses.clone(),
                });

            Participant {
                id: persona.id,
                header: persona.name.clone(),
                kind: config.audience.clone(),
                status: display_traits(persona),
                target: persona.age.to_string(),
                limit: persona.occupation.clone(),
                interview,
            }
        })
        .collect();

    let all_interviews = participants
        .iter()
        .filter_map(|p| p.interview.clone())
        .collect();

    ResultEnvelope {
        key_insights: synthesis.key_insights.clone(),
        observations: synthesis.observations.clone(),
        takeaways: synthesis.takeaways.clone(),
        participants,
        all_interviews,
        interview_questions: question_set.to_vec(),
        synthesis: synthesis.full_text.clone(),
        timestamp: Utc::now().to_rfc3339(),
        metadata: EnvelopeMetadata {
            workflow: report.workflow_used,
            execution_time: format!("{:.1}s", report.execution_time_seconds),
            degraded: report.degraded,
        },
    }
}

/// First two traits, joined for the table's status column.
fn display_traits(persona: &Persona) -> String {
    if persona.traits.is_empty() {
        return "Unknown".to_string();
    }
    persona
        .traits
        .iter()
        .take(2)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}
