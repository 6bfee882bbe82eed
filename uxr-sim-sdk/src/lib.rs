//! Structured progress events for the simulation pipeline.
//!
//! Pipeline stages emit [`SimulationLog`] events to stderr with a sentinel
//! prefix so a supervising process (dashboard bridge, log collector) can pick
//! them out of ordinary diagnostic output. The `log_*!` macros are the
//! intended call sites; stages never construct events by hand.

use serde::{Deserialize, Serialize};

/// Sentinel prefix on every emitted event line.
pub const EVENT_PREFIX: &str = "__UXR_EVENT__:";

/// Structured logging events emitted by pipeline stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimulationLog {
    /// Pipeline stage started
    PhaseStarted {
        phase: usize,
        name: String,
        total_phases: usize,
    },
    /// Pipeline stage completed
    PhaseCompleted { phase: usize, name: String },
    /// Pipeline stage failed (before any fallback substitution)
    PhaseFailed {
        phase: usize,
        name: String,
        error: String,
    },
    /// A stage was substituted by its deterministic fallback
    StageDegraded { phase: usize, reason: String },
    /// One persona's interview started
    InterviewStarted {
        persona_id: usize,
        persona_name: String,
    },
    /// One persona's interview finished
    InterviewCompleted {
        persona_id: usize,
        responses: usize,
    },
    /// One persona's interview could not use the provider
    InterviewFailed { persona_id: usize, error: String },
    /// Free-form progress message
    Progress { message: String },
}

impl SimulationLog {
    /// Emit this event to stderr for collector parsing.
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            use std::io::Write;
            eprintln!("{}{}", EVENT_PREFIX, json);
            // Force flush stderr in async/concurrent contexts
            let _ = std::io::stderr().flush();
        }
    }
}

/// Helper macros for pipeline logging
#[macro_export]
macro_rules! log_phase_start {
    ($phase:expr, $name:expr, $total:expr) => {
        $crate::SimulationLog::PhaseStarted {
            phase: $phase,
            name: $name.to_string(),
            total_phases: $total,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_phase_complete {
    ($phase:expr, $name:expr) => {
        $crate::SimulationLog::PhaseCompleted {
            phase: $phase,
            name: $name.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_phase_failed {
    ($phase:expr, $name:expr, $error:expr) => {
        $crate::SimulationLog::PhaseFailed {
            phase: $phase,
            name: $name.to_string(),
            error: $error.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_degrade {
    ($phase:expr, $reason:expr) => {
        $crate::SimulationLog::StageDegraded {
            phase: $phase,
            reason: $reason.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_interview_start {
    ($id:expr, $name:expr) => {
        $crate::SimulationLog::InterviewStarted {
            persona_id: $id,
            persona_name: $name.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_interview_complete {
    ($id:expr, $responses:expr) => {
        $crate::SimulationLog::InterviewCompleted {
            persona_id: $id,
            responses: $responses,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_interview_failed {
    ($id:expr, $error:expr) => {
        $crate::SimulationLog::InterviewFailed {
            persona_id: $id,
            error: $error.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_progress {
    ($msg:expr) => {
        $crate::SimulationLog::Progress {
            message: $msg.to_string(),
        }
        .emit();
    };
}
