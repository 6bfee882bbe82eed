//! CLI argument parsing for the study runner.

use anyhow::Context;
use clap::Parser;
use serde_json::{json, Value};

/// Simulated user-research study runner
#[derive(Parser, Debug, Clone)]
#[command(name = "uxr-sim", about = "Simulate a user-research study end-to-end")]
pub struct Args {
    /// Research question to investigate
    #[arg(short, long)]
    pub question: Option<String>,

    /// Target audience description
    #[arg(short, long)]
    pub audience: Option<String>,

    /// Number of simulated interviews (1-50)
    #[arg(short, long)]
    pub interviews: Option<i64>,

    /// Number of scripted questions per interview
    #[arg(short = 'n', long)]
    pub questions: Option<i64>,

    /// Provider API key (falls back to CEREBRAS_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Study request loaded from a YAML or JSON file; flags override its fields
    #[arg(short, long)]
    pub config: Option<String>,

    /// Maximum concurrent interviews
    #[arg(long, default_value = "4")]
    pub concurrency: usize,

    /// Write the result envelope JSON to this path
    #[arg(short, long)]
    pub output: Option<String>,
}

impl Args {
    /// Build the raw study request from the config file and flags.
    pub async fn into_request(self) -> anyhow::Result<Value> {
        let mut raw = match &self.config {
            Some(path) => {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("failed to read study config: {}", path))?;
                serde_yaml::from_str::<Value>(&content)
                    .with_context(|| format!("failed to parse study config: {}", path))?
            }
            None => json!({}),
        };

        let map = raw
            .as_object_mut()
            .context("study config file must contain a mapping")?;

        if let Some(question) = self.question {
            map.insert("question".into(), json!(question));
        }
        if let Some(audience) = self.audience {
            map.insert("audience".into(), json!(audience));
        }
        if let Some(interviews) = self.interviews {
            map.insert("numInterviews".into(), json!(interviews));
        }
        if let Some(questions) = self.questions {
            map.insert("numQuestions".into(), json!(questions));
        }
        if let Some(api_key) = self.api_key {
            map.insert("providerCredential".into(), json!(api_key));
        }

        Ok(raw)
    }
}
