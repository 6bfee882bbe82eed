use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use cerebras_client::CerebrasClient;
use uxr_sim::simulation::{cli::Args, StudyRunner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    let concurrency = args.concurrency;
    let output = args.output.clone();
    let request = args.into_request().await?;

    let client = match request.get("providerCredential").and_then(|v| v.as_str()) {
        Some(key) => CerebrasClient::with_api_key(key),
        None => CerebrasClient::from_env(),
    };
    if !client.has_credential() {
        eprintln!("warning: no provider credential found; running the deterministic fallback pipeline");
    }

    let runner = StudyRunner::new(Arc::new(client)).with_concurrency(concurrency);
    let response = runner.run_study(&request).await;

    let json = serde_json::to_string_pretty(&response)?;
    if let Some(path) = output {
        tokio::fs::write(&path, &json)
            .await
            .with_context(|| format!("failed to write result to {}", path))?;
        eprintln!("result written to {}", path);
    }
    println!("{}", json);

    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}
