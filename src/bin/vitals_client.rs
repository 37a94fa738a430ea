//! Command-line driver for the client analysis flow.
//!
//! Usage: `vitals-client [openai|gemini] [today|week|month]`
//!
//! Reads `HEALTH_API_URL` and `HEALTH_STORE_URL` (see `config`), runs one
//! analysis over the stored records and prints the stored result as JSON.
use std::env;

use anyhow::{anyhow, Result};
use dotenvy::dotenv;

use vitals_insight::{
    client::{AnalysisClient, AnalysisOptions},
    config, DataScope, Provider,
};

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();
    dotenv().ok();

    let cfg = config::load_client_from_env()?;
    let client = AnalysisClient::from_config(&cfg).await?;
    let settings = client.storage().settings().await?;

    let mut args = env::args().skip(1);
    let provider = match args.next() {
        Some(label) => Provider::from_label(Some(&label)),
        None => settings.provider,
    };
    let data_scope = match args.next() {
        Some(label) => DataScope::from_label(&label)
            .ok_or_else(|| anyhow!("Unknown data scope '{}': expected today, week or month", label))?,
        None => settings.data_scope,
    };

    let outcome = client
        .run_analysis(AnalysisOptions {
            provider,
            frequency: settings.frequency,
            data_scope,
        })
        .await?;

    if outcome.used_fallback {
        eprintln!("Analysis service unavailable; stored the fallback result.");
    }
    println!("{}", serde_json::to_string_pretty(&outcome.result)?);

    Ok(())
}
