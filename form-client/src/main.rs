//! Insurance Prediction - command-line form
//!
//! Collects the client fields, calls the prediction API and prints the result.

mod client;
mod form;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use prediction_core::{HealthStatus, RawRecord};

use client::{ClientConfig, PredictionClient};
use form::FormArgs;

#[derive(Parser)]
#[command(version, about = "Predict vehicle insurance purchase likelihood", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the prediction API
    #[arg(long, env = "API_URL", default_value = "http://localhost:5000")]
    api_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check whether the API is up and the model is loaded
    Health,

    /// Fill in the form and get a prediction
    Predict(FormArgs),

    /// Predict every record of a JSON array file
    Batch {
        /// Path to a JSON array of records
        #[arg(long)]
        file: PathBuf,
    },

    /// Show model and engine status
    Model,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let client = PredictionClient::new(ClientConfig {
        api_url: cli.api_url.clone(),
        timeout_seconds: cli.timeout,
    })?;

    match cli.command {
        Commands::Health => {
            let health = client.health().await?;
            match health.status {
                HealthStatus::Ok => println!("✅ API is up, model loaded"),
                HealthStatus::Error => println!("⚠️  API is up, but the model is not loaded"),
            }
        }
        Commands::Predict(args) => {
            let request = args.to_request();
            let result = client.predict(&args.to_record()).await?;
            print!("{}", form::render_result(&request, &result));
        }
        Commands::Batch { file } => {
            let records = read_records(&file)?;
            log::info!("Sending {} records from {}", records.len(), file.display());

            let predictions = client.predict_batch(&records).await?;
            for (index, class) in predictions.iter().enumerate() {
                println!("{}\t{}", index, class);
            }
        }
        Commands::Model => {
            let status = client.model_status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}

fn read_records(path: &Path) -> anyhow::Result<Vec<RawRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array of records", path.display()))
}
