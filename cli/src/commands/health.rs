use anyhow::{bail, Context, Result};
use colored::*;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::OutputFormat;

/// Query `GET /api/v1/health` on a running server.
pub async fn execute(url: &str, format: OutputFormat) -> Result<()> {
    let endpoint = format!("{}/api/v1/health", url.trim_end_matches('/'));
    debug!("Requesting {}", endpoint);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;
    let response = client
        .get(&endpoint)
        .send()
        .await
        .with_context(|| format!("Server not reachable at {}", url))?;

    if !response.status().is_success() {
        bail!("Health check failed with status {}", response.status());
    }

    let health: Value = response.json().await.context("Invalid health response")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&health)?),
        OutputFormat::Text => print_health_text(&health),
    }

    Ok(())
}

fn print_health_text(health: &Value) {
    let status = health["status"].as_str().unwrap_or("unknown");
    let status = match status {
        "healthy" => status.green().bold(),
        _ => status.yellow().bold(),
    };

    println!("{} {}", "Status:".bold(), status);
    println!("  Version:  {}", health["version"].as_str().unwrap_or("-"));
    println!(
        "  Database: {}",
        health["database"]["message"].as_str().unwrap_or("-")
    );
}
