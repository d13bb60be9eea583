//! Lookup collection command

use anyhow::{Context, Result};
use rapport_core::{Config, ReportClient};

use super::client;

/// Record count followed by the first `limit` records as JSON
pub async fn findall_output(client: &ReportClient, resource: &str, limit: usize) -> Result<String> {
    let records: Vec<serde_json::Value> = client
        .findall(resource)
        .await
        .with_context(|| format!("Failed to fetch {}/findall", resource))?;

    let mut out = format!("🔎 {}: {} record(s)\n", resource, records.len());
    for record in records.iter().take(limit) {
        out.push_str(&serde_json::to_string_pretty(record)?);
        out.push('\n');
    }
    if records.len() > limit {
        out.push_str(&format!("   ... {} more\n", records.len() - limit));
    }
    Ok(out)
}

pub async fn cmd_findall(config: &Config, resource: &str, limit: usize) -> Result<()> {
    let client = client(config)?;
    print!("{}", findall_output(&client, resource, limit).await?);
    Ok(())
}
