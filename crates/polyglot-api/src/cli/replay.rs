//! Replay recorded webhook payloads through the relay.

use std::path::Path;

use anyhow::{Context, Result, bail};
use console::style;
use serde::Serialize;

use crate::state::AppState;

/// Outcome of one replayed payload.
#[derive(Debug, Serialize)]
struct ReplayOutcome {
    index: usize,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Split a payload file into individual payloads.
///
/// A top-level JSON array is one payload per element; anything else,
/// including invalid JSON, is a single payload passed through unchanged so
/// intake classifies it.
pub fn split_payloads(contents: &[u8]) -> Result<Vec<Vec<u8>>> {
    match serde_json::from_slice::<serde_json::Value>(contents) {
        Ok(serde_json::Value::Array(items)) => items
            .iter()
            .map(|item| serde_json::to_vec(item).context("failed to re-encode payload"))
            .collect(),
        _ => Ok(vec![contents.to_vec()]),
    }
}

/// Run every payload in `file` through intake and print each outcome.
///
/// Fails when any payload hits an unclassified error, after processing the rest.
pub async fn replay(state: &AppState, file: &Path, json: bool) -> Result<()> {
    let contents = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let payloads = split_payloads(&contents)?;

    let mut outcomes = Vec::with_capacity(payloads.len());
    let mut unclassified = 0usize;
    for (index, payload) in payloads.iter().enumerate() {
        match state.intake.accept(payload).await {
            Ok(outcome) => outcomes.push(ReplayOutcome {
                index,
                status: outcome.status(),
                error: None,
            }),
            Err(e) => {
                unclassified += 1;
                outcomes.push(ReplayOutcome {
                    index,
                    status: "error",
                    error: Some(e.to_string()),
                });
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        println!();
        for outcome in &outcomes {
            let status = outcome.status;
            let styled = match status {
                "processed" => style(status).green(),
                "duplicate" | "ignored" => style(status).dim(),
                "error" => style(status).red().bold(),
                _ => style(status).yellow(),
            };
            print!("  #{:<3} {}", outcome.index, styled);
            if let Some(error) = &outcome.error {
                print!("  {}", style(error).red());
            }
            println!();
        }
        println!();
    }

    if unclassified > 0 {
        bail!("{unclassified} of {} payloads failed", payloads.len());
    }
    Ok(())
}
