//! Inspect the SQLite result sink.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use polyglot_infra::sqlite::{DatabasePool, SqliteResultSink};
use polyglot_types::config::AppConfig;

/// Show the most recent results (or exceptions) recorded by the sink.
pub async fn show_results(config: &AppConfig, limit: i64, exceptions: bool, json: bool) -> Result<()> {
    let Some(url) = &config.sink.database_url else {
        println!(
            "  {} No result sink configured; set [sink] database_url to record results.",
            style("!").yellow().bold()
        );
        return Ok(());
    };
    let pool = DatabasePool::new(url)
        .await
        .with_context(|| format!("failed to open result sink at {url}"))?;
    let sink = SqliteResultSink::new(pool);

    if exceptions {
        let rows = sink.recent_exceptions(limit).await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }
        if rows.is_empty() {
            println!("  {}", style("No exceptions recorded.").dim());
            return Ok(());
        }

        let mut table = new_table(&["When", "Event", "Class", "Conversation", "Message"]);
        for exception in &rows {
            table.add_row(vec![
                Cell::new(exception.timestamp.format("%Y-%m-%d %H:%M:%S")),
                Cell::new(&exception.event_type),
                Cell::new(&exception.exception_class).fg(Color::Red),
                Cell::new(exception.params.get("conversation_id").map_or("-", String::as_str)),
                Cell::new(truncate(&exception.message, 60)),
            ]);
        }
        println!("{table}");
        return Ok(());
    }

    let rows = sink.recent_results(limit).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("  {}", style("No results recorded.").dim());
        return Ok(());
    }

    let mut table = new_table(&["When", "Event", "Outcome", "Time"]);
    for result in &rows {
        let outcome = if result.is_success {
            Cell::new("● ok").fg(Color::Green)
        } else {
            Cell::new("○ failed").fg(Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(result.timestamp.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(&result.event_type),
            outcome,
            Cell::new(format_seconds(result.execution_time)),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers.iter().map(|h| Cell::new(h).fg(Color::White)));
    table
}

fn format_seconds(seconds: Option<f64>) -> String {
    match seconds {
        None => "-".to_string(),
        Some(s) if s < 1.0 => format!("{}ms", (s * 1000.0).round() as u64),
        Some(s) => format!("{s:.2}s"),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars - 3).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
