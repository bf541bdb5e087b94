//! SQLite result and exception sink.
//!
//! Append-only: rows are inserted and never updated. The query methods exist
//! for the CLI and for postmortems.

use chrono::{DateTime, Utc};
use polyglot_core::sink::{ResultSink, SinkError};
use polyglot_types::result::{DomainException, ProcessingResult};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// Persists routing records to `processing_results` and `domain_exceptions`.
pub struct SqliteResultSink {
    pool: DatabasePool,
}

impl SqliteResultSink {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Most recent processing results, newest first.
    pub async fn recent_results(&self, limit: i64) -> Result<Vec<ProcessingResult>, SinkError> {
        let rows = sqlx::query(
            "SELECT is_success, event_type, execution_time, timestamp FROM processing_results ORDER BY timestamp DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter()
            .map(|row| {
                Ok(ProcessingResult {
                    is_success: row.try_get::<bool, _>("is_success").map_err(query_error)?,
                    event_type: row.try_get("event_type").map_err(query_error)?,
                    execution_time: row.try_get("execution_time").map_err(query_error)?,
                    timestamp: parse_datetime(
                        &row.try_get::<String, _>("timestamp").map_err(query_error)?,
                    )?,
                })
            })
            .collect()
    }

    /// Most recent exceptions, newest first.
    pub async fn recent_exceptions(&self, limit: i64) -> Result<Vec<DomainException>, SinkError> {
        let rows = sqlx::query(
            "SELECT message, exception_class, event_type, params, stack_trace, timestamp FROM domain_exceptions ORDER BY timestamp DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter().map(exception_from_row).collect()
    }
}

fn exception_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<DomainException, SinkError> {
    let params: String = row.try_get("params").map_err(query_error)?;
    let timestamp: String = row.try_get("timestamp").map_err(query_error)?;
    Ok(DomainException {
        message: row.try_get("message").map_err(query_error)?,
        exception_class: row.try_get("exception_class").map_err(query_error)?,
        event_type: row.try_get("event_type").map_err(query_error)?,
        params: serde_json::from_str(&params)
            .map_err(|e| SinkError(format!("invalid params JSON: {e}")))?,
        stack_trace: row.try_get("stack_trace").map_err(query_error)?,
        timestamp: parse_datetime(&timestamp)?,
    })
}

fn query_error(e: sqlx::Error) -> SinkError {
    SinkError(e.to_string())
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, SinkError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SinkError(format!("invalid datetime: {e}")))
}

impl ResultSink for SqliteResultSink {
    async fn record_result(&self, result: &ProcessingResult) -> Result<(), SinkError> {
        sqlx::query(
            r#"INSERT INTO processing_results (id, is_success, event_type, execution_time, timestamp)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(Uuid::now_v7().to_string())
        .bind(result.is_success)
        .bind(&result.event_type)
        .bind(result.execution_time)
        .bind(result.timestamp.to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;
        Ok(())
    }

    async fn record_exception(&self, exception: &DomainException) -> Result<(), SinkError> {
        let params = serde_json::to_string(&exception.params)
            .map_err(|e| SinkError(format!("failed to serialize params: {e}")))?;
        sqlx::query(
            r#"INSERT INTO domain_exceptions (id, message, exception_class, event_type, params, stack_trace, timestamp)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(Uuid::now_v7().to_string())
        .bind(&exception.message)
        .bind(&exception.exception_class)
        .bind(&exception.event_type)
        .bind(&params)
        .bind(&exception.stack_trace)
        .bind(exception.timestamp.to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;
        Ok(())
    }
}
