use crate::domain::ports::MetricsStore;
use crate::domain::scenario::{ExecutionResult, ProblemType, ScenarioId};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

pub struct SqliteMetricsStore {
    pool: SqlitePool,
}

impl SqliteMetricsStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, limit: Option<usize>) -> Result<Vec<ExecutionResult>> {
        let rows = match limit {
            Some(limit) => {
                sqlx::query("SELECT * FROM execution_results ORDER BY id DESC LIMIT ?")
                    .bind(limit as i64)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT * FROM execution_results ORDER BY id ASC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.iter().map(map_row).collect()
    }
}

fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<ExecutionResult> {
    let problem_type: String = row.try_get("problem_type")?;
    let executed_at: i64 = row.try_get("executed_at")?;
    let scenario_id: String = row.try_get("scenario_id")?;

    Ok(ExecutionResult {
        scenario_id: ScenarioId::from(scenario_id),
        problem_type: ProblemType::from_name(&problem_type)
            .ok_or_else(|| anyhow!("Unknown problem type in store: {}", problem_type))?,
        difficulty: row.try_get::<i64, _>("difficulty")? as u8,
        success: row.try_get("success")?,
        response_time_ms: row.try_get("response_time_ms")?,
        throughput: row.try_get("throughput")?,
        success_rate: row.try_get("success_rate")?,
        errors: row.try_get::<i64, _>("errors")? as u32,
        executed_at: Utc
            .timestamp_millis_opt(executed_at)
            .single()
            .ok_or_else(|| anyhow!("Invalid timestamp in store: {}", executed_at))?,
    })
}

#[async_trait]
impl MetricsStore for SqliteMetricsStore {
    async fn append(&self, result: &ExecutionResult) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO execution_results
            (scenario_id, problem_type, difficulty, success, response_time_ms, throughput, success_rate, errors, executed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(result.scenario_id.as_str())
        .bind(result.problem_type.as_str())
        .bind(result.difficulty as i64)
        .bind(result.success)
        .bind(result.response_time_ms)
        .bind(result.throughput)
        .bind(result.success_rate)
        .bind(result.errors as i64)
        .bind(result.executed_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .context("Failed to save execution result")?;

        debug!("Persisted execution result for {}", result.scenario_id);
        Ok(())
    }

    async fn latest(&self, limit: usize) -> Result<Vec<ExecutionResult>> {
        self.fetch(Some(limit)).await
    }

    async fn all(&self) -> Result<Vec<ExecutionResult>> {
        self.fetch(None).await
    }
}
