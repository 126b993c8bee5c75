use anyhow::Context;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    energy::Reading,
    repo_types::{StepEvent, StepTotals},
};

impl StepEvent {
    /// Store a reading under the user's next step index. The index is taken
    /// inside the insert so concurrent calls never share one.
    pub async fn insert(db: &SqlitePool, user_id: Uuid, reading: Reading) -> anyhow::Result<StepEvent> {
        let event = sqlx::query_as::<_, StepEvent>(
            r#"
            INSERT INTO step_events
                (id, user_id, step, force_n, displacement_mm, energy_mj, recorded_at)
            SELECT ?, ?, COALESCE(MAX(step), 0) + 1, ?, ?, ?, ?
              FROM step_events
             WHERE user_id = ?
            RETURNING id, user_id, step, force_n, displacement_mm, energy_mj, recorded_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(reading.force_n)
        .bind(reading.displacement_mm)
        .bind(reading.energy_mj)
        .bind(OffsetDateTime::now_utc())
        .bind(user_id)
        .fetch_one(db)
        .await
        .context("insert step event")?;
        Ok(event)
    }

    /// Most recent `limit` events, newest first.
    pub async fn list_recent(db: &SqlitePool, user_id: Uuid, limit: i64) -> anyhow::Result<Vec<StepEvent>> {
        let rows = sqlx::query_as::<_, StepEvent>(
            r#"
            SELECT id, user_id, step, force_n, displacement_mm, energy_mj, recorded_at
              FROM step_events
             WHERE user_id = ?
             ORDER BY step DESC
             LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(db)
        .await
        .context("list recent step events")?;
        Ok(rows)
    }

    pub async fn totals(db: &SqlitePool, user_id: Uuid) -> anyhow::Result<StepTotals> {
        let totals = sqlx::query_as::<_, StepTotals>(
            r#"
            SELECT COALESCE(SUM(energy_mj), 0.0) AS total_energy_mj,
                   COUNT(*)                     AS total_steps,
                   (SELECT recorded_at
                      FROM step_events
                     WHERE user_id = ?
                     ORDER BY step DESC
                     LIMIT 1)                   AS last_step_at
              FROM step_events
             WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_one(db)
        .await
        .context("sum step events")?;
        Ok(totals)
    }

    /// Delete all of the user's events, returning how many went.
    pub async fn clear_for_user(db: &SqlitePool, user_id: Uuid) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM step_events WHERE user_id = ?")
            .bind(user_id)
            .execute(db)
            .await
            .context("clear step events")?;
        Ok(res.rows_affected())
    }
}
