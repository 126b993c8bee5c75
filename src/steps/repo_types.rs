use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// One recorded footstep. Rows are never updated.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StepEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub step: i64, // per-user running index, restarts after a clear
    pub force_n: f64,
    pub displacement_mm: f64,
    pub energy_mj: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

/// Aggregate over all of a user's events.
#[derive(Debug, Clone, FromRow)]
pub struct StepTotals {
    pub total_energy_mj: f64,
    pub total_steps: i64,
    pub last_step_at: Option<OffsetDateTime>,
}
