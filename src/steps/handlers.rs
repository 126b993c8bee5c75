use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{
        recent_records, ChartData, ClearDataResponse, DashboardStatsResponse, EnergyDataResponse,
        EnergyQuery, SimulateResponse,
    },
    energy::{self, Statistics},
    repo_types::StepEvent,
};
use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiResult},
    format,
    state::AppState,
};

pub fn step_routes() -> Router<AppState> {
    Router::new()
        .route("/simulate-step", post(simulate_step))
        .route("/get-energy-data", get(get_energy_data))
        .route("/get-dashboard-stats", get(get_dashboard_stats))
        .route("/clear-data", post(clear_data))
}

/// POST /simulate-step: record one synthetic footstep.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn simulate_step(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<SimulateResponse>> {
    let user_id = user.id;
    let reading = energy::simulate(&mut rand::thread_rng());
    let event = StepEvent::insert(&state.db, user_id, reading).await?;

    info!(
        %user_id,
        step = event.step,
        force_n = event.force_n,
        displacement_mm = event.displacement_mm,
        energy_mj = event.energy_mj,
        "step simulated"
    );
    Ok(Json(SimulateResponse::from(&event)))
}

/// GET /get-energy-data?limit=N: totals plus the most recent N events.
#[instrument(skip(state, user, query), fields(user_id = %user.id))]
pub async fn get_energy_data(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    query: Result<Query<EnergyQuery>, QueryRejection>,
) -> ApiResult<Json<EnergyDataResponse>> {
    let user_id = user.id;
    let Query(q) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let window = energy::clamp_window(q.limit);

    let totals = StepEvent::totals(&state.db, user_id).await?;
    let events = StepEvent::list_recent(&state.db, user_id, window).await?;

    Ok(Json(EnergyDataResponse {
        success: true,
        statistics: Statistics::from_totals(
            totals.total_energy_mj,
            totals.total_steps,
            state.config.tariff_inr_per_kwh,
        ),
        chart_data: ChartData::from_newest_first(&events),
        recent_records: recent_records(&events),
    }))
}

/// GET /get-dashboard-stats: totals and account details for the profile page.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<DashboardStatsResponse>> {
    let totals = StepEvent::totals(&state.db, user.id).await?;

    Ok(Json(DashboardStatsResponse {
        success: true,
        statistics: Statistics::from_totals(
            totals.total_energy_mj,
            totals.total_steps,
            state.config.tariff_inr_per_kwh,
        ),
        username: user.username,
        email: user.email,
        member_since: format::datetime(user.created_at),
        last_login: user.last_login.map(format::datetime),
        last_step_at: totals.last_step_at.map(format::datetime),
    }))
}

/// POST /clear-data: delete the caller's events.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn clear_data(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<ClearDataResponse>> {
    let user_id = user.id;
    let records_deleted = StepEvent::clear_for_user(&state.db, user_id).await?;
    info!(%user_id, records_deleted, "step data cleared");
    Ok(Json(ClearDataResponse {
        success: true,
        records_deleted,
    }))
}
