use serde::{Deserialize, Serialize};

use super::{
    energy::{Statistics, RECENT_RECORDS},
    repo_types::StepEvent,
};
use crate::format;

#[derive(Debug, Default, Deserialize)]
pub struct EnergyQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    pub success: bool,
    pub step: i64,
    pub energy_mj: f64,
    pub force: f64,
    pub displacement: f64,
    pub timestamp: String,
}

impl From<&StepEvent> for SimulateResponse {
    fn from(e: &StepEvent) -> Self {
        Self {
            success: true,
            step: e.step,
            energy_mj: e.energy_mj,
            force: e.force_n,
            displacement: e.displacement_mm,
            timestamp: format::datetime(e.recorded_at),
        }
    }
}

/// Line-chart series, oldest point first.
#[derive(Debug, Default, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub energy: Vec<f64>,
}

impl ChartData {
    pub fn from_newest_first(events: &[StepEvent]) -> Self {
        let mut chart = ChartData::default();
        for e in events.iter().rev() {
            chart.labels.push(format::clock(e.recorded_at));
            chart.energy.push(e.energy_mj);
        }
        chart
    }
}

#[derive(Debug, Serialize)]
pub struct RecentRecord {
    pub step: i64,
    pub time: String,
    pub force: f64,
    pub displacement: f64,
    pub energy: f64,
}

impl From<&StepEvent> for RecentRecord {
    fn from(e: &StepEvent) -> Self {
        Self {
            step: e.step,
            time: format::datetime(e.recorded_at),
            force: e.force_n,
            displacement: e.displacement_mm,
            energy: e.energy_mj,
        }
    }
}

/// Table rows: the newest `RECENT_RECORDS` of the window, newest first.
pub fn recent_records(events: &[StepEvent]) -> Vec<RecentRecord> {
    events.iter().take(RECENT_RECORDS).map(RecentRecord::from).collect()
}

#[derive(Debug, Serialize)]
pub struct EnergyDataResponse {
    pub success: bool,
    pub statistics: Statistics,
    pub chart_data: ChartData,
    pub recent_records: Vec<RecentRecord>,
}

#[derive(Debug, Serialize)]
pub struct DashboardStatsResponse {
    pub success: bool,
    pub statistics: Statistics,
    pub username: String,
    pub email: String,
    pub member_since: String,
    pub last_login: Option<String>,
    pub last_step_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearDataResponse {
    pub success: bool,
    pub records_deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use uuid::Uuid;

    fn event(step: i64, energy_mj: f64, second: u8) -> StepEvent {
        StepEvent {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            step,
            force_n: 500.0,
            displacement_mm: energy_mj / 500.0,
            energy_mj,
            recorded_at: datetime!(2024-01-01 12:00:00 UTC) + time::Duration::seconds(second as i64),
        }
    }

    #[test]
    fn chart_runs_oldest_to_newest() {
        let newest_first = vec![event(3, 30.0, 3), event(2, 20.0, 2), event(1, 10.0, 1)];
        let chart = ChartData::from_newest_first(&newest_first);
        assert_eq!(chart.energy, vec![10.0, 20.0, 30.0]);
        assert_eq!(chart.labels, vec!["12:00:01", "12:00:02", "12:00:03"]);
    }

    #[test]
    fn table_keeps_newest_ten() {
        let newest_first: Vec<_> = (1..=15).rev().map(|s| event(s, s as f64, 0)).collect();
        let rows = recent_records(&newest_first);
        assert_eq!(rows.len(), RECENT_RECORDS);
        assert_eq!(rows[0].step, 15);
        assert_eq!(rows[9].step, 6);
    }

    #[test]
    fn simulate_response_mirrors_row() {
        let e = event(4, 250.0, 0);
        let json = serde_json::to_value(SimulateResponse::from(&e)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["step"], 4);
        assert_eq!(json["energy_mj"], 250.0);
        assert_eq!(json["force"], 500.0);
        assert_eq!(json["displacement"], 0.5);
    }
}
