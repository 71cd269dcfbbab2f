use axum::extract::State;
use axum::Json;

use crate::stats::StatsSnapshot;
use crate::state::AppState;

pub async fn metrics(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.stats.snapshot())
}
