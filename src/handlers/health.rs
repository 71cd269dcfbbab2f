use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::ModelDescriptor;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: ModelDescriptor,
    pub users_loaded: usize,
    pub started_at: DateTime<Utc>,
    pub ready: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: format!("anemia-risk-v{}", env!("CARGO_PKG_VERSION")),
        model: state.model.descriptor().clone(),
        users_loaded: state.users.len(),
        started_at: state.started_at,
        ready: true,
    })
}
