use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use crate::features::{derive_features, PredictInput};
use crate::risk::{self, RiskLevel};
use crate::state::AppState;

#[derive(Serialize, Debug)]
pub struct PredictResponse {
    pub prob: f64,
    pub label: &'static str,
    pub score: f64,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictInput>, JsonRejection>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request_id = uuid::Uuid::new_v4();

    let Json(input) = payload.map_err(|rejection| {
        warn!("[anemia-risk] {} rejected body: {}", request_id, rejection.body_text());
        state.stats.record_rejection();
        (
            rejection.status(),
            Json(ErrorResponse {
                error: format!("Invalid request body: {}", rejection.body_text()),
                hint: Some("Send a JSON object with the 13 form fields".to_string()),
            }),
        )
    })?;

    let record = input.validate().map_err(|e| {
        warn!("[anemia-risk] {} invalid input: {}", request_id, e);
        state.stats.record_rejection();
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: e.to_string(),
                hint: Some("Every field is required; coded fields take whole numbers".to_string()),
            }),
        )
    })?;

    let row = derive_features(&record);
    let prob = state.model.predict_proba(&row);
    let level = RiskLevel::from_probability(prob);
    let score = risk::score(prob);

    state.stats.record_prediction(level.as_str());
    info!(
        "[anemia-risk] {} prob={:.4} label={} score={}",
        request_id,
        prob,
        level.as_str(),
        score
    );

    Ok(Json(PredictResponse {
        prob,
        label: level.as_str(),
        score,
    }))
}
