use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// POST /login
///
/// Always answers 200; the `status` field says whether the credentials
/// matched.
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Json<LoginResponse> {
    match state.users.authenticate(&request.username, &request.password) {
        Some(user) => {
            info!("[anemia-risk] Login ok for {} ({})", user.username, user.role);
            state.stats.record_login(true);
            Json(LoginResponse {
                status: "ok",
                role: Some(user.role.clone()),
                message: None,
            })
        }
        None => {
            warn!("[anemia-risk] Login failed for {}", request.username);
            state.stats.record_login(false);
            Json(LoginResponse {
                status: "error",
                role: None,
                message: Some("Credenciales incorrectas".to_string()),
            })
        }
    }
}
