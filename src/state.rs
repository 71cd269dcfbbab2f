use crate::config::Config;
use crate::model::RiskModel;
use crate::stats::PredictionStats;
use crate::users::UserDirectory;

use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub model: Arc<RiskModel>,
    pub users: Arc<UserDirectory>,
    pub stats: Arc<PredictionStats>,
    pub started_at: DateTime<Utc>,
}
