mod config;
mod features;
mod handlers;
mod model;
mod risk;
mod state;
mod stats;
mod templates;
mod users;

use axum::error_handling::HandleErrorLayer;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower::buffer::BufferLayer;
use tower::limit::RateLimitLayer;
use tower::load_shed::error::Overloaded;
use tower::load_shed::LoadShedLayer;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::model::RiskModel;
use crate::state::AppState;
use crate::stats::PredictionStats;
use crate::users::UserDirectory;

const PREDICT_RATE_LIMIT: u64 = 60;
const LOGIN_RATE_LIMIT: u64 = 10;
const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    info!("[anemia-risk] Starting anemia risk service");
    info!("[anemia-risk] Model path: {:?}", config.model_path);
    info!("[anemia-risk] Users path: {:?}", config.users_path);
    info!("[anemia-risk] Static dir: {:?}", config.static_dir);

    let model = RiskModel::load(&config.model_path)?;
    let users = UserDirectory::load(&config.users_path)?;

    let state = AppState {
        config: config.clone(),
        model: Arc::new(model),
        users: Arc::new(users),
        stats: Arc::new(PredictionStats::default()),
        started_at: chrono::Utc::now(),
    };

    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("[anemia-risk] Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    // The page is often opened straight from disk, so the default is any origin.
    let cors = if let Some(ref origins) = state.config.cors_origins {
        let origins: Vec<_> = origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Over-limit requests are shed with 429 instead of waiting for the window.
    let predict_rate_limit = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(rate_limit_error))
        .layer(BufferLayer::new(64))
        .layer(LoadShedLayer::new())
        .layer(RateLimitLayer::new(PREDICT_RATE_LIMIT, RATE_LIMIT_WINDOW));

    let login_rate_limit = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(rate_limit_error))
        .layer(BufferLayer::new(16))
        .layer(LoadShedLayer::new())
        .layer(RateLimitLayer::new(LOGIN_RATE_LIMIT, RATE_LIMIT_WINDOW));

    Router::new()
        .route("/", get(index_page))
        .route("/index.html", get(index_page))
        .route("/login.html", get(login_page))
        .route("/health", get(handlers::health::health))
        .route("/metrics", get(handlers::metrics::metrics))
        .route(
            "/predict",
            post(handlers::predict::predict).layer(predict_rate_limit),
        )
        .route(
            "/login",
            post(handlers::login::login).layer(login_rate_limit),
        )
        .layer(cors)
        .with_state(state)
}

async fn rate_limit_error(err: tower::BoxError) -> StatusCode {
    if err.is::<Overloaded>() {
        warn!("[anemia-risk] Rate limit exceeded, rejecting request");
        StatusCode::TOO_MANY_REQUESTS
    } else {
        error!("[anemia-risk] Middleware error: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn index_page(State(state): State<AppState>) -> Html<String> {
    Html(templates::pages::render(&state.config.static_dir, "index.html"))
}

async fn login_page(State(state): State<AppState>) -> Html<String> {
    Html(templates::pages::render(&state.config.static_dir, "login.html"))
}
