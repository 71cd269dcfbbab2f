use std::path::PathBuf;
use tracing::warn;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub model_path: PathBuf,
    pub users_path: PathBuf,
    pub cors_origins: Option<String>,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let port: u16 = match std::env::var("PORT") {
            Ok(p) => p.parse().unwrap_or_else(|_| {
                warn!("[anemia-risk] Invalid PORT value, defaulting to 8000");
                8000
            }),
            Err(_) => 8000,
        };

        let model_path = PathBuf::from(
            std::env::var("MODEL_PATH").unwrap_or_else(|_| "./model/anemia.toml".to_string()),
        );

        let users_path = PathBuf::from(
            std::env::var("USERS_PATH").unwrap_or_else(|_| "./users.json".to_string()),
        );

        let cors_origins = std::env::var("CORS_ORIGINS")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let static_dir = PathBuf::from(
            std::env::var("STATIC_DIR").unwrap_or_else(|_| "./static".to_string()),
        );

        Self {
            port,
            model_path,
            users_path,
            cors_origins,
            static_dir,
        }
    }
}
