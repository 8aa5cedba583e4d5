use std::path::PathBuf;

/// Desk configuration loaded from environment variables. Every value has a
/// default, so loading never fails.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub api_url: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Config {
            data_dir: std::env::var("BOX23_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("box23-data")),
            api_url: std::env::var("BOX23_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}
