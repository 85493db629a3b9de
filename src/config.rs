use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub uploads_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(4000);
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:userdesk.db?mode=rwc".into());
        let uploads_dir = std::env::var("UPLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("public/uploads"));
        Ok(Self {
            host,
            port,
            database_url,
            uploads_dir,
        })
    }
}

#[cfg(test)]
impl AppConfig {
    pub(crate) fn for_tests(uploads_root: &std::path::Path) -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            database_url: "sqlite::memory:".into(),
            uploads_dir: uploads_root.to_path_buf(),
        }
    }
}
