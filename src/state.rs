use std::sync::Arc;

use anyhow::Context;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::config::AppConfig;
use crate::uploads::{LocalUploads, UploadStore};
use crate::users;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub uploads: Arc<dyn UploadStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        users::repo::ensure_schema(&db)
            .await
            .context("create user table")?;

        let uploads = Arc::new(
            LocalUploads::new(&config.uploads_dir).context("create uploads directory")?,
        ) as Arc<dyn UploadStore>;

        Ok(Self::from_parts(db, config, uploads))
    }

    pub fn from_parts(
        db: SqlitePool,
        config: Arc<AppConfig>,
        uploads: Arc<dyn UploadStore>,
    ) -> Self {
        Self {
            db,
            config,
            uploads,
        }
    }

    /// In-memory database plus a throwaway uploads directory.
    #[cfg(test)]
    pub(crate) async fn in_memory(uploads_root: &std::path::Path) -> Self {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        users::repo::ensure_schema(&db).await.expect("schema");

        let config = Arc::new(AppConfig::for_tests(uploads_root));
        let uploads =
            Arc::new(LocalUploads::new(uploads_root).expect("uploads dir")) as Arc<dyn UploadStore>;

        Self::from_parts(db, config, uploads)
    }
}
