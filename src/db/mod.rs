use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::GeneralConfig;
use crate::domain::RequirementId;
use crate::models::{BulkUpdateSummary, NewRequirement, RequirementPatch, RequirementRecord};

pub mod migrator;
pub mod repositories;

pub use repositories::requirement::RequirementRepository;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if db_url.starts_with("sqlite:") && !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file {path_str}"))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    /// Connects using the pool settings in `general`, retrying a bounded
    /// number of times with a fixed delay between attempts.
    pub async fn connect_with_retry(general: &GeneralConfig) -> Result<Self> {
        let attempts = general.connect_retries.max(1);
        let delay = Duration::from_secs(general.connect_retry_delay_seconds);

        for attempt in 1..=attempts {
            match Self::with_pool_options(
                &general.database_url,
                general.max_db_connections,
                general.min_db_connections,
            )
            .await
            {
                Ok(store) => return Ok(store),
                Err(e) => {
                    let remaining = attempts - attempt;
                    error!("Failed to connect to database: {e:#}");
                    if remaining == 0 {
                        break;
                    }
                    warn!("Retries left: {remaining}");
                    tokio::time::sleep(delay).await;
                }
            }
        }

        anyhow::bail!("Could not connect to the database after {attempts} attempts")
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn requirement_repo(&self) -> RequirementRepository {
        RequirementRepository::new(self.conn.clone())
    }

    pub async fn add_requirement(
        &self,
        input: &NewRequirement,
        now: DateTime<Utc>,
    ) -> Result<RequirementRecord> {
        self.requirement_repo().insert(input, now).await
    }

    pub async fn get_requirement(&self, id: RequirementId) -> Result<Option<RequirementRecord>> {
        self.requirement_repo().get(id).await
    }

    pub async fn list_requirements(&self) -> Result<Vec<RequirementRecord>> {
        self.requirement_repo().list_all().await
    }

    pub async fn count_requirements(&self) -> Result<u64> {
        self.requirement_repo().count().await
    }

    pub async fn update_requirement(
        &self,
        id: RequirementId,
        patch: &RequirementPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<RequirementRecord>> {
        self.requirement_repo().update(id, patch, now).await
    }

    pub async fn update_all_requirements(
        &self,
        patch: &RequirementPatch,
        now: DateTime<Utc>,
    ) -> Result<BulkUpdateSummary> {
        self.requirement_repo().update_all(patch, now).await
    }

    pub async fn remove_requirement(
        &self,
        id: RequirementId,
    ) -> Result<Option<RequirementRecord>> {
        self.requirement_repo().delete(id).await
    }
}
