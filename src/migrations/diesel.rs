// Diesel migration runner for PostgreSQL
// MigrationHarness needs a sync connection, so it runs on the blocking pool

use crate::db::{diesel_pool::MIGRATIONS, DieselPool};
use anyhow::{anyhow, Context};
use diesel::Connection;
use diesel::PgConnection;
use diesel_migrations::MigrationHarness;
use tracing::{debug, info};

/// Run all pending migrations, returning how many were applied
pub async fn run_migrations(database_url: &str, _pool: &DieselPool) -> anyhow::Result<usize> {
    let database_url = database_url.to_string();

    tokio::task::spawn_blocking(move || -> anyhow::Result<usize> {
        let mut conn = PgConnection::establish(&database_url)
            .context("Failed to establish sync connection for migrations")?;

        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow!("Failed to run migrations: {}", e))?;

        for migration in &applied {
            debug!("[DIESEL] Applied migration: {}", migration);
        }
        info!("[DIESEL] {} migrations applied", applied.len());
        Ok(applied.len())
    })
    .await
    .context("Migration task panicked")?
}

/// Applied and pending migration names
#[derive(Debug)]
pub struct MigrationStatus {
    pub applied: Vec<String>,
    pub pending: Vec<String>,
}

impl MigrationStatus {
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }
}

pub async fn check_migration_status(database_url: &str) -> anyhow::Result<MigrationStatus> {
    let database_url = database_url.to_string();

    tokio::task::spawn_blocking(move || -> anyhow::Result<MigrationStatus> {
        let mut conn = PgConnection::establish(&database_url)
            .context("Failed to establish sync connection for migrations")?;

        let applied = conn
            .applied_migrations()
            .map_err(|e| anyhow!("Failed to get applied migrations: {}", e))?;
        let pending = conn
            .pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow!("Failed to get pending migrations: {}", e))?;

        Ok(MigrationStatus {
            applied: applied.iter().map(|m| m.to_string()).collect(),
            pending: pending.iter().map(|m| m.name().to_string()).collect(),
        })
    })
    .await
    .context("Status check task panicked")?
}
