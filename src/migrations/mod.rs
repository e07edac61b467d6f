// Embedded schema migrations
// Compiled into the binary so a fresh database is usable without the diesel CLI

pub mod diesel;

use crate::app_config::AppConfig;
use crate::db::DieselPool;
use tracing::{error, info};

/// Run pending migrations unless disabled by configuration
pub async fn run_all_migrations(config: &AppConfig, pool: &DieselPool) -> anyhow::Result<usize> {
    if !should_run_migrations(config) {
        info!("[MIGRATIONS] Skipping embedded migrations (disabled in config)");
        return Ok(0);
    }

    info!(
        "[MIGRATIONS] Starting migration process for environment: {}",
        config.environment
    );

    match diesel::run_migrations(&config.database.url, pool).await {
        Ok(0) => {
            info!("[MIGRATIONS] Schema up to date");
            Ok(0)
        },
        Ok(applied) => {
            info!("[MIGRATIONS] Applied {} migrations", applied);
            Ok(applied)
        },
        Err(e) => {
            error!("[MIGRATIONS] Migration failed: {}", e);
            Err(e)
        },
    }
}

pub fn should_run_migrations(config: &AppConfig) -> bool {
    !config.features.disable_embedded_migrations
}
