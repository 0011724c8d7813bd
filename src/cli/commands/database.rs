use anyhow::Context;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let mut database = config.database.clone();
    database.run_migrations = false;

    let manager = DatabaseManager::connect(&database, false)
        .await
        .context("failed to connect to DATABASE_URL")?;
    manager.migrate().await.context("migration failed")?;
    manager.close().await;

    println!("Migrations applied");
    Ok(())
}

pub async fn health(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut database = config.database.clone();
    database.run_migrations = false;

    let manager = DatabaseManager::connect(&database, config.is_development())
        .await
        .context("failed to initialize storage")?;
    let result = manager.health_check().await;
    manager.close().await;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "backend": manager.backend().name(),
                "status": if result.is_ok() { "ok" } else { "degraded" },
            })
        ),
        OutputFormat::Text => println!(
            "{}: {}",
            manager.backend().name(),
            if result.is_ok() { "ok" } else { "degraded" }
        ),
    }

    result.context("storage health check failed")
}
