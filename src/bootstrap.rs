//! Process lifecycle: open the database, bring modules up, serve, and tear
//! everything down again in reverse.

use anyhow::Context;
use bookshelf_db::Database;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// Run the HTTP service until a shutdown signal arrives.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.redacted_url(),
        "bookshelf bootstrap starting"
    );

    let database = Database::connect(&settings.database).await?;
    let result = run(&database, settings).await;
    database.close().await;
    result
}

/// Apply pending migrations and exit.
pub async fn migrate(settings: &Settings) -> anyhow::Result<()> {
    let database = Database::connect(&settings.database).await?;
    let registry = registry(&database);
    let result = apply_migrations(&database, &registry).await;
    database.close().await;
    result
}

async fn run(database: &Database, settings: &Settings) -> anyhow::Result<()> {
    database.ping().await?;

    let registry = registry(database);
    apply_migrations(database, &registry).await?;

    let ctx = InitCtx { settings };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;
    tracing::info!("bookshelf bootstrap complete");

    let served = bookshelf_http::start_server(&registry, settings).await;

    // modules are stopped even when serving failed
    if let Err(err) = registry.stop_modules().await {
        tracing::error!(error = %format!("{err:#}"), "failed to stop modules");
    }

    served
}

async fn apply_migrations(database: &Database, registry: &ModuleRegistry) -> anyhow::Result<()> {
    database
        .run_migrations(&registry.collect_migrations())
        .await
        .context("failed to migrate database")
}

fn registry(database: &Database) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, database.pool().clone());
    registry
}
