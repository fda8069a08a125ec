use anyhow::anyhow;
use deadpool_diesel::postgres::Pool;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Applies every embedded migration the database has not seen yet.
pub async fn run_migrations(pool: &Pool) -> anyhow::Result<()> {
    let conn = pool.get().await?;
    let applied = conn
        .interact(|conn| {
            conn.run_pending_migrations(MIGRATIONS)
                .map(|versions| versions.len())
                .map_err(|e| anyhow!("Migration failed: {}", e))
        })
        .await
        .map_err(|e| anyhow!("Database interaction failed during migrations: {}", e))??;
    info!("Applied {} pending migrations", applied);
    Ok(())
}
