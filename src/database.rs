use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection, sqlx::PgPool};
use tracing::info;

pub async fn setup_database(db_url: &str) -> anyhow::Result<(DatabaseConnection, PgPool)> {
    let db = Database::connect(db_url)
        .await
        .context("cannot connect to the database")?;
    Migrator::up(&db, None)
        .await
        .context("running migrations failed")?;
    info!("database migrated");

    let pool = PgPool::connect(db_url)
        .await
        .context("cannot open the session pool")?;

    Ok((db, pool))
}
