use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::{info, instrument};

use super::PostgresConfig;
use crate::error::{DatabaseError, DatabaseResult};
use crate::retry::{retry_with_backoff, RetryConfig};

/// Open a connection pool with the settings from `config`
pub async fn connect(config: PostgresConfig) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(config.into_connect_options()).await?;
    info!("Connected to PostgreSQL");
    Ok(db)
}

/// [`connect`], retried with backoff. `None` uses [`RetryConfig::default`].
///
/// Meant for service startup, where the database container may still be
/// coming up.
pub async fn connect_with_retry(
    config: PostgresConfig,
    retry_config: Option<RetryConfig>,
) -> DatabaseResult<DatabaseConnection> {
    retry_with_backoff(|| connect(config.clone()), retry_config.unwrap_or_default())
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))
}

/// Apply every pending migration of `M`
#[instrument(skip(db))]
pub async fn run_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
    app_name: &str,
) -> DatabaseResult<()> {
    info!("Running {} database migrations", app_name);
    M::up(db, None)
        .await
        .map_err(|e| DatabaseError::Migration(format!("{app_name}: {e}")))?;
    info!("Migrations complete for {}", app_name);
    Ok(())
}

/// Round-trip a trivial query to confirm the pool is usable
pub async fn ping(db: &DatabaseConnection) -> DatabaseResult<()> {
    db.execute_unprepared("SELECT 1").await?;
    Ok(())
}
