//! PostgreSQL connection management and migrations

mod config;
mod connector;

pub use config::PostgresConfig;
pub use connector::{connect, connect_with_retry, ping, run_migrations};

pub use sea_orm::{DatabaseConnection, DbErr};
pub use sea_orm_migration::MigratorTrait;
