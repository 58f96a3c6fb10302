//! PostgreSQL plumbing shared by the catalog crates.
//!
//! - [`postgres`] builds pooled SeaORM connections from [`PostgresConfig`] and
//!   runs a crate's `Migrator`.
//! - [`retry`] retries fallible async operations (typically connecting at
//!   startup) with exponential backoff.
//! - [`error`] holds [`DatabaseError`] and [`unique_violation`], the single place
//!   where a driver error is recognised as a unique-constraint conflict.
//!
//! ```ignore
//! use database::postgres::{self, PostgresConfig};
//! use core_config::FromEnv;
//!
//! let config = PostgresConfig::from_env()?;
//! let db = postgres::connect_with_retry(config, None).await?;
//! postgres::run_migrations::<migration::Migrator>(&db, "catalog").await?;
//! ```

pub mod error;
pub mod postgres;
pub mod retry;

pub use error::{unique_violation, DatabaseError, DatabaseResult};
pub use postgres::PostgresConfig;
pub use retry::{retry, retry_with_backoff, RetryConfig};
