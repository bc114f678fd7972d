//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod booking_repository;
pub mod chat_repository;
pub mod repository_provider;
pub mod review_repository;
pub mod sales_repository;
pub mod user_repository;
pub mod vehicle_repository;

pub use repository_provider::SeaOrmRepositoryProvider;

use sea_orm::{DbErr, SqlErr};

use crate::domain::DomainError;
use crate::shared::errors::InfraError;

pub(crate) fn db_err(e: DbErr) -> DomainError {
    InfraError::Database(e).into()
}

/// Unique-key violations become `Conflict` with the given message.
pub(crate) fn insert_err(e: DbErr, conflict: &str) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::Conflict(conflict.to_string()),
        _ => db_err(e),
    }
}

/// A stored value that no longer parses into its domain type.
pub(crate) fn corrupt(table: &str, e: DomainError) -> DomainError {
    DomainError::Database(format!("corrupt row in {}: {}", table, e))
}
