//! Database layer
//!
//! One store, three interchangeable backends:
//!
//! - [`surreal`] - embedded SurrealDB document store (default)
//! - [`postgres`] - hand-written SQL over PostgreSQL
//! - [`orm`] - SeaORM over PostgreSQL
//!
//! All backends implement the same operations with identical semantics;
//! [`ReservationStore`] dispatches to the one selected by configuration.

pub mod orm;
pub mod postgres;
pub mod serde_helpers;
pub mod surreal;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use shared::models::{Reservation, RestaurantTable};
use shared::request::{NewReservation, NewTable, ReservationPatch};

use crate::core::{Config, DatabaseBackend};

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<surrealdb::Error> for StoreError {
    fn from(err: surrealdb::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound("row not found".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Duplicate(db.message().to_string())
            }
            _ => StoreError::Database(err.to_string()),
        }
    }
}

impl From<sea_orm::DbErr> for StoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) => StoreError::Duplicate(msg),
            _ => StoreError::Database(err.to_string()),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Ids handed back by reservation creation
#[derive(Debug, Clone)]
pub struct CreatedReservation {
    pub reservation_id: String,
    pub customer_id: String,
}

/// Parse a stringified sequence id (relational backends).
pub(crate) fn parse_numeric_id(id: &str, what: &str) -> StoreResult<i64> {
    id.parse()
        .map_err(|_| StoreError::Validation(format!("Invalid {what} id: {id}")))
}

/// Reservation store — dispatches to the configured backend
pub enum ReservationStore {
    Surreal(surreal::SurrealStore),
    Postgres(postgres::PgStore),
    Orm(orm::OrmStore),
}

impl ReservationStore {
    /// Connect the backend selected by `DATABASE_BACKEND`.
    ///
    /// The relational backends require `DATABASE_URL`; a missing URL is a
    /// startup error, not a per-request one.
    pub async fn connect(config: &Config) -> StoreResult<Self> {
        match config.database_backend {
            DatabaseBackend::Surreal => {
                let store = surreal::SurrealStore::connect(&config.database_dir()).await?;
                Ok(ReservationStore::Surreal(store))
            }
            DatabaseBackend::Postgres => {
                let url = config.database_url.as_deref().ok_or_else(|| {
                    StoreError::Validation(
                        "DATABASE_URL must be set for the postgres backend".to_string(),
                    )
                })?;
                Ok(ReservationStore::Postgres(postgres::PgStore::connect(url).await?))
            }
            DatabaseBackend::Orm => {
                let url = config.database_url.as_deref().ok_or_else(|| {
                    StoreError::Validation(
                        "DATABASE_URL must be set for the orm backend".to_string(),
                    )
                })?;
                Ok(ReservationStore::Orm(orm::OrmStore::connect(url).await?))
            }
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            ReservationStore::Surreal(_) => "surreal",
            ReservationStore::Postgres(_) => "postgres",
            ReservationStore::Orm(_) => "orm",
        }
    }

    pub async fn create_table(&self, table: NewTable) -> StoreResult<String> {
        match self {
            ReservationStore::Surreal(s) => s.create_table(table).await,
            ReservationStore::Postgres(s) => s.create_table(table).await,
            ReservationStore::Orm(s) => s.create_table(table).await,
        }
    }

    pub async fn list_tables(&self) -> StoreResult<Vec<RestaurantTable>> {
        match self {
            ReservationStore::Surreal(s) => s.list_tables().await,
            ReservationStore::Postgres(s) => s.list_tables().await,
            ReservationStore::Orm(s) => s.list_tables().await,
        }
    }

    pub async fn create_reservation(
        &self,
        reservation: NewReservation,
    ) -> StoreResult<CreatedReservation> {
        match self {
            ReservationStore::Surreal(s) => s.create_reservation(reservation).await,
            ReservationStore::Postgres(s) => s.create_reservation(reservation).await,
            ReservationStore::Orm(s) => s.create_reservation(reservation).await,
        }
    }

    pub async fn get_reservation(&self, id: &str) -> StoreResult<Reservation> {
        match self {
            ReservationStore::Surreal(s) => s.get_reservation(id).await,
            ReservationStore::Postgres(s) => s.get_reservation(id).await,
            ReservationStore::Orm(s) => s.get_reservation(id).await,
        }
    }

    pub async fn update_reservation(
        &self,
        id: &str,
        patch: ReservationPatch,
    ) -> StoreResult<Reservation> {
        match self {
            ReservationStore::Surreal(s) => s.update_reservation(id, patch).await,
            ReservationStore::Postgres(s) => s.update_reservation(id, patch).await,
            ReservationStore::Orm(s) => s.update_reservation(id, patch).await,
        }
    }

    /// Cancel an active reservation (`active → cancelled`).
    ///
    /// Unknown ids and already-cancelled reservations both answer NotFound,
    /// so a second cancellation of the same id is a 404.
    pub async fn cancel_reservation(&self, id: &str) -> StoreResult<()> {
        match self {
            ReservationStore::Surreal(s) => s.cancel_reservation(id).await,
            ReservationStore::Postgres(s) => s.cancel_reservation(id).await,
            ReservationStore::Orm(s) => s.cancel_reservation(id).await,
        }
    }

    /// Sum of party sizes of active reservations per day of the window,
    /// zero-seeded for days without reservations.
    pub async fn occupancy(
        &self,
        window: &[NaiveDate],
    ) -> StoreResult<BTreeMap<NaiveDate, i64>> {
        match self {
            ReservationStore::Surreal(s) => s.occupancy(window).await,
            ReservationStore::Postgres(s) => s.occupancy(window).await,
            ReservationStore::Orm(s) => s.occupancy(window).await,
        }
    }
}
