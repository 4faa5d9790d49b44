//! Raw SQL backend (PostgreSQL via sqlx)
//!
//! Hand-written statements, `RETURNING` for generated ids, and a
//! transaction around reservation creation so the table check, customer
//! resolution and insert commit or roll back together.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use shared::models::{Reservation, ReservationStatus, RestaurantTable};
use shared::request::{NewReservation, NewTable, ReservationPatch};
use shared::util::seed_occupancy;

use super::{CreatedReservation, StoreError, StoreResult, parse_numeric_id};

/// Schema applied at startup. `IF NOT EXISTS` keeps restarts idempotent.
pub(crate) const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS tables (
        tid BIGSERIAL PRIMARY KEY,
        table_number TEXT NOT NULL UNIQUE,
        capacity INTEGER NOT NULL CHECK (capacity > 0)
    )",
    "CREATE TABLE IF NOT EXISTS customers (
        cid BIGSERIAL PRIMARY KEY,
        last_name TEXT NOT NULL,
        first_name TEXT NOT NULL DEFAULT '',
        phone TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS reservations (
        rid BIGSERIAL PRIMARY KEY,
        tid BIGINT NOT NULL REFERENCES tables(tid),
        cid BIGINT NOT NULL REFERENCES customers(cid),
        status TEXT NOT NULL DEFAULT 'active',
        comment TEXT NOT NULL DEFAULT '',
        number_of_people INTEGER NOT NULL,
        reservation_date DATE NOT NULL,
        reservation_time TIME NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
];

const RESERVATION_COLUMNS: &str = "rid, tid, cid, status, comment, number_of_people, \
                                   reservation_date, reservation_time, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ReservationRow {
    rid: i64,
    tid: i64,
    cid: i64,
    status: String,
    comment: String,
    number_of_people: i32,
    reservation_date: NaiveDate,
    reservation_time: NaiveTime,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn row_to_model(row: ReservationRow) -> StoreResult<Reservation> {
    let status = ReservationStatus::parse(&row.status)
        .ok_or_else(|| StoreError::Database(format!("Unknown reservation status '{}'", row.status)))?;
    Ok(Reservation {
        id: Some(row.rid.to_string()),
        table_id: row.tid.to_string(),
        customer_id: row.cid.to_string(),
        status,
        comment: row.comment,
        number_of_people: row.number_of_people,
        reservation_date: row.reservation_date,
        reservation_time: row.reservation_time.format("%H:%M:%S").to_string(),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// `HH:MM:SS` strings are validated at the API edge; a parse failure here
/// is a programming error, not user input.
fn sql_time(value: &str) -> StoreResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .map_err(|_| StoreError::Database(format!("Invalid stored time '{value}'")))
}

fn map_unique(err: sqlx::Error, message: String) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate(message),
        _ => err.into(),
    }
}

/// Raw-SQL store over a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        tracing::info!("PostgreSQL schema ensured");

        Ok(Self { pool })
    }

    pub async fn create_table(&self, table: NewTable) -> StoreResult<String> {
        let (tid,): (i64,) = sqlx::query_as(
            "INSERT INTO tables (table_number, capacity) VALUES ($1, $2) RETURNING tid",
        )
        .bind(&table.table_number)
        .bind(table.capacity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique(
                e,
                format!("Table with number '{}' already exists", table.table_number),
            )
        })?;

        Ok(tid.to_string())
    }

    pub async fn list_tables(&self) -> StoreResult<Vec<RestaurantTable>> {
        let rows: Vec<(i64, String, i32)> = sqlx::query_as(
            "SELECT tid, table_number, capacity FROM tables ORDER BY table_number",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(tid, table_number, capacity)| RestaurantTable {
                id: Some(tid.to_string()),
                table_number,
                capacity,
            })
            .collect())
    }

    pub async fn create_reservation(
        &self,
        reservation: NewReservation,
    ) -> StoreResult<CreatedReservation> {
        let tid = parse_numeric_id(&reservation.table_id, "table")?;
        let time = sql_time(&reservation.reservation_time)?;

        let mut tx = self.pool.begin().await?;

        // Table existence first, so a bad table never creates a customer
        let table: Option<(i64,)> = sqlx::query_as("SELECT tid FROM tables WHERE tid = $1")
            .bind(tid)
            .fetch_optional(&mut *tx)
            .await?;
        if table.is_none() {
            return Err(StoreError::Validation(format!("Table {tid} does not exist")));
        }

        // Phone is the customer lookup key; first sighting creates the record
        let customer: Option<(i64,)> = sqlx::query_as("SELECT cid FROM customers WHERE phone = $1")
            .bind(&reservation.phone)
            .fetch_optional(&mut *tx)
            .await?;
        let cid = match customer {
            Some((cid,)) => cid,
            None => {
                let (cid,): (i64,) = sqlx::query_as(
                    "INSERT INTO customers (last_name, first_name, phone) \
                     VALUES ($1, $2, $3) RETURNING cid",
                )
                .bind(&reservation.last_name)
                .bind(&reservation.first_name)
                .bind(&reservation.phone)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    map_unique(
                        e,
                        format!(
                            "Customer with phone '{}' already exists",
                            reservation.phone
                        ),
                    )
                })?;
                cid
            }
        };

        let (rid,): (i64,) = sqlx::query_as(
            "INSERT INTO reservations \
             (tid, cid, status, comment, number_of_people, reservation_date, reservation_time) \
             VALUES ($1, $2, 'active', $3, $4, $5, $6) RETURNING rid",
        )
        .bind(tid)
        .bind(cid)
        .bind(&reservation.comment)
        .bind(reservation.number_of_people)
        .bind(reservation.reservation_date)
        .bind(time)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CreatedReservation {
            reservation_id: rid.to_string(),
            customer_id: cid.to_string(),
        })
    }

    async fn find_reservation(&self, rid: i64) -> StoreResult<Option<ReservationRow>> {
        let row: Option<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE rid = $1"
        ))
        .bind(rid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_reservation(&self, id: &str) -> StoreResult<Reservation> {
        let rid = parse_numeric_id(id, "reservation")?;
        let row = self
            .find_reservation(rid)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Reservation {id} not found")))?;
        row_to_model(row)
    }

    pub async fn update_reservation(
        &self,
        id: &str,
        patch: ReservationPatch,
    ) -> StoreResult<Reservation> {
        let rid = parse_numeric_id(id, "reservation")?;
        let current = self
            .find_reservation(rid)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Reservation {id} not found")))?;

        let tid = match &patch.table_id {
            Some(table_id) => {
                let tid = parse_numeric_id(table_id, "table")?;
                let table: Option<(i64,)> = sqlx::query_as("SELECT tid FROM tables WHERE tid = $1")
                    .bind(tid)
                    .fetch_optional(&self.pool)
                    .await?;
                if table.is_none() {
                    return Err(StoreError::Validation(format!(
                        "Table {tid} does not exist"
                    )));
                }
                tid
            }
            None => current.tid,
        };
        let status = patch
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or(current.status);
        let comment = patch.comment.unwrap_or(current.comment);
        let number_of_people = patch.number_of_people.unwrap_or(current.number_of_people);
        let reservation_date = patch.reservation_date.unwrap_or(current.reservation_date);
        let reservation_time = match &patch.reservation_time {
            Some(time) => sql_time(time)?,
            None => current.reservation_time,
        };

        let updated: ReservationRow = sqlx::query_as(&format!(
            "UPDATE reservations SET tid = $1, status = $2, comment = $3, \
             number_of_people = $4, reservation_date = $5, reservation_time = $6, \
             updated_at = now() WHERE rid = $7 RETURNING {RESERVATION_COLUMNS}"
        ))
        .bind(tid)
        .bind(&status)
        .bind(&comment)
        .bind(number_of_people)
        .bind(reservation_date)
        .bind(reservation_time)
        .bind(rid)
        .fetch_one(&self.pool)
        .await?;

        row_to_model(updated)
    }

    pub async fn cancel_reservation(&self, id: &str) -> StoreResult<()> {
        let rid = parse_numeric_id(id, "reservation")?;
        let done = sqlx::query(
            "UPDATE reservations SET status = 'cancelled', updated_at = now() \
             WHERE rid = $1 AND status = 'active'",
        )
        .bind(rid)
        .execute(&self.pool)
        .await?;

        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "Reservation {id} not found or already cancelled"
            )));
        }
        Ok(())
    }

    pub async fn occupancy(
        &self,
        window: &[NaiveDate],
    ) -> StoreResult<BTreeMap<NaiveDate, i64>> {
        let (Some(start), Some(end)) = (window.first(), window.last()) else {
            return Ok(BTreeMap::new());
        };

        let rows: Vec<(NaiveDate, i64)> = sqlx::query_as(
            "SELECT reservation_date, SUM(number_of_people)::BIGINT \
             FROM reservations \
             WHERE status = 'active' AND reservation_date BETWEEN $1 AND $2 \
             GROUP BY reservation_date ORDER BY reservation_date",
        )
        .bind(*start)
        .bind(*end)
        .fetch_all(&self.pool)
        .await?;

        Ok(seed_occupancy(window, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_must_parse() {
        assert_eq!(parse_numeric_id("42", "table").unwrap(), 42);
        let err = parse_numeric_id("restaurant_table:42", "table").unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn rows_map_to_the_domain_model() {
        let row = ReservationRow {
            rid: 7,
            tid: 1,
            cid: 2,
            status: "active".to_string(),
            comment: String::new(),
            number_of_people: 4,
            reservation_date: "2025-06-01".parse().unwrap(),
            reservation_time: NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let model = row_to_model(row).unwrap();
        assert_eq!(model.id.as_deref(), Some("7"));
        assert_eq!(model.status, ReservationStatus::Active);
        assert_eq!(model.reservation_time, "19:30:00");
    }

    #[test]
    fn unknown_status_strings_are_a_database_error() {
        let row = ReservationRow {
            rid: 7,
            tid: 1,
            cid: 2,
            status: "pending".to_string(),
            comment: String::new(),
            number_of_people: 4,
            reservation_date: "2025-06-01".parse().unwrap(),
            reservation_time: NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(matches!(row_to_model(row), Err(StoreError::Database(_))));
    }
}
