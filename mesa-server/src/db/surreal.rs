//! Embedded document backend (SurrealDB)
//!
//! Records reference each other through record links; duplicate checks are
//! query-before-create since the store is schemaless.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::engine::local::{Db, Mem, RocksDb};
use surrealdb::{RecordId, Surreal};

use shared::models::{Reservation, ReservationStatus, RestaurantTable};
use shared::request::{NewReservation, NewTable, ReservationPatch};
use shared::util::seed_occupancy;

use super::{CreatedReservation, StoreError, StoreResult, serde_helpers};

const TABLE: &str = "restaurant_table";
const CUSTOMER: &str = "customer";
const RESERVATION: &str = "reservation";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableRecord {
    #[serde(default, with = "serde_helpers::option_record_id")]
    id: Option<RecordId>,
    table_number: String,
    capacity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CustomerRecord {
    #[serde(default, with = "serde_helpers::option_record_id")]
    id: Option<RecordId>,
    last_name: String,
    first_name: String,
    phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReservationRecord {
    #[serde(default, with = "serde_helpers::option_record_id")]
    id: Option<RecordId>,
    /// Table reference
    #[serde(with = "serde_helpers::record_id")]
    restaurant_table: RecordId,
    /// Customer reference
    #[serde(with = "serde_helpers::record_id")]
    customer: RecordId,
    status: ReservationStatus,
    #[serde(default)]
    comment: String,
    number_of_people: i32,
    reservation_date: NaiveDate,
    reservation_time: String,
    /// Unix epoch milliseconds
    created_at: i64,
    updated_at: i64,
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

fn table_to_model(record: TableRecord) -> RestaurantTable {
    RestaurantTable {
        id: record.id.map(|id| id.to_string()),
        table_number: record.table_number,
        capacity: record.capacity,
    }
}

fn reservation_to_model(record: ReservationRecord) -> Reservation {
    Reservation {
        id: record.id.map(|id| id.to_string()),
        table_id: record.restaurant_table.to_string(),
        customer_id: record.customer.to_string(),
        status: record.status,
        comment: record.comment,
        number_of_people: record.number_of_people,
        reservation_date: record.reservation_date,
        reservation_time: record.reservation_time,
        created_at: millis_to_datetime(record.created_at),
        updated_at: millis_to_datetime(record.updated_at),
    }
}

/// Document store backed by an embedded SurrealDB engine
#[derive(Clone)]
pub struct SurrealStore {
    db: Surreal<Db>,
}

impl SurrealStore {
    /// Open the on-disk engine under the work directory.
    pub async fn connect(dir: &Path) -> StoreResult<Self> {
        let db = Surreal::new::<RocksDb>(dir).await?;
        db.use_ns("mesa").use_db("reservations").await?;
        Ok(Self { db })
    }

    /// Open an in-memory engine. Used by tests and local experiments.
    pub async fn connect_memory() -> StoreResult<Self> {
        let db = Surreal::new::<Mem>(()).await?;
        db.use_ns("mesa").use_db("reservations").await?;
        Ok(Self { db })
    }

    /// Parse a "table:key" id and check it targets the expected table.
    fn parse_record_id(&self, id: &str, table: &str) -> StoreResult<RecordId> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| StoreError::Validation(format!("Invalid {table} id: {id}")))?;
        if thing.table() != table {
            return Err(StoreError::Validation(format!("Invalid {table} id: {id}")));
        }
        Ok(thing)
    }

    async fn find_table(&self, id: &str) -> StoreResult<Option<TableRecord>> {
        let thing = self.parse_record_id(id, TABLE)?;
        let record: Option<TableRecord> = self.db.select(thing).await?;
        Ok(record)
    }

    async fn find_customer_by_phone(&self, phone: &str) -> StoreResult<Option<CustomerRecord>> {
        let mut result = self
            .db
            .query("SELECT * FROM customer WHERE phone = $phone LIMIT 1")
            .bind(("phone", phone.to_string()))
            .await?;
        let customer: Option<CustomerRecord> = result.take(0)?;
        Ok(customer)
    }

    async fn find_reservation(&self, id: &str) -> StoreResult<Option<ReservationRecord>> {
        let thing = self.parse_record_id(id, RESERVATION)?;
        let record: Option<ReservationRecord> = self.db.select(thing).await?;
        Ok(record)
    }

    pub async fn create_table(&self, table: NewTable) -> StoreResult<String> {
        // Duplicate table_number check
        let mut result = self
            .db
            .query("SELECT * FROM restaurant_table WHERE table_number = $number LIMIT 1")
            .bind(("number", table.table_number.clone()))
            .await?;
        let existing: Option<TableRecord> = result.take(0)?;
        if existing.is_some() {
            return Err(StoreError::Duplicate(format!(
                "Table with number '{}' already exists",
                table.table_number
            )));
        }

        let created: Option<TableRecord> = self
            .db
            .create(TABLE)
            .content(TableRecord {
                id: None,
                table_number: table.table_number,
                capacity: table.capacity,
            })
            .await?;

        created
            .and_then(|record| record.id)
            .map(|id| id.to_string())
            .ok_or_else(|| StoreError::Database("Failed to create table".to_string()))
    }

    pub async fn list_tables(&self) -> StoreResult<Vec<RestaurantTable>> {
        let mut result = self
            .db
            .query("SELECT * FROM restaurant_table ORDER BY table_number")
            .await?;
        let tables: Vec<TableRecord> = result.take(0)?;
        Ok(tables.into_iter().map(table_to_model).collect())
    }

    pub async fn create_reservation(
        &self,
        reservation: NewReservation,
    ) -> StoreResult<CreatedReservation> {
        // Table existence first, so a bad table never creates a customer
        let table = self
            .find_table(&reservation.table_id)
            .await?
            .ok_or_else(|| {
                StoreError::Validation(format!(
                    "Table {} does not exist",
                    reservation.table_id
                ))
            })?;
        let table_id = table
            .id
            .ok_or_else(|| StoreError::Database("Table record has no id".to_string()))?;

        let customer_id = match self.find_customer_by_phone(&reservation.phone).await? {
            Some(customer) => customer
                .id
                .ok_or_else(|| StoreError::Database("Customer record has no id".to_string()))?,
            None => {
                let created: Option<CustomerRecord> = self
                    .db
                    .create(CUSTOMER)
                    .content(CustomerRecord {
                        id: None,
                        last_name: reservation.last_name.clone(),
                        first_name: reservation.first_name.clone(),
                        phone: reservation.phone.clone(),
                    })
                    .await?;
                created
                    .and_then(|record| record.id)
                    .ok_or_else(|| StoreError::Database("Failed to create customer".to_string()))?
            }
        };

        let now = Utc::now().timestamp_millis();
        let created: Option<ReservationRecord> = self
            .db
            .create(RESERVATION)
            .content(ReservationRecord {
                id: None,
                restaurant_table: table_id,
                customer: customer_id.clone(),
                status: ReservationStatus::Active,
                comment: reservation.comment,
                number_of_people: reservation.number_of_people,
                reservation_date: reservation.reservation_date,
                reservation_time: reservation.reservation_time,
                created_at: now,
                updated_at: now,
            })
            .await?;

        let reservation_id = created
            .and_then(|record| record.id)
            .ok_or_else(|| StoreError::Database("Failed to create reservation".to_string()))?;

        Ok(CreatedReservation {
            reservation_id: reservation_id.to_string(),
            customer_id: customer_id.to_string(),
        })
    }

    pub async fn get_reservation(&self, id: &str) -> StoreResult<Reservation> {
        self.find_reservation(id)
            .await?
            .map(reservation_to_model)
            .ok_or_else(|| StoreError::NotFound(format!("Reservation {id} not found")))
    }

    pub async fn update_reservation(
        &self,
        id: &str,
        patch: ReservationPatch,
    ) -> StoreResult<Reservation> {
        let thing = self.parse_record_id(id, RESERVATION)?;
        let existing = self
            .find_reservation(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Reservation {id} not found")))?;

        // A new table reference must exist before it is written
        let table = match &patch.table_id {
            Some(table_id) => {
                let table = self.find_table(table_id).await?.ok_or_else(|| {
                    StoreError::Validation(format!("Table {table_id} does not exist"))
                })?;
                table
                    .id
                    .ok_or_else(|| StoreError::Database("Table record has no id".to_string()))?
            }
            None => existing.restaurant_table.clone(),
        };

        let status = patch.status.unwrap_or(existing.status);
        let comment = patch.comment.unwrap_or(existing.comment);
        let number_of_people = patch.number_of_people.unwrap_or(existing.number_of_people);
        let reservation_date = patch.reservation_date.unwrap_or(existing.reservation_date);
        let reservation_time = patch.reservation_time.unwrap_or(existing.reservation_time);

        self.db
            .query(
                "UPDATE $thing SET restaurant_table = $table, status = $status, \
                 comment = $comment, number_of_people = $people, reservation_date = $date, \
                 reservation_time = $time, updated_at = $updated",
            )
            .bind(("thing", thing.clone()))
            .bind(("table", table))
            .bind(("status", status))
            .bind(("comment", comment))
            .bind(("people", number_of_people))
            .bind(("date", reservation_date))
            .bind(("time", reservation_time))
            .bind(("updated", Utc::now().timestamp_millis()))
            .await?;

        let updated: Option<ReservationRecord> = self.db.select(thing).await?;
        updated
            .map(reservation_to_model)
            .ok_or_else(|| StoreError::NotFound(format!("Reservation {id} not found")))
    }

    pub async fn cancel_reservation(&self, id: &str) -> StoreResult<()> {
        let thing = self.parse_record_id(id, RESERVATION)?;
        let existing = self
            .find_reservation(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Reservation {id} not found")))?;
        if existing.status != ReservationStatus::Active {
            return Err(StoreError::NotFound(format!(
                "Reservation {id} not found or already cancelled"
            )));
        }

        self.db
            .query("UPDATE $thing SET status = 'cancelled', updated_at = $updated")
            .bind(("thing", thing))
            .bind(("updated", Utc::now().timestamp_millis()))
            .await?;
        Ok(())
    }

    pub async fn occupancy(
        &self,
        window: &[NaiveDate],
    ) -> StoreResult<BTreeMap<NaiveDate, i64>> {
        let (Some(start), Some(end)) = (window.first(), window.last()) else {
            return Ok(BTreeMap::new());
        };

        #[derive(Debug, Deserialize)]
        struct OccupancyRow {
            reservation_date: NaiveDate,
            people: i64,
        }

        let mut result = self
            .db
            .query(
                "SELECT reservation_date, math::sum(number_of_people) AS people \
                 FROM reservation \
                 WHERE status = 'active' \
                 AND reservation_date >= $start AND reservation_date <= $end \
                 GROUP BY reservation_date",
            )
            .bind(("start", *start))
            .bind(("end", *end))
            .await?;
        let rows: Vec<OccupancyRow> = result.take(0)?;

        Ok(seed_occupancy(
            window,
            rows.into_iter().map(|row| (row.reservation_date, row.people)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::util::occupancy_window;

    async fn test_store() -> SurrealStore {
        SurrealStore::connect_memory().await.unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn new_table(number: &str, capacity: i32) -> NewTable {
        NewTable {
            table_number: number.to_string(),
            capacity,
        }
    }

    fn new_reservation(table_id: &str, phone: &str, date: &str, people: i32) -> NewReservation {
        NewReservation {
            table_id: table_id.to_string(),
            number_of_people: people,
            reservation_date: date.parse().unwrap(),
            reservation_time: "19:00:00".to_string(),
            last_name: "Silva".to_string(),
            first_name: "Ana".to_string(),
            phone: phone.to_string(),
            comment: String::new(),
        }
    }

    #[tokio::test]
    async fn create_table_rejects_duplicate_number() {
        let store = test_store().await;
        let id = store.create_table(new_table("T1", 4)).await.unwrap();
        assert!(id.starts_with("restaurant_table:"));

        let err = store.create_table(new_table("T1", 6)).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn booking_unknown_table_creates_no_customer() {
        let store = test_store().await;
        let err = store
            .create_reservation(new_reservation("restaurant_table:nope", "0991", "2025-06-01", 2))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let leftover = store.find_customer_by_phone("0991").await.unwrap();
        assert!(leftover.is_none());
    }

    #[tokio::test]
    async fn same_phone_reuses_customer() {
        let store = test_store().await;
        let table_id = store.create_table(new_table("T1", 4)).await.unwrap();

        let first = store
            .create_reservation(new_reservation(&table_id, "0991234567", "2025-06-01", 2))
            .await
            .unwrap();
        let mut second_request = new_reservation(&table_id, "0991234567", "2025-06-02", 3);
        second_request.last_name = "Costa".to_string();
        let second = store.create_reservation(second_request).await.unwrap();

        assert_eq!(first.customer_id, second.customer_id);
        assert_ne!(first.reservation_id, second.reservation_id);
    }

    #[tokio::test]
    async fn cancel_is_a_status_flag_and_single_shot() {
        let store = test_store().await;
        let table_id = store.create_table(new_table("T1", 4)).await.unwrap();
        let created = store
            .create_reservation(new_reservation(&table_id, "0991", "2025-06-01", 2))
            .await
            .unwrap();

        store.cancel_reservation(&created.reservation_id).await.unwrap();
        let cancelled = store.get_reservation(&created.reservation_id).await.unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);

        let err = store
            .cancel_reservation(&created.reservation_id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_touches_only_named_fields() {
        let store = test_store().await;
        let table_id = store.create_table(new_table("T1", 4)).await.unwrap();
        let created = store
            .create_reservation(new_reservation(&table_id, "0991", "2025-06-01", 2))
            .await
            .unwrap();

        let patch = ReservationPatch {
            reservation_time: Some("21:30:00".to_string()),
            ..Default::default()
        };
        let updated = store
            .update_reservation(&created.reservation_id, patch)
            .await
            .unwrap();

        assert_eq!(updated.reservation_time, "21:30:00");
        assert_eq!(updated.number_of_people, 2);
        assert_eq!(updated.reservation_date, date("2025-06-01"));
        assert_eq!(updated.table_id, table_id);
    }

    #[tokio::test]
    async fn update_rejects_unknown_table_reference() {
        let store = test_store().await;
        let table_id = store.create_table(new_table("T1", 4)).await.unwrap();
        let created = store
            .create_reservation(new_reservation(&table_id, "0991", "2025-06-01", 2))
            .await
            .unwrap();

        let patch = ReservationPatch {
            table_id: Some("restaurant_table:missing".to_string()),
            ..Default::default()
        };
        let err = store
            .update_reservation(&created.reservation_id, patch)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn occupancy_sums_active_reservations_per_day() {
        let store = test_store().await;
        let table_id = store.create_table(new_table("T1", 8)).await.unwrap();
        let window = occupancy_window(date("2025-06-01"));

        store
            .create_reservation(new_reservation(&table_id, "0991", "2025-06-02", 3))
            .await
            .unwrap();
        store
            .create_reservation(new_reservation(&table_id, "0992", "2025-06-02", 5))
            .await
            .unwrap();
        let cancelled = store
            .create_reservation(new_reservation(&table_id, "0993", "2025-06-03", 4))
            .await
            .unwrap();
        store.cancel_reservation(&cancelled.reservation_id).await.unwrap();
        // Outside the window
        store
            .create_reservation(new_reservation(&table_id, "0994", "2025-06-20", 6))
            .await
            .unwrap();

        let by_day = store.occupancy(&window).await.unwrap();
        assert_eq!(by_day.len(), 7);
        assert_eq!(by_day[&date("2025-06-02")], 8);
        assert_eq!(by_day[&date("2025-06-03")], 0);
        assert_eq!(by_day[&date("2025-06-01")], 0);
        assert_eq!(by_day.values().sum::<i64>(), 8);
    }
}
