//! Object-relational-mapper backend (SeaORM over PostgreSQL)

pub mod entities;

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    QueryFilter, SqlErr, TransactionTrait,
    ActiveValue::Set,
};

use shared::models::{Reservation, ReservationStatus, RestaurantTable};
use shared::request::{NewReservation, NewTable, ReservationPatch};
use shared::util::seed_occupancy;

use super::{CreatedReservation, StoreError, StoreResult, parse_numeric_id};
use entities::{customer, reservation, table};

fn model_to_reservation(model: reservation::Model) -> StoreResult<Reservation> {
    let status = ReservationStatus::parse(&model.status).ok_or_else(|| {
        StoreError::Database(format!("Unknown reservation status '{}'", model.status))
    })?;
    Ok(Reservation {
        id: Some(model.rid.to_string()),
        table_id: model.tid.to_string(),
        customer_id: model.cid.to_string(),
        status,
        comment: model.comment,
        number_of_people: model.number_of_people,
        reservation_date: model.reservation_date,
        reservation_time: model.reservation_time.format("%H:%M:%S").to_string(),
        created_at: model.created_at.to_utc(),
        updated_at: model.updated_at.to_utc(),
    })
}

fn orm_time(value: &str) -> StoreResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .map_err(|_| StoreError::Database(format!("Invalid stored time '{value}'")))
}

/// SeaORM store over a PostgreSQL connection
#[derive(Clone)]
pub struct OrmStore {
    db: DatabaseConnection,
}

impl OrmStore {
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let db = Database::connect(url).await?;
        for statement in super::postgres::SCHEMA {
            db.execute_unprepared(statement).await?;
        }
        tracing::info!("PostgreSQL schema ensured (orm backend)");
        Ok(Self { db })
    }

    pub async fn create_table(&self, new_table: NewTable) -> StoreResult<String> {
        let active = table::ActiveModel {
            table_number: Set(new_table.table_number.clone()),
            capacity: Set(new_table.capacity),
            ..Default::default()
        };

        match active.insert(&self.db).await {
            Ok(model) => Ok(model.tid.to_string()),
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(StoreError::Duplicate(format!(
                    "Table with number '{}' already exists",
                    new_table.table_number
                ))),
                _ => Err(err.into()),
            },
        }
    }

    pub async fn list_tables(&self) -> StoreResult<Vec<RestaurantTable>> {
        let models = table::Entity::find().all(&self.db).await?;
        Ok(models
            .into_iter()
            .map(|model| RestaurantTable {
                id: Some(model.tid.to_string()),
                table_number: model.table_number,
                capacity: model.capacity,
            })
            .collect())
    }

    pub async fn create_reservation(
        &self,
        new_reservation: NewReservation,
    ) -> StoreResult<CreatedReservation> {
        let tid = parse_numeric_id(&new_reservation.table_id, "table")?;
        let time = orm_time(&new_reservation.reservation_time)?;

        let txn = self.db.begin().await?;

        // Table existence first, so a bad table never creates a customer
        if table::Entity::find_by_id(tid).one(&txn).await?.is_none() {
            return Err(StoreError::Validation(format!("Table {tid} does not exist")));
        }

        let existing = customer::Entity::find()
            .filter(customer::Column::Phone.eq(new_reservation.phone.clone()))
            .one(&txn)
            .await?;
        let cid = match existing {
            Some(model) => model.cid,
            None => {
                let created = customer::ActiveModel {
                    last_name: Set(new_reservation.last_name.clone()),
                    first_name: Set(new_reservation.first_name.clone()),
                    phone: Set(new_reservation.phone.clone()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                created.cid
            }
        };

        let now = Utc::now().fixed_offset();
        let created = reservation::ActiveModel {
            tid: Set(tid),
            cid: Set(cid),
            status: Set(ReservationStatus::Active.as_str().to_string()),
            comment: Set(new_reservation.comment),
            number_of_people: Set(new_reservation.number_of_people),
            reservation_date: Set(new_reservation.reservation_date),
            reservation_time: Set(time),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok(CreatedReservation {
            reservation_id: created.rid.to_string(),
            customer_id: cid.to_string(),
        })
    }

    pub async fn get_reservation(&self, id: &str) -> StoreResult<Reservation> {
        let rid = parse_numeric_id(id, "reservation")?;
        let model = reservation::Entity::find_by_id(rid)
            .one(&self.db)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Reservation {id} not found")))?;
        model_to_reservation(model)
    }

    pub async fn update_reservation(
        &self,
        id: &str,
        patch: ReservationPatch,
    ) -> StoreResult<Reservation> {
        let rid = parse_numeric_id(id, "reservation")?;
        let current = reservation::Entity::find_by_id(rid)
            .one(&self.db)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Reservation {id} not found")))?;

        let mut active: reservation::ActiveModel = current.into();

        if let Some(table_id) = &patch.table_id {
            let tid = parse_numeric_id(table_id, "table")?;
            if table::Entity::find_by_id(tid).one(&self.db).await?.is_none() {
                return Err(StoreError::Validation(format!("Table {tid} does not exist")));
            }
            active.tid = Set(tid);
        }
        if let Some(status) = patch.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(comment) = patch.comment {
            active.comment = Set(comment);
        }
        if let Some(people) = patch.number_of_people {
            active.number_of_people = Set(people);
        }
        if let Some(date) = patch.reservation_date {
            active.reservation_date = Set(date);
        }
        if let Some(time) = &patch.reservation_time {
            active.reservation_time = Set(orm_time(time)?);
        }
        active.updated_at = Set(Utc::now().fixed_offset());

        let updated = active.update(&self.db).await?;
        model_to_reservation(updated)
    }

    pub async fn cancel_reservation(&self, id: &str) -> StoreResult<()> {
        let rid = parse_numeric_id(id, "reservation")?;
        let current = reservation::Entity::find_by_id(rid)
            .one(&self.db)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Reservation {id} not found")))?;
        if current.status != ReservationStatus::Active.as_str() {
            return Err(StoreError::NotFound(format!(
                "Reservation {id} not found or already cancelled"
            )));
        }

        let mut active: reservation::ActiveModel = current.into();
        active.status = Set(ReservationStatus::Cancelled.as_str().to_string());
        active.updated_at = Set(Utc::now().fixed_offset());
        active.update(&self.db).await?;
        Ok(())
    }

    pub async fn occupancy(
        &self,
        window: &[NaiveDate],
    ) -> StoreResult<BTreeMap<NaiveDate, i64>> {
        let (Some(start), Some(end)) = (window.first(), window.last()) else {
            return Ok(BTreeMap::new());
        };

        let active = reservation::Entity::find()
            .filter(reservation::Column::Status.eq(ReservationStatus::Active.as_str()))
            .filter(reservation::Column::ReservationDate.between(*start, *end))
            .all(&self.db)
            .await?;

        let mut sums: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        for model in active {
            *sums.entry(model.reservation_date).or_insert(0) += i64::from(model.number_of_people);
        }

        Ok(seed_occupancy(window, sums))
    }
}
