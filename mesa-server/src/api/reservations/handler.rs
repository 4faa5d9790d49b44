//! Reservation API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use shared::models::Reservation;
use shared::request::{CreateReservationRequest, UpdateReservationRequest};
use shared::response::{MessageResponse, ReservationCreatedResponse, ReservationResponse};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// POST /api/v1/reservations - 创建预订
///
/// 校验顺序：必填字段 → 餐桌存在 → 按电话复用/创建顾客 → 写入预订。
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<ReservationCreatedResponse>)> {
    let reservation = payload.validated().map_err(AppError::validation)?;

    let reservation_date = reservation.reservation_date.to_string();
    let reservation_time = reservation.reservation_time.clone();
    let number_of_people = reservation.number_of_people;
    let table_id = reservation.table_id.clone();

    let created = state.store.create_reservation(reservation).await?;

    tracing::info!(
        reservation_id = %created.reservation_id,
        customer_id = %created.customer_id,
        "Reservation created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ReservationCreatedResponse {
            reservation_id: created.reservation_id,
            customer_id: created.customer_id,
            table_id,
            reservation_date,
            reservation_time,
            number_of_people,
            message: "Reservation created successfully".to_string(),
        }),
    ))
}

/// GET /api/v1/reservations/:id - 获取单个预订
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Reservation>> {
    let reservation = state.store.get_reservation(&id).await?;
    Ok(Json(reservation))
}

/// PUT /api/v1/reservations/:id - 修改预订 (任意字段子集)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateReservationRequest>,
) -> AppResult<Json<ReservationResponse>> {
    let patch = payload.validated().map_err(AppError::validation)?;
    let reservation = state.store.update_reservation(&id, patch).await?;

    Ok(Json(ReservationResponse {
        message: format!("Reservation {id} modified successfully"),
        reservation,
    }))
}

/// DELETE /api/v1/reservations/:id - 取消预订 (状态流转，二次取消 404)
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.store.cancel_reservation(&id).await?;

    tracing::info!(reservation_id = %id, "Reservation cancelled");

    Ok(Json(MessageResponse {
        message: format!("Reservation {id} cancelled successfully"),
    }))
}
