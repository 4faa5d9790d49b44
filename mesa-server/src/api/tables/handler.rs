//! Restaurant Table API Handlers

use axum::{Json, extract::State, http::StatusCode};

use shared::request::CreateTableRequest;
use shared::response::{TableCreatedResponse, TablesResponse};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// POST /api/v1/tables - 创建餐桌
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateTableRequest>,
) -> AppResult<(StatusCode, Json<TableCreatedResponse>)> {
    let table = payload.validated().map_err(AppError::validation)?;
    let table_id = state.store.create_table(table).await?;

    tracing::info!(table_id = %table_id, "Table created");

    Ok((
        StatusCode::CREATED,
        Json(TableCreatedResponse {
            table_id,
            message: "Table created successfully".to_string(),
        }),
    ))
}

/// GET /api/v1/tables - 获取所有餐桌
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<TablesResponse>> {
    let tables = state.store.list_tables().await?;
    Ok(Json(TablesResponse { tables }))
}
