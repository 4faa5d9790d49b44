//! Occupancy API Handlers

use axum::{Json, extract::State};
use chrono::Local;

use shared::response::OccupancyResponse;
use shared::util::occupancy_window;

use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/v1/occupancy_next_7_days - 未来七天上座率
///
/// 窗口为 [today, today+6]，两端闭区间。没有预订的日期也会出现在
/// `occupancy_by_day` 中，值为 0。
pub async fn next_7_days(
    State(state): State<ServerState>,
) -> AppResult<Json<OccupancyResponse>> {
    let today = Local::now().date_naive();
    let window = occupancy_window(today);

    let by_day = state.store.occupancy(&window).await?;

    let total_people = by_day.values().sum();
    let occupancy_by_day = by_day
        .into_iter()
        .map(|(date, people)| (date.format("%Y-%m-%d").to_string(), people))
        .collect();

    Ok(Json(OccupancyResponse {
        total_people,
        occupancy_by_day,
    }))
}
