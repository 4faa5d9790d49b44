//! Occupancy API 模块

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/v1/occupancy_next_7_days", get(handler::next_7_days))
}
