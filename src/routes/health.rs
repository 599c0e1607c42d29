use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    pub status: String,
    pub database: String,
}

impl HealthData {
    fn report(database_up: bool) -> Self {
        Self {
            status: if database_up { "ok" } else { "degraded" }.to_string(),
            database: if database_up { "up" } else { "down" }.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database status", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthData>> {
    let database_up = state.orm.ping().await.is_ok();
    Json(ApiResponse::success(
        "Health check",
        HealthData::report(database_up),
    ))
}
