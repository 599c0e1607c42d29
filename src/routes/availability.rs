use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    error::AppResult,
    models::{AvailabilityResult, AvailableDatesResult},
    response::ApiResponse,
    routes::params::{AvailabilityQuery, CalendarQuery},
    services::availability_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(check_availability))
        .route("/calendar", get(calendar))
}

#[utoipa::path(
    get,
    path = "/availability",
    params(
        ("room_type_id" = uuid::Uuid, Query,),
        ("check_in" = String, Query, description = "YYYY-MM-DD"),
        ("check_out" = String, Query, description = "YYYY-MM-DD"),
        ("rooms_count" = Option<i32>, Query,),
        ("adults" = Option<i32>, Query,),
        ("children" = Option<i32>, Query,),
    ),
    responses(
        (status = 200, description = "Availability over the range", body = ApiResponse<AvailabilityResult>),
    ),
    tag = "Availability"
)]
pub async fn check_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<ApiResponse<AvailabilityResult>>> {
    let resp = availability_service::check_availability(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/availability/calendar",
    params(
        ("room_type_id" = uuid::Uuid, Query,),
        ("year" = i32, Query,),
        ("month" = u32, Query,),
        ("rooms_count" = Option<i32>, Query,),
    ),
    responses(
        (status = 200, description = "Day-by-day month view", body = ApiResponse<AvailableDatesResult>),
    ),
    tag = "Availability"
)]
pub async fn calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<ApiResponse<AvailableDatesResult>>> {
    let resp = availability_service::build_calendar(&state, query).await?;
    Ok(Json(resp))
}
