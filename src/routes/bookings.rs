use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::bookings::{BookingCreated, BookingList, CreateBookingRequest, TransitionRequest},
    error::AppResult,
    models::Booking,
    response::ApiResponse,
    routes::params::BookingListQuery,
    services::booking_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route("/{id}", get(get_booking))
        .route("/{id}/transition", post(transition_booking))
}

#[utoipa::path(get, path = "/bookings", tag = "Bookings")]
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<ApiResponse<BookingList>>> {
    let resp = booking_service::list_bookings(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Booking created with its quote", body = ApiResponse<BookingCreated>),
        (status = 409, description = "Insufficient inventory"),
        (status = 422, description = "Invalid dates or ineligible coupon"),
    ),
    tag = "Bookings"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<ApiResponse<BookingCreated>>> {
    let resp = booking_service::create_booking(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/bookings/{id}", tag = "Bookings")]
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = booking_service::get_booking(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/bookings/{id}/transition",
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Booking after the transition", body = ApiResponse<Booking>),
        (status = 409, description = "Transition not allowed from the current status"),
    ),
    tag = "Bookings"
)]
pub async fn transition_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionRequest>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = booking_service::transition(&state, id, payload).await?;
    Ok(Json(resp))
}
