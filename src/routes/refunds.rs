use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use uuid::Uuid;

use crate::{
    dto::refunds::{ApproveRefundRequest, CreateRefundTicketRequest, TicketActionRequest},
    error::AppResult,
    models::{Refund, RefundTicket},
    response::ApiResponse,
    services::refund_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tickets", post(create_ticket))
        .route("/tickets/{id}/approve", post(approve))
        .route("/tickets/{id}/reject", post(reject))
        .route("/tickets/{id}/cancel", post(cancel))
}

#[utoipa::path(
    post,
    path = "/refunds/tickets",
    request_body = CreateRefundTicketRequest,
    responses(
        (status = 200, description = "Refund ticket created", body = ApiResponse<RefundTicket>),
        (status = 422, description = "Requested amount exceeds what was paid"),
    ),
    tag = "Refunds"
)]
pub async fn create_ticket(
    State(state): State<AppState>,
    Json(payload): Json<CreateRefundTicketRequest>,
) -> AppResult<Json<ApiResponse<RefundTicket>>> {
    let resp = refund_service::create_ticket(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/refunds/tickets/{id}/approve",
    request_body = ApproveRefundRequest,
    responses(
        (status = 200, description = "Refund disbursed", body = ApiResponse<Refund>),
        (status = 422, description = "Refund exceeds the amount paid"),
    ),
    tag = "Refunds"
)]
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveRefundRequest>,
) -> AppResult<Json<ApiResponse<Refund>>> {
    let resp = refund_service::approve(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(post, path = "/refunds/tickets/{id}/reject", request_body = TicketActionRequest, tag = "Refunds")]
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TicketActionRequest>,
) -> AppResult<Json<ApiResponse<RefundTicket>>> {
    let resp = refund_service::reject(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(post, path = "/refunds/tickets/{id}/cancel", request_body = TicketActionRequest, tag = "Refunds")]
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TicketActionRequest>,
) -> AppResult<Json<ApiResponse<RefundTicket>>> {
    let resp = refund_service::cancel(&state, id, payload).await?;
    Ok(Json(resp))
}
