use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::payments::PaymentWebhookRequest,
    error::AppResult,
    models::Booking,
    response::ApiResponse,
    services::booking_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", post(webhook))
}

#[utoipa::path(
    post,
    path = "/payments/webhook",
    request_body = PaymentWebhookRequest,
    responses(
        (status = 200, description = "Booking after the payment event", body = ApiResponse<Booking>),
    ),
    tag = "Payments"
)]
pub async fn webhook(
    State(state): State<AppState>,
    Json(payload): Json<PaymentWebhookRequest>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = booking_service::handle_payment_webhook(&state, payload).await?;
    Ok(Json(resp))
}
