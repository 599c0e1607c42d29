use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};

use crate::{
    dto::settlement::{CreatePayoutRequest, EarningList, PayoutWithEarnings},
    error::AppResult,
    response::ApiResponse,
    routes::params::EarningListQuery,
    services::settlement_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/earnings", get(list_earnings))
        .route("/payouts", post(create_payout))
}

#[utoipa::path(get, path = "/settlement/earnings", tag = "Settlement")]
pub async fn list_earnings(
    State(state): State<AppState>,
    Query(query): Query<EarningListQuery>,
) -> AppResult<Json<ApiResponse<EarningList>>> {
    let resp = settlement_service::list_earnings(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/settlement/payouts",
    request_body = CreatePayoutRequest,
    responses(
        (status = 200, description = "Payout batching the period's pending earnings", body = ApiResponse<PayoutWithEarnings>),
    ),
    tag = "Settlement"
)]
pub async fn create_payout(
    State(state): State<AppState>,
    Json(payload): Json<CreatePayoutRequest>,
) -> AppResult<Json<ApiResponse<PayoutWithEarnings>>> {
    let resp = settlement_service::create_payout(&state, payload).await?;
    Ok(Json(resp))
}
