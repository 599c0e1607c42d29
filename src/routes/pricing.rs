use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    error::AppResult,
    models::PriceQuote,
    response::ApiResponse,
    routes::params::QuoteQuery,
    services::pricing_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/quote", get(quote))
}

#[utoipa::path(
    get,
    path = "/pricing/quote",
    params(
        ("room_type_id" = uuid::Uuid, Query,),
        ("check_in" = String, Query, description = "YYYY-MM-DD"),
        ("check_out" = String, Query, description = "YYYY-MM-DD"),
        ("rooms_count" = Option<i32>, Query,),
    ),
    responses(
        (status = 200, description = "Deterministic price breakdown", body = ApiResponse<PriceQuote>),
    ),
    tag = "Pricing"
)]
pub async fn quote(
    State(state): State<AppState>,
    Query(query): Query<QuoteQuery>,
) -> AppResult<Json<ApiResponse<PriceQuote>>> {
    let resp = pricing_service::get_quote(
        &state,
        query.room_type_id,
        query.check_in,
        query.check_out,
        query.rooms_count.unwrap_or(1),
    )
    .await?;
    Ok(Json(resp))
}
