use axum::Router;

use crate::state::AppState;

pub mod availability;
pub mod bookings;
pub mod doc;
pub mod health;
pub mod params;
pub mod payments;
pub mod pricing;
pub mod refunds;
pub mod settlement;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/availability", availability::router())
        .nest("/pricing", pricing::router())
        .nest("/bookings", bookings::router())
        .nest("/payments", payments::router())
        .nest("/refunds", refunds::router())
        .nest("/settlement", settlement::router())
}
