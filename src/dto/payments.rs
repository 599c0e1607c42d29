use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentEvent {
    Confirmed,
    Failed,
}

/// Gateway callback payload. The gateway references bookings by their
/// external code, not the internal id.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentWebhookRequest {
    pub booking_code: String,
    pub event: PaymentEvent,
    #[serde(default)]
    pub amount: i64,
    pub payment_reference: Option<String>,
}
