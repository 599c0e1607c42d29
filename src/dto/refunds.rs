use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRefundTicketRequest {
    pub booking_id: Uuid,
    pub requested_amount: i64,
    pub reason: String,
    pub bank_name: String,
    pub bank_account_number: String,
    pub bank_account_holder: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApproveRefundRequest {
    pub approved_by: Uuid,
    pub refunded_amount: i64,
    pub payment_reference: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TicketActionRequest {
    pub actor_id: Uuid,
    pub note: Option<String>,
}
