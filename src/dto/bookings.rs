use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Booking, PriceQuote};
use crate::status::BookingStatus;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    pub customer_id: Uuid,
    pub room_type_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub rooms_count: i32,
    pub adults: i32,
    #[serde(default)]
    pub children: i32,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionRequest {
    pub target_status: BookingStatus,
    pub actor_id: Uuid,
    pub note: Option<String>,
}

/// The created booking together with the quote it was priced from, so the
/// caller can audit the daily breakdown behind the stored totals.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingCreated {
    pub booking: Booking,
    pub quote: PriceQuote,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingList {
    pub items: Vec<Booking>,
}
