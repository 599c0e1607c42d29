use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::status::{BookingStatus, EarningStatus, PaymentStatus, RefundTicketStatus};

/// Which rate a night was priced at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PriceKind {
    Base,
    Weekend,
    Holiday,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DailyRate {
    pub date: NaiveDate,
    pub price_kind: PriceKind,
    pub price_per_room: i64,
    pub total_price: i64,
}

/// A reproducible price breakdown for a prospective stay. Not yet bound to a
/// booking; the daily breakdown makes the total independently auditable.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PriceQuote {
    pub room_type_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i64,
    pub rooms_count: i32,
    pub subtotal: i64,
    pub discount_percent: i64,
    pub discount_amount: i64,
    pub coupon_code: Option<String>,
    pub coupon_discount_amount: i64,
    pub tax_amount: i64,
    pub service_fee: i64,
    pub total_amount: i64,
    pub daily_breakdown: Vec<DailyRate>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityResult {
    pub room_type_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub rooms_requested: i32,
    pub available: bool,
    pub available_rooms: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_available: bool,
    pub available_rooms: i32,
    pub price_per_room: i64,
    pub is_weekend: bool,
    pub is_holiday: bool,
    pub is_past: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailableDatesResult {
    pub room_type_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub rooms_count: i32,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    pub id: Uuid,
    pub booking_code: String,
    pub customer_id: Uuid,
    pub property_id: Uuid,
    pub room_type_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i32,
    pub adults: i32,
    pub children: i32,
    pub rooms_count: i32,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub room_price: i64,
    pub discount_amount: i64,
    pub coupon_discount_amount: i64,
    pub tax_amount: i64,
    pub service_fee: i64,
    pub total_amount: i64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefundTicket {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub requested_amount: i64,
    pub reason: String,
    pub bank_name: String,
    pub bank_account_number: String,
    pub bank_account_holder: String,
    pub status: RefundTicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Refund {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub booking_id: Uuid,
    pub refunded_amount: i64,
    pub payment_reference: String,
    pub approved_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HostEarning {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub host_id: Uuid,
    pub earning_amount: i64,
    pub platform_fee: i64,
    pub tax_amount: i64,
    pub net_amount: i64,
    pub status: EarningStatus,
    pub payout_id: Option<Uuid>,
    pub earned_at: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HostPayout {
    pub id: Uuid,
    pub host_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_earning_amount: i64,
    pub total_platform_fee: i64,
    pub net_payout_amount: i64,
    pub earnings_count: i32,
    pub created_at: DateTime<Utc>,
}
