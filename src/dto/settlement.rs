use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{HostEarning, HostPayout};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePayoutRequest {
    pub host_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PayoutWithEarnings {
    pub payout: HostPayout,
    pub earnings: Vec<HostEarning>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EarningList {
    pub items: Vec<HostEarning>,
}
