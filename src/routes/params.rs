use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::status::BookingStatus;

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AvailabilityQuery {
    pub room_type_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub rooms_count: Option<i32>,
    pub adults: Option<i32>,
    pub children: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CalendarQuery {
    pub room_type_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub rooms_count: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuoteQuery {
    pub room_type_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub rooms_count: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BookingListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub customer_id: Option<Uuid>,
    pub status: Option<BookingStatus>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EarningListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub host_id: Uuid,
    pub status: Option<String>,
}
