use std::collections::HashSet;

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    config::PlatformSettings,
    entity::{
        holidays::{Column as HolidayCol, Entity as Holidays},
        room_types::{self, Entity as RoomTypes},
    },
    error::{AppError, AppResult},
    models::PriceQuote,
    pricing::{self, RatePlan},
    response::ApiResponse,
    state::AppState,
};

pub async fn get_room_type<C: ConnectionTrait>(
    conn: &C,
    room_type_id: Uuid,
) -> AppResult<room_types::Model> {
    RoomTypes::find_by_id(room_type_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn load_holidays<C: ConnectionTrait>(
    conn: &C,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<HashSet<NaiveDate>> {
    let rows = Holidays::find()
        .filter(HolidayCol::Date.gte(from))
        .filter(HolidayCol::Date.lt(to))
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(|row| row.date).collect())
}

pub fn rate_plan(room_type: &room_types::Model) -> RatePlan {
    RatePlan {
        base_price: room_type.base_price,
        weekend_price: room_type.weekend_price,
        holiday_price: room_type.holiday_price,
        weekly_discount_percent: room_type.weekly_discount_percent,
        monthly_discount_percent: room_type.monthly_discount_percent,
    }
}

/// Quote a stay against a loaded room type; shared between the public quote
/// endpoint and the booking transaction so both price identically.
pub async fn quote_for_room_type<C: ConnectionTrait>(
    conn: &C,
    settings: &PlatformSettings,
    room_type: &room_types::Model,
    check_in: NaiveDate,
    check_out: NaiveDate,
    rooms_count: i32,
) -> AppResult<PriceQuote> {
    let holidays = load_holidays(conn, check_in, check_out).await?;
    pricing::quote(
        room_type.id,
        &rate_plan(room_type),
        check_in,
        check_out,
        rooms_count,
        &settings.weekend_days,
        &holidays,
        settings.tax_percent,
        settings.service_fee,
    )
}

pub async fn get_quote(
    state: &AppState,
    room_type_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    rooms_count: i32,
) -> AppResult<ApiResponse<PriceQuote>> {
    let room_type = get_room_type(&state.orm, room_type_id).await?;
    let quote = quote_for_room_type(
        &state.orm,
        &state.settings,
        &room_type,
        check_in,
        check_out,
        rooms_count,
    )
    .await?;
    Ok(ApiResponse::success("Quote", quote))
}
