use chrono::{Datelike, Days, NaiveDate, Utc};

use crate::{
    entity::room_types,
    error::{AppError, AppResult},
    models::{AvailabilityResult, AvailableDatesResult, CalendarDay, PriceKind},
    pricing::{self, validate_date_range},
    response::ApiResponse,
    routes::params::{AvailabilityQuery, CalendarQuery},
    services::{inventory, pricing_service},
    state::AppState,
};

/// "Are K rooms free for [check_in, check_out)?" — available only if every
/// night individually has enough free capacity; `available_rooms` is the
/// minimum free count across the range. Read-only, no locks.
pub async fn check_availability(
    state: &AppState,
    query: AvailabilityQuery,
) -> AppResult<ApiResponse<AvailabilityResult>> {
    validate_date_range(query.check_in, query.check_out)?;
    let rooms_count = query.rooms_count.unwrap_or(1);
    if rooms_count <= 0 {
        return Err(AppError::BadRequest("rooms_count must be positive".into()));
    }

    let room_type = pricing_service::get_room_type(&state.orm, query.room_type_id).await?;
    ensure_guest_capacity(
        &room_type,
        query.adults.unwrap_or(1),
        query.children.unwrap_or(0),
        rooms_count,
    )?;

    let available_rooms =
        free_rooms_over_range(state, &room_type, query.check_in, query.check_out).await?;

    let result = AvailabilityResult {
        room_type_id: room_type.id,
        check_in: query.check_in,
        check_out: query.check_out,
        rooms_requested: rooms_count,
        available: available_rooms >= rooms_count,
        available_rooms,
    };
    Ok(ApiResponse::success(
        "Availability",
        result,
    ))
}

/// Day-by-day projection for one month: availability, nightly price, weekend/
/// holiday flags. Pure read, safe to compute speculatively and discard.
pub async fn build_calendar(
    state: &AppState,
    query: CalendarQuery,
) -> AppResult<ApiResponse<AvailableDatesResult>> {
    let first = NaiveDate::from_ymd_opt(query.year, query.month, 1)
        .ok_or_else(|| AppError::BadRequest("invalid year/month".into()))?;
    let next_month = if query.month == 12 {
        NaiveDate::from_ymd_opt(query.year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(query.year, query.month + 1, 1)
    }
    .ok_or_else(|| AppError::BadRequest("invalid year/month".into()))?;
    let rooms_count = query.rooms_count.unwrap_or(1).max(1);

    let room_type = pricing_service::get_room_type(&state.orm, query.room_type_id).await?;
    let plan = pricing_service::rate_plan(&room_type);
    let holidays = pricing_service::load_holidays(&state.orm, first, next_month).await?;
    let booked = inventory::booked_by_date(&state.orm, room_type.id, first, next_month).await?;

    let today = Utc::now().date_naive();
    let mut days = Vec::with_capacity(31);
    let mut date = first;
    while date < next_month {
        let kind = pricing::classify_date(date, &state.settings.weekend_days, &holidays);
        let free = room_type.total_rooms - booked.get(&date).copied().unwrap_or(0);
        let is_past = date < today;
        days.push(CalendarDay {
            date,
            is_available: !is_past && free >= rooms_count,
            available_rooms: free.max(0),
            price_per_room: pricing::nightly_rate(&plan, kind),
            is_weekend: kind == PriceKind::Weekend
                || state.settings.weekend_days.contains(&date.weekday()),
            is_holiday: kind == PriceKind::Holiday,
            is_past,
        });
        date = date + Days::new(1);
    }

    let result = AvailableDatesResult {
        room_type_id: room_type.id,
        year: query.year,
        month: query.month,
        rooms_count,
        days,
    };
    Ok(ApiResponse::success("Calendar", result))
}

/// Minimum free capacity across every night of the range.
pub async fn free_rooms_over_range(
    state: &AppState,
    room_type: &room_types::Model,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> AppResult<i32> {
    let booked = inventory::booked_by_date(&state.orm, room_type.id, check_in, check_out).await?;
    let max_booked = booked.values().copied().max().unwrap_or(0);
    Ok((room_type.total_rooms - max_booked).max(0))
}

pub fn ensure_guest_capacity(
    room_type: &room_types::Model,
    adults: i32,
    children: i32,
    rooms_count: i32,
) -> AppResult<()> {
    if adults <= 0 {
        return Err(AppError::BadRequest("at least one adult is required".into()));
    }
    if children < 0 {
        return Err(AppError::BadRequest("children must not be negative".into()));
    }
    if adults > room_type.max_adults * rooms_count {
        return Err(AppError::BadRequest(format!(
            "too many adults for {rooms_count} room(s) of this type"
        )));
    }
    if children > room_type.max_children * rooms_count {
        return Err(AppError::BadRequest(format!(
            "too many children for {rooms_count} room(s) of this type"
        )));
    }
    if adults + children > room_type.max_guests * rooms_count {
        return Err(AppError::BadRequest(format!(
            "too many guests for {rooms_count} room(s) of this type"
        )));
    }
    Ok(())
}
