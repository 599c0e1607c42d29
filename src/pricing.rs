//! Pure price-quoting engine.
//!
//! Everything in this module is a function of its inputs (rate plan, date
//! range, rooms count, weekend/holiday configuration) so the same request
//! always reproduces the same breakdown. All I/O lives in the service layer.

use std::collections::HashSet;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{DailyRate, PriceKind, PriceQuote};

pub const WEEKLY_MIN_NIGHTS: i64 = 7;
pub const MONTHLY_MIN_NIGHTS: i64 = 28;

/// Pricing configuration of a room type, detached from the entity so the
/// engine stays free of persistence types.
#[derive(Debug, Clone)]
pub struct RatePlan {
    pub base_price: i64,
    pub weekend_price: Option<i64>,
    pub holiday_price: Option<i64>,
    pub weekly_discount_percent: i64,
    pub monthly_discount_percent: i64,
}

/// Integer percent application; truncates toward zero. The single rounding
/// rule used everywhere money meets a percentage.
pub fn percent_of(amount: i64, percent: i64) -> i64 {
    amount * percent / 100
}

pub fn classify_date(
    date: NaiveDate,
    weekend_days: &[Weekday],
    holidays: &HashSet<NaiveDate>,
) -> PriceKind {
    if holidays.contains(&date) {
        PriceKind::Holiday
    } else if weekend_days.contains(&date.weekday()) {
        PriceKind::Weekend
    } else {
        PriceKind::Base
    }
}

pub fn nightly_rate(plan: &RatePlan, kind: PriceKind) -> i64 {
    match kind {
        PriceKind::Holiday => plan.holiday_price.unwrap_or(plan.base_price),
        PriceKind::Weekend => plan.weekend_price.unwrap_or(plan.base_price),
        PriceKind::Base => plan.base_price,
    }
}

pub fn validate_date_range(check_in: NaiveDate, check_out: NaiveDate) -> AppResult<i64> {
    if check_out <= check_in {
        return Err(AppError::InvalidDateRange(format!(
            "check_out {check_out} must be after check_in {check_in}"
        )));
    }
    Ok((check_out - check_in).num_days())
}

/// Build a full quote for `[check_in, check_out)`.
///
/// Nightly rate: holiday price beats weekend price beats base price. The
/// length-of-stay discount tiers are mutually exclusive (the longer tier
/// wins) and apply once to the whole-stay subtotal. Tax applies to the
/// post-discount base; the service fee is flat per booking.
#[allow(clippy::too_many_arguments)]
pub fn quote(
    room_type_id: Uuid,
    plan: &RatePlan,
    check_in: NaiveDate,
    check_out: NaiveDate,
    rooms_count: i32,
    weekend_days: &[Weekday],
    holidays: &HashSet<NaiveDate>,
    tax_percent: i64,
    service_fee: i64,
) -> AppResult<PriceQuote> {
    let nights = validate_date_range(check_in, check_out)?;
    if rooms_count <= 0 {
        return Err(AppError::BadRequest("rooms_count must be positive".into()));
    }

    let mut daily_breakdown = Vec::with_capacity(nights as usize);
    let mut subtotal: i64 = 0;
    let mut date = check_in;
    while date < check_out {
        let kind = classify_date(date, weekend_days, holidays);
        let price_per_room = nightly_rate(plan, kind);
        let total_price = price_per_room * rooms_count as i64;
        subtotal += total_price;
        daily_breakdown.push(DailyRate {
            date,
            price_kind: kind,
            price_per_room,
            total_price,
        });
        date = date + Days::new(1);
    }

    let discount_percent = if nights >= MONTHLY_MIN_NIGHTS {
        plan.monthly_discount_percent
    } else if nights >= WEEKLY_MIN_NIGHTS {
        plan.weekly_discount_percent
    } else {
        0
    };
    let discount_amount = percent_of(subtotal, discount_percent);

    let taxable = subtotal - discount_amount;
    let tax_amount = percent_of(taxable, tax_percent);
    let total_amount = taxable + tax_amount + service_fee;

    Ok(PriceQuote {
        room_type_id,
        check_in,
        check_out,
        nights,
        rooms_count,
        subtotal,
        discount_percent,
        discount_amount,
        coupon_code: None,
        coupon_discount_amount: 0,
        tax_amount,
        service_fee,
        total_amount,
        daily_breakdown,
    })
}

/// Fold a resolved coupon discount into an existing quote, recomputing tax on
/// the post-coupon base. The discount is capped at what is left after the
/// length-of-stay discount, so the component columns always sum exactly to
/// the total.
pub fn apply_coupon_discount(
    quote: &mut PriceQuote,
    code: &str,
    discount: i64,
    tax_percent: i64,
) {
    let discount = discount.clamp(0, quote.subtotal - quote.discount_amount);
    quote.coupon_code = Some(code.to_string());
    quote.coupon_discount_amount = discount;
    let base = quote.subtotal - quote.discount_amount - discount;
    quote.tax_amount = percent_of(base, tax_percent);
    quote.total_amount = base + quote.tax_amount + quote.service_fee;
}

/// Discount for a free-night coupon: the cheapest `free_nights` per-room
/// rates of the stay, across all booked rooms, never exceeding the subtotal.
pub fn free_night_discount(quote: &PriceQuote, free_nights: i64) -> i64 {
    let mut rates: Vec<i64> = quote
        .daily_breakdown
        .iter()
        .map(|d| d.price_per_room)
        .collect();
    rates.sort_unstable();
    let take = free_nights.clamp(0, rates.len() as i64) as usize;
    let discount: i64 = rates[..take].iter().sum::<i64>() * quote.rooms_count as i64;
    discount.min(quote.subtotal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> RatePlan {
        RatePlan {
            base_price: 1_000_000,
            weekend_price: Some(1_200_000),
            holiday_price: Some(1_500_000),
            weekly_discount_percent: 10,
            monthly_discount_percent: 20,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const WEEKEND: [Weekday; 2] = [Weekday::Sat, Weekday::Sun];

    #[test]
    fn seven_night_stay_with_two_weekend_nights() {
        // Friday 2025-06-06 to Friday 2025-06-13: Sat 7th and Sun 8th are
        // weekend nights, the other five are base nights.
        let q = quote(
            Uuid::new_v4(),
            &plan(),
            d(2025, 6, 6),
            d(2025, 6, 13),
            1,
            &WEEKEND,
            &HashSet::new(),
            10,
            0,
        )
        .unwrap();

        assert_eq!(q.nights, 7);
        assert_eq!(q.subtotal, 7_400_000);
        assert_eq!(q.discount_percent, 10);
        assert_eq!(q.discount_amount, 740_000);
        assert_eq!(q.tax_amount, 666_000);
        assert_eq!(q.total_amount, 7_326_000);
        assert_eq!(
            q.subtotal - q.discount_amount - q.coupon_discount_amount + q.tax_amount
                + q.service_fee,
            q.total_amount
        );
    }

    #[test]
    fn short_stay_gets_no_length_discount() {
        let q = quote(
            Uuid::new_v4(),
            &plan(),
            d(2025, 6, 9),
            d(2025, 6, 11),
            2,
            &WEEKEND,
            &HashSet::new(),
            10,
            50_000,
        )
        .unwrap();
        assert_eq!(q.nights, 2);
        assert_eq!(q.discount_amount, 0);
        assert_eq!(q.subtotal, 4_000_000);
        assert_eq!(q.total_amount, 4_000_000 + 400_000 + 50_000);
    }

    #[test]
    fn monthly_tier_beats_weekly_tier() {
        let q = quote(
            Uuid::new_v4(),
            &plan(),
            d(2025, 3, 1),
            d(2025, 3, 29),
            1,
            &[],
            &HashSet::new(),
            0,
            0,
        )
        .unwrap();
        assert_eq!(q.nights, 28);
        assert_eq!(q.discount_percent, 20);
        assert_eq!(q.discount_amount, percent_of(q.subtotal, 20));
    }

    #[test]
    fn holiday_price_beats_weekend_price() {
        let mut holidays = HashSet::new();
        holidays.insert(d(2025, 6, 7)); // a Saturday
        let q = quote(
            Uuid::new_v4(),
            &plan(),
            d(2025, 6, 7),
            d(2025, 6, 8),
            1,
            &WEEKEND,
            &holidays,
            0,
            0,
        )
        .unwrap();
        assert_eq!(q.daily_breakdown[0].price_kind, PriceKind::Holiday);
        assert_eq!(q.subtotal, 1_500_000);
    }

    #[test]
    fn missing_weekend_price_falls_back_to_base() {
        let bare = RatePlan {
            weekend_price: None,
            holiday_price: None,
            ..plan()
        };
        let q = quote(
            Uuid::new_v4(),
            &bare,
            d(2025, 6, 6),
            d(2025, 6, 9),
            1,
            &WEEKEND,
            &HashSet::new(),
            0,
            0,
        )
        .unwrap();
        assert!(q.daily_breakdown.iter().all(|n| n.price_per_room == 1_000_000));
    }

    #[test]
    fn quote_is_reproducible() {
        let id = Uuid::new_v4();
        let holidays = HashSet::from([d(2025, 6, 10)]);
        let a = quote(id, &plan(), d(2025, 6, 6), d(2025, 6, 13), 2, &WEEKEND, &holidays, 10, 100_000).unwrap();
        let b = quote(id, &plan(), d(2025, 6, 6), d(2025, 6, 13), 2, &WEEKEND, &holidays, 10, 100_000).unwrap();
        assert_eq!(a.daily_breakdown, b.daily_breakdown);
        assert_eq!(a.total_amount, b.total_amount);
    }

    #[test]
    fn rejects_inverted_range() {
        let err = quote(
            Uuid::new_v4(),
            &plan(),
            d(2025, 6, 13),
            d(2025, 6, 6),
            1,
            &WEEKEND,
            &HashSet::new(),
            10,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidDateRange(_)));
    }

    #[test]
    fn coupon_discount_recomputes_tax() {
        let mut q = quote(
            Uuid::new_v4(),
            &plan(),
            d(2025, 6, 9),
            d(2025, 6, 11),
            1,
            &WEEKEND,
            &HashSet::new(),
            10,
            0,
        )
        .unwrap();
        apply_coupon_discount(&mut q, "SUMMER", 500_000, 10);
        assert_eq!(q.coupon_discount_amount, 500_000);
        assert_eq!(q.tax_amount, percent_of(2_000_000 - 500_000, 10));
        assert_eq!(q.total_amount, 1_500_000 + 150_000);
    }

    #[test]
    fn oversized_coupon_collapses_to_discounted_subtotal() {
        // 7 base nights with the weekly discount leave 6,300,000 on the
        // table; a larger fixed coupon must cap there, not at the subtotal.
        let bare = RatePlan {
            weekend_price: None,
            holiday_price: None,
            ..plan()
        };
        let mut q = quote(
            Uuid::new_v4(),
            &bare,
            d(2025, 6, 9),
            d(2025, 6, 16),
            1,
            &[],
            &HashSet::new(),
            10,
            0,
        )
        .unwrap();
        assert_eq!(q.subtotal, 7_000_000);
        assert_eq!(q.discount_amount, 700_000);

        apply_coupon_discount(&mut q, "BIG", 7_000_000, 10);
        assert_eq!(q.coupon_discount_amount, 6_300_000);
        assert_eq!(q.tax_amount, 0);
        assert_eq!(q.total_amount, 0);
        assert_eq!(
            q.subtotal - q.discount_amount - q.coupon_discount_amount + q.tax_amount
                + q.service_fee,
            q.total_amount
        );
    }

    #[test]
    fn free_night_takes_cheapest_nights() {
        let q = quote(
            Uuid::new_v4(),
            &plan(),
            d(2025, 6, 6), // Fri base, Sat+Sun weekend
            d(2025, 6, 9),
            2,
            &WEEKEND,
            &HashSet::new(),
            0,
            0,
        )
        .unwrap();
        // cheapest night is the base-rate Friday
        assert_eq!(free_night_discount(&q, 1), 2_000_000);
        // more free nights than the stay has collapses to the subtotal
        assert_eq!(free_night_discount(&q, 10), q.subtotal);
    }
}
