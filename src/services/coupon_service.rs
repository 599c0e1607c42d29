//! Coupon resolver: eligibility checks in a fixed order (first failure wins),
//! discount computation, and the transactional pairing of the `used_count`
//! increment with the usage row. The increment is a compare-and-swap against
//! the count read during validation; a lost swap surfaces as
//! `ConcurrencyConflict` and the booking transaction retries as a whole.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::{
    entity::{
        coupon_applications::{Column as AppCol, Entity as CouponApplications},
        coupon_usages::{self, Column as UsageCol, Entity as CouponUsages},
        coupons::{Column as CouponCol, Entity as Coupons, Model as CouponModel},
    },
    error::{AppError, AppResult, CouponIneligibleReason},
    models::PriceQuote,
    pricing,
};

pub const DISCOUNT_PERCENTAGE: &str = "percentage";
pub const DISCOUNT_FIXED_AMOUNT: &str = "fixed_amount";
pub const DISCOUNT_FREE_NIGHT: &str = "free_night";

/// The booking attributes a coupon's scope is checked against.
#[derive(Debug, Clone)]
pub struct BookingContext {
    pub customer_id: Uuid,
    pub property_id: Uuid,
    pub property_type: String,
    pub city: String,
}

#[derive(Debug)]
pub struct ResolvedCoupon {
    pub coupon: CouponModel,
    pub discount: i64,
}

/// Validate a coupon against a quote and booking context. Read-only; call
/// [`consume`] afterwards, in the same transaction as the booking insert.
pub async fn resolve(
    txn: &DatabaseTransaction,
    code: &str,
    quote: &PriceQuote,
    ctx: &BookingContext,
) -> AppResult<ResolvedCoupon> {
    let coupon = Coupons::find()
        .filter(CouponCol::Code.eq(code))
        .one(txn)
        .await?
        .ok_or(AppError::CouponIneligible(CouponIneligibleReason::NotFound))?;

    validate_static(&coupon, Utc::now(), quote)?;
    validate_scope(txn, &coupon, ctx).await?;

    if let Some(max) = coupon.max_total_uses {
        if coupon.used_count >= max {
            return Err(AppError::CouponIneligible(
                CouponIneligibleReason::UsageLimitReached,
            ));
        }
    }

    let prior_uses = CouponUsages::find()
        .filter(UsageCol::CouponId.eq(coupon.id))
        .filter(UsageCol::CustomerId.eq(ctx.customer_id))
        .count(txn)
        .await? as i64;
    if prior_uses >= coupon.max_uses_per_customer {
        return Err(AppError::CouponIneligible(
            CouponIneligibleReason::AlreadyUsedByCustomer,
        ));
    }

    let discount = compute_discount(&coupon, quote)?;
    Ok(ResolvedCoupon { coupon, discount })
}

/// Record the application: bump `used_count` with a version check against the
/// value read in [`resolve`] and insert the usage row. Both happen in the
/// caller's transaction, so a failed booking rolls them back together.
pub async fn consume(
    txn: &DatabaseTransaction,
    resolved: &ResolvedCoupon,
    booking_id: Uuid,
    customer_id: Uuid,
) -> AppResult<()> {
    let updated = Coupons::update_many()
        .col_expr(
            CouponCol::UsedCount,
            Expr::col(CouponCol::UsedCount).add(1),
        )
        .filter(CouponCol::Id.eq(resolved.coupon.id))
        .filter(CouponCol::UsedCount.eq(resolved.coupon.used_count))
        .exec(txn)
        .await?;
    if updated.rows_affected == 0 {
        return Err(AppError::ConcurrencyConflict);
    }

    coupon_usages::ActiveModel {
        id: Set(Uuid::new_v4()),
        coupon_id: Set(resolved.coupon.id),
        booking_id: Set(booking_id),
        customer_id: Set(customer_id),
        discount_amount: Set(resolved.discount),
        created_at: Set(Utc::now().into()),
    }
    .insert(txn)
    .await?;

    Ok(())
}

/// Checks that need no further queries: active flag, validity window,
/// minimum nights, minimum order amount — in that order.
pub fn validate_static(
    coupon: &CouponModel,
    now: DateTime<Utc>,
    quote: &PriceQuote,
) -> AppResult<()> {
    if !coupon.is_active {
        return Err(AppError::CouponIneligible(CouponIneligibleReason::Inactive));
    }
    if now < coupon.start_date {
        return Err(AppError::CouponIneligible(
            CouponIneligibleReason::NotStarted,
        ));
    }
    if now > coupon.end_date {
        return Err(AppError::CouponIneligible(CouponIneligibleReason::Expired));
    }
    if quote.nights < coupon.min_nights as i64 {
        return Err(AppError::CouponIneligible(
            CouponIneligibleReason::MinNightsNotMet,
        ));
    }
    if quote.subtotal < coupon.min_order_amount {
        return Err(AppError::CouponIneligible(
            CouponIneligibleReason::MinOrderAmountNotMet,
        ));
    }
    Ok(())
}

async fn validate_scope(
    txn: &DatabaseTransaction,
    coupon: &CouponModel,
    ctx: &BookingContext,
) -> AppResult<()> {
    if coupon.applicable_to == "all" {
        return Ok(());
    }

    let applications = CouponApplications::find()
        .filter(AppCol::CouponId.eq(coupon.id))
        .all(txn)
        .await?;

    let matches = match coupon.applicable_to.as_str() {
        "property" => applications
            .iter()
            .any(|a| a.property_id == Some(ctx.property_id)),
        "property_type" => applications
            .iter()
            .any(|a| a.property_type.as_deref() == Some(ctx.property_type.as_str())),
        "location" => applications
            .iter()
            .any(|a| a.city.as_deref() == Some(ctx.city.as_str())),
        other => {
            return Err(AppError::BadRequest(format!(
                "unknown coupon scope '{other}'"
            )));
        }
    };

    if matches {
        Ok(())
    } else {
        Err(AppError::CouponIneligible(
            CouponIneligibleReason::ScopeMismatch,
        ))
    }
}

/// The discount never exceeds what the length-of-stay discount left of the
/// subtotal, keeping every derived total non-negative.
pub fn compute_discount(coupon: &CouponModel, quote: &PriceQuote) -> AppResult<i64> {
    let discount = match coupon.discount_type.as_str() {
        DISCOUNT_PERCENTAGE => {
            let raw = pricing::percent_of(quote.subtotal, coupon.discount_value);
            match coupon.max_discount_amount {
                Some(cap) => raw.min(cap),
                None => raw,
            }
        }
        DISCOUNT_FIXED_AMOUNT => coupon.discount_value,
        DISCOUNT_FREE_NIGHT => pricing::free_night_discount(quote, coupon.discount_value),
        other => {
            return Err(AppError::BadRequest(format!(
                "unknown coupon discount type '{other}'"
            )));
        }
    };
    Ok(discount.clamp(0, quote.subtotal - quote.discount_amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use std::collections::HashSet;

    fn coupon(discount_type: &str, value: i64) -> CouponModel {
        let now = Utc::now();
        CouponModel {
            id: Uuid::new_v4(),
            code: "TEST".into(),
            is_active: true,
            discount_type: discount_type.into(),
            discount_value: value,
            max_discount_amount: None,
            min_order_amount: 0,
            min_nights: 1,
            start_date: (now - Duration::days(1)).into(),
            end_date: (now + Duration::days(1)).into(),
            max_total_uses: None,
            max_uses_per_customer: 1,
            used_count: 0,
            applicable_to: "all".into(),
            created_at: now.into(),
        }
    }

    fn sample_quote() -> PriceQuote {
        let plan = pricing::RatePlan {
            base_price: 1_000_000,
            weekend_price: Some(1_200_000),
            holiday_price: None,
            weekly_discount_percent: 0,
            monthly_discount_percent: 0,
        };
        pricing::quote(
            Uuid::new_v4(),
            &plan,
            NaiveDate::from_ymd_opt(2025, 6, 9).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
            1,
            &[chrono::Weekday::Sat, chrono::Weekday::Sun],
            &HashSet::new(),
            10,
            0,
        )
        .unwrap()
    }

    #[test]
    fn percentage_discount_respects_cap() {
        let mut c = coupon(DISCOUNT_PERCENTAGE, 50);
        let q = sample_quote(); // subtotal 3,000,000
        assert_eq!(compute_discount(&c, &q).unwrap(), 1_500_000);

        c.max_discount_amount = Some(400_000);
        assert_eq!(compute_discount(&c, &q).unwrap(), 400_000);
    }

    #[test]
    fn fixed_amount_never_exceeds_subtotal() {
        let c = coupon(DISCOUNT_FIXED_AMOUNT, 99_000_000);
        let q = sample_quote();
        assert_eq!(compute_discount(&c, &q).unwrap(), q.subtotal);
    }

    #[test]
    fn fixed_amount_capped_at_discounted_subtotal() {
        // A stay long enough for the weekly discount: the coupon can only
        // take what that discount left over.
        let plan = pricing::RatePlan {
            base_price: 1_000_000,
            weekend_price: None,
            holiday_price: None,
            weekly_discount_percent: 10,
            monthly_discount_percent: 0,
        };
        let q = pricing::quote(
            Uuid::new_v4(),
            &plan,
            NaiveDate::from_ymd_opt(2025, 6, 9).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 16).unwrap(),
            1,
            &[],
            &HashSet::new(),
            10,
            0,
        )
        .unwrap();
        assert_eq!(q.discount_amount, 700_000);

        let c = coupon(DISCOUNT_FIXED_AMOUNT, 7_000_000);
        assert_eq!(compute_discount(&c, &q).unwrap(), 6_300_000);
    }

    #[test]
    fn free_night_uses_cheapest_night() {
        let c = coupon(DISCOUNT_FREE_NIGHT, 1);
        let q = sample_quote(); // three weekday nights at base rate
        assert_eq!(compute_discount(&c, &q).unwrap(), 1_000_000);
    }

    #[test]
    fn inactive_coupon_rejected_first() {
        let mut c = coupon(DISCOUNT_PERCENTAGE, 10);
        c.is_active = false;
        c.min_nights = 30; // would also fail, but inactive must win
        let err = validate_static(&c, Utc::now(), &sample_quote()).unwrap_err();
        assert!(matches!(
            err,
            AppError::CouponIneligible(CouponIneligibleReason::Inactive)
        ));
    }

    #[test]
    fn window_checks_run_before_minimums() {
        let mut c = coupon(DISCOUNT_PERCENTAGE, 10);
        c.end_date = (Utc::now() - Duration::days(2)).into();
        c.min_order_amount = 99_000_000;
        let err = validate_static(&c, Utc::now(), &sample_quote()).unwrap_err();
        assert!(matches!(
            err,
            AppError::CouponIneligible(CouponIneligibleReason::Expired)
        ));
    }

    #[test]
    fn minimum_nights_and_order_amount_enforced() {
        let mut c = coupon(DISCOUNT_PERCENTAGE, 10);
        c.min_nights = 7;
        let err = validate_static(&c, Utc::now(), &sample_quote()).unwrap_err();
        assert!(matches!(
            err,
            AppError::CouponIneligible(CouponIneligibleReason::MinNightsNotMet)
        ));

        let mut c = coupon(DISCOUNT_PERCENTAGE, 10);
        c.min_order_amount = 99_000_000;
        let err = validate_static(&c, Utc::now(), &sample_quote()).unwrap_err();
        assert!(matches!(
            err,
            AppError::CouponIneligible(CouponIneligibleReason::MinOrderAmountNotMet)
        ));
    }
}
