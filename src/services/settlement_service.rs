//! Settlement ledger: one HostEarning per completed, paid booking; payouts
//! batch a host's pending earnings over a period. A refund approved after a
//! payout closes never mutates that payout.

use chrono::Utc;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::settlement::{CreatePayoutRequest, EarningList, PayoutWithEarnings},
    entity::{
        bookings::Model as BookingModel,
        host_earnings::{self, Column as EarningCol, Entity as HostEarnings},
        host_payouts::{self, Entity as HostPayouts},
        properties::Entity as Properties,
    },
    error::{AppError, AppResult},
    models::{HostEarning, HostPayout},
    pricing::percent_of,
    response::ApiResponse,
    routes::params::EarningListQuery,
    state::AppState,
    status::EarningStatus,
};

/// Create the earning for a completed, paid booking. Idempotent per booking:
/// a second call returns the existing row.
pub async fn create_earning(
    txn: &DatabaseTransaction,
    booking: &BookingModel,
    platform_fee_percent: i64,
) -> AppResult<host_earnings::Model> {
    if let Some(existing) = HostEarnings::find()
        .filter(EarningCol::BookingId.eq(booking.id))
        .one(txn)
        .await?
    {
        return Ok(existing);
    }

    let property = Properties::find_by_id(booking.property_id)
        .one(txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let earning_amount =
        booking.room_price - booking.discount_amount - booking.coupon_discount_amount;
    let platform_fee = percent_of(earning_amount, platform_fee_percent);
    let net_amount = earning_amount - platform_fee - booking.tax_amount;

    let earning = host_earnings::ActiveModel {
        id: Set(Uuid::new_v4()),
        booking_id: Set(booking.id),
        host_id: Set(property.host_id),
        earning_amount: Set(earning_amount),
        platform_fee: Set(platform_fee),
        tax_amount: Set(booking.tax_amount),
        net_amount: Set(net_amount),
        status: Set(EarningStatus::Pending.as_str().to_string()),
        payout_id: Set(None),
        earned_at: Set(booking.check_out),
        created_at: Set(Utc::now().into()),
    }
    .insert(txn)
    .await?;

    tracing::info!(
        booking_id = %booking.id,
        host_id = %earning.host_id,
        net_amount,
        "host earning created"
    );
    Ok(earning)
}

/// Batch a host's pending earnings within the period into one payout and mark
/// them paid. Locks the earning rows so two admins cannot pay the same
/// earning twice.
pub async fn create_payout(
    state: &AppState,
    payload: CreatePayoutRequest,
) -> AppResult<ApiResponse<PayoutWithEarnings>> {
    if payload.period_end < payload.period_start {
        return Err(AppError::InvalidDateRange(
            "period_end must not precede period_start".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let earnings = HostEarnings::find()
        .filter(EarningCol::HostId.eq(payload.host_id))
        .filter(EarningCol::Status.eq(EarningStatus::Pending.as_str()))
        .filter(EarningCol::EarnedAt.gte(payload.period_start))
        .filter(EarningCol::EarnedAt.lte(payload.period_end))
        .order_by_asc(EarningCol::EarnedAt)
        .lock(LockType::Update)
        .all(&txn)
        .await?;

    if earnings.is_empty() {
        return Err(AppError::BadRequest(
            "no pending earnings in the requested period".into(),
        ));
    }

    let total_earning_amount: i64 = earnings.iter().map(|e| e.earning_amount).sum();
    let total_platform_fee: i64 = earnings.iter().map(|e| e.platform_fee).sum();
    let net_payout_amount: i64 = earnings.iter().map(|e| e.net_amount).sum();

    let payout = host_payouts::ActiveModel {
        id: Set(Uuid::new_v4()),
        host_id: Set(payload.host_id),
        period_start: Set(payload.period_start),
        period_end: Set(payload.period_end),
        total_earning_amount: Set(total_earning_amount),
        total_platform_fee: Set(total_platform_fee),
        net_payout_amount: Set(net_payout_amount),
        earnings_count: Set(earnings.len() as i32),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    let earning_ids: Vec<Uuid> = earnings.iter().map(|e| e.id).collect();
    HostEarnings::update_many()
        .col_expr(EarningCol::PayoutId, Expr::value(payout.id))
        .col_expr(
            EarningCol::Status,
            Expr::value(EarningStatus::Paid.as_str()),
        )
        .filter(EarningCol::Id.is_in(earning_ids))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "payout_created",
        Some("host_payouts"),
        Some(serde_json::json!({
            "payout_id": payout.id,
            "host_id": payout.host_id,
            "net_payout_amount": net_payout_amount,
            "earnings_count": earnings.len(),
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let earnings = earnings
        .into_iter()
        .map(|mut e| {
            e.payout_id = Some(payout.id);
            e.status = EarningStatus::Paid.as_str().to_string();
            earning_from_entity(e)
        })
        .collect();

    Ok(ApiResponse::success(
        "Payout created",
        PayoutWithEarnings {
            payout: payout_from_entity(payout),
            earnings,
        },
    ))
}

pub async fn list_earnings(
    state: &AppState,
    query: EarningListQuery,
) -> AppResult<ApiResponse<EarningList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all().add(EarningCol::HostId.eq(query.host_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(EarningCol::Status.eq(status.clone()));
    }

    let finder = HostEarnings::find()
        .filter(condition)
        .order_by_desc(EarningCol::EarnedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(earning_from_entity)
        .collect();

    Ok(ApiResponse::paged(
        "Earnings",
        EarningList { items },
        page,
        limit,
        total,
    ))
}

fn earning_from_entity(model: host_earnings::Model) -> HostEarning {
    let status = if model.status == EarningStatus::Paid.as_str() {
        EarningStatus::Paid
    } else {
        EarningStatus::Pending
    };
    HostEarning {
        id: model.id,
        booking_id: model.booking_id,
        host_id: model.host_id,
        earning_amount: model.earning_amount,
        platform_fee: model.platform_fee,
        tax_amount: model.tax_amount,
        net_amount: model.net_amount,
        status,
        payout_id: model.payout_id,
        earned_at: model.earned_at,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn payout_from_entity(model: host_payouts::Model) -> HostPayout {
    HostPayout {
        id: model.id,
        host_id: model.host_id,
        period_start: model.period_start,
        period_end: model.period_end,
        total_earning_amount: model.total_earning_amount,
        total_platform_fee: model.total_platform_fee,
        net_payout_amount: model.net_payout_amount,
        earnings_count: model.earnings_count,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
