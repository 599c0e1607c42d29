//! Booking lifecycle. `create_booking` is the critical section: reserve,
//! quote, coupon application, and the booking insert all live in one
//! transaction, so an inventory hold can never leak from a failed create.
//! Lost coupon compare-and-swaps retry the whole transaction a bounded
//! number of times before surfacing `ConcurrencyConflict`.

use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::bookings::{BookingCreated, BookingList, CreateBookingRequest, TransitionRequest},
    dto::payments::{PaymentEvent, PaymentWebhookRequest},
    entity::{
        bookings::{self, Column as BookingCol, Entity as Bookings, Model as BookingModel},
        properties::Entity as Properties,
    },
    error::{AppError, AppResult},
    models::{Booking, PriceQuote},
    pricing,
    response::ApiResponse,
    routes::params::{BookingListQuery, SortOrder},
    services::{availability_service, coupon_service, inventory, pricing_service, settlement_service},
    state::AppState,
    status::{BookingStatus, PaymentStatus},
};

const CREATE_RETRIES: u32 = 3;

pub async fn create_booking(
    state: &AppState,
    payload: CreateBookingRequest,
) -> AppResult<ApiResponse<BookingCreated>> {
    let mut attempt = 0;
    let (booking, quote) = loop {
        attempt += 1;
        match try_create(state, &payload).await {
            Ok(created) => break created,
            Err(AppError::ConcurrencyConflict) if attempt < CREATE_RETRIES => {
                tracing::debug!(attempt, "booking create hit a concurrent update, retrying");
            }
            Err(err) => return Err(err),
        }
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(payload.customer_id),
        "booking_created",
        Some("bookings"),
        Some(serde_json::json!({
            "booking_id": booking.id,
            "booking_code": booking.booking_code,
            "total_amount": booking.total_amount,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
    state
        .notifier
        .booking_created(booking.id, &booking.booking_code);

    let booking = booking_from_entity(booking)?;
    Ok(ApiResponse::success(
        "Booking created",
        BookingCreated { booking, quote },
    ))
}

async fn try_create(
    state: &AppState,
    payload: &CreateBookingRequest,
) -> AppResult<(BookingModel, PriceQuote)> {
    let txn = state.orm.begin().await?;

    let room_type = pricing_service::get_room_type(&txn, payload.room_type_id).await?;
    let property = Properties::find_by_id(room_type.property_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    availability_service::ensure_guest_capacity(
        &room_type,
        payload.adults,
        payload.children,
        payload.rooms_count,
    )?;

    // Reserve before the price is finalized and before the booking row exists.
    let hold = inventory::reserve(
        &txn,
        &room_type,
        payload.check_in,
        payload.check_out,
        payload.rooms_count,
        state.settings.hold_ttl_minutes,
    )
    .await?;

    let mut quote = pricing_service::quote_for_room_type(
        &txn,
        &state.settings,
        &room_type,
        payload.check_in,
        payload.check_out,
        payload.rooms_count,
    )
    .await?;

    let resolved = match payload.coupon_code.as_deref().filter(|c| !c.is_empty()) {
        Some(code) => {
            let ctx = coupon_service::BookingContext {
                customer_id: payload.customer_id,
                property_id: property.id,
                property_type: property.property_type.clone(),
                city: property.city.clone(),
            };
            let resolved = coupon_service::resolve(&txn, code, &quote, &ctx).await?;
            pricing::apply_coupon_discount(
                &mut quote,
                code,
                resolved.discount,
                state.settings.tax_percent,
            );
            Some(resolved)
        }
        None => None,
    };

    let booking_id = Uuid::new_v4();
    let booking = bookings::ActiveModel {
        id: Set(booking_id),
        booking_code: Set(build_booking_code(booking_id)),
        customer_id: Set(payload.customer_id),
        property_id: Set(property.id),
        room_type_id: Set(room_type.id),
        hold_id: Set(hold.id),
        check_in: Set(payload.check_in),
        check_out: Set(payload.check_out),
        nights: Set(quote.nights as i32),
        adults: Set(payload.adults),
        children: Set(payload.children),
        rooms_count: Set(payload.rooms_count),
        guest_name: Set(payload.guest_name.clone()),
        guest_email: Set(payload.guest_email.clone()),
        guest_phone: Set(payload.guest_phone.clone()),
        room_price: Set(quote.subtotal),
        discount_amount: Set(quote.discount_amount),
        coupon_discount_amount: Set(quote.coupon_discount_amount),
        tax_amount: Set(quote.tax_amount),
        service_fee: Set(quote.service_fee),
        total_amount: Set(quote.total_amount),
        status: Set(BookingStatus::Pending.as_str().to_string()),
        payment_status: Set(PaymentStatus::Unpaid.as_str().to_string()),
        paid_at: Set(None),
        cancelled_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    if let Some(resolved) = &resolved {
        coupon_service::consume(&txn, resolved, booking.id, payload.customer_id).await?;
    }

    txn.commit().await?;
    Ok((booking, quote))
}

/// Apply a lifecycle transition, guarded by the transition table, with its
/// side effects in the same transaction as the status write.
pub async fn transition(
    state: &AppState,
    booking_id: Uuid,
    payload: TransitionRequest,
) -> AppResult<ApiResponse<Booking>> {
    let txn = state.orm.begin().await?;

    let booking = lock_booking(&txn, BookingCol::Id.eq(booking_id)).await?;
    let current = parse_status(&booking)?;
    let target = payload.target_status;
    current.ensure_transition(target)?;

    let payment_status = parse_payment_status(&booking)?;
    match target {
        BookingStatus::Confirmed => {
            let room_type = pricing_service::get_room_type(&txn, booking.room_type_id).await?;
            inventory::commit(&txn, &room_type, booking.hold_id).await?;
        }
        BookingStatus::Cancelled => {
            inventory::release(&txn, booking.hold_id).await?;
        }
        BookingStatus::Completed => {
            if payment_status == PaymentStatus::Paid {
                settlement_service::create_earning(
                    &txn,
                    &booking,
                    state.settings.platform_fee_percent,
                )
                .await?;
            }
        }
        BookingStatus::CheckedIn | BookingStatus::NoShow => {}
        BookingStatus::Pending => {}
    }

    let refund_eligible =
        target == BookingStatus::Cancelled && payment_status.has_paid_funds();

    let mut active: bookings::ActiveModel = booking.into();
    active.status = Set(target.as_str().to_string());
    if target == BookingStatus::Cancelled {
        active.cancelled_at = Set(Some(Utc::now().into()));
    }
    active.updated_at = Set(Utc::now().into());
    let booking = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(payload.actor_id),
        "booking_transition",
        Some("bookings"),
        Some(serde_json::json!({
            "booking_id": booking.id,
            "from": current.as_str(),
            "to": target.as_str(),
            "note": payload.note,
            "refund_eligible": refund_eligible,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
    state
        .notifier
        .booking_status_changed(booking.id, current, target);

    Ok(ApiResponse::success(
        "Booking updated",
        booking_from_entity(booking)?,
    ))
}

/// Payment gateway callback. `confirmed` captures the payment and advances a
/// pending booking; `failed` releases the hold and cancels. Both idempotent
/// with respect to replayed webhooks.
pub async fn handle_payment_webhook(
    state: &AppState,
    payload: PaymentWebhookRequest,
) -> AppResult<ApiResponse<Booking>> {
    let txn = state.orm.begin().await?;

    let booking =
        lock_booking(&txn, BookingCol::BookingCode.eq(payload.booking_code.clone())).await?;
    let current = parse_status(&booking)?;
    let payment_status = parse_payment_status(&booking)?;

    let booking = match payload.event {
        PaymentEvent::Confirmed => {
            if payment_status == PaymentStatus::Paid {
                txn.commit().await?;
                return Ok(ApiResponse::success(
                    "Payment already recorded",
                    booking_from_entity(booking)?,
                ));
            }
            if current.is_terminal() {
                return Err(AppError::BadRequest(format!(
                    "cannot capture payment for a {current} booking"
                )));
            }
            if payload.amount < booking.total_amount {
                return Err(AppError::BadRequest(format!(
                    "payment amount {} is less than booking total {}",
                    payload.amount, booking.total_amount
                )));
            }

            let confirm = current == BookingStatus::Pending;
            if confirm {
                current.ensure_transition(BookingStatus::Confirmed)?;
                let room_type =
                    pricing_service::get_room_type(&txn, booking.room_type_id).await?;
                inventory::commit(&txn, &room_type, booking.hold_id).await?;
            }

            let mut active: bookings::ActiveModel = booking.into();
            active.payment_status = Set(PaymentStatus::Paid.as_str().to_string());
            active.paid_at = Set(Some(Utc::now().into()));
            if confirm {
                active.status = Set(BookingStatus::Confirmed.as_str().to_string());
            }
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?
        }
        PaymentEvent::Failed => {
            if current == BookingStatus::Pending {
                inventory::release(&txn, booking.hold_id).await?;
                let mut active: bookings::ActiveModel = booking.into();
                active.status = Set(BookingStatus::Cancelled.as_str().to_string());
                active.cancelled_at = Set(Some(Utc::now().into()));
                active.updated_at = Set(Utc::now().into());
                active.update(&txn).await?
            } else {
                booking
            }
        }
    };

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "payment_webhook",
        Some("bookings"),
        Some(serde_json::json!({
            "booking_id": booking.id,
            "event": payload.event,
            "amount": payload.amount,
            "reference": payload.payment_reference,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Payment processed",
        booking_from_entity(booking)?,
    ))
}

pub async fn get_booking(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Booking>> {
    let booking = Bookings::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "OK",
        booking_from_entity(booking)?,
    ))
}

pub async fn list_bookings(
    state: &AppState,
    query: BookingListQuery,
) -> AppResult<ApiResponse<BookingList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(customer_id) = query.customer_id {
        condition = condition.add(BookingCol::CustomerId.eq(customer_id));
    }
    if let Some(status) = query.status {
        condition = condition.add(BookingCol::Status.eq(status.as_str()));
    }

    let mut finder = Bookings::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(BookingCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(BookingCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(booking_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::paged(
        "Bookings",
        BookingList { items },
        page,
        limit,
        total,
    ))
}

async fn lock_booking(
    txn: &DatabaseTransaction,
    filter: impl sea_orm::sea_query::IntoCondition,
) -> AppResult<BookingModel> {
    Bookings::find()
        .filter(filter)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(AppError::NotFound)
}

pub fn parse_status(booking: &BookingModel) -> AppResult<BookingStatus> {
    BookingStatus::parse(&booking.status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "booking {} has unknown status '{}'",
            booking.id,
            booking.status
        ))
    })
}

pub fn parse_payment_status(booking: &BookingModel) -> AppResult<PaymentStatus> {
    PaymentStatus::parse(&booking.payment_status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "booking {} has unknown payment status '{}'",
            booking.id,
            booking.payment_status
        ))
    })
}

pub fn booking_from_entity(model: BookingModel) -> AppResult<Booking> {
    let status = parse_status(&model)?;
    let payment_status = parse_payment_status(&model)?;
    Ok(Booking {
        id: model.id,
        booking_code: model.booking_code,
        customer_id: model.customer_id,
        property_id: model.property_id,
        room_type_id: model.room_type_id,
        check_in: model.check_in,
        check_out: model.check_out,
        nights: model.nights,
        adults: model.adults,
        children: model.children,
        rooms_count: model.rooms_count,
        guest_name: model.guest_name,
        guest_email: model.guest_email,
        guest_phone: model.guest_phone,
        room_price: model.room_price,
        discount_amount: model.discount_amount,
        coupon_discount_amount: model.coupon_discount_amount,
        tax_amount: model.tax_amount,
        service_fee: model.service_fee,
        total_amount: model.total_amount,
        status,
        payment_status,
        paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
        cancelled_at: model.cancelled_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn build_booking_code(booking_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = booking_id.to_string();
    let short = &suffix[..8];
    format!("BK-{}-{}", date, short)
}
