//! Refund request/fulfillment pair: a RefundTicket records what the customer
//! asked for; approval creates exactly one Refund with what was actually
//! disbursed. The sum of refunds for a booking never exceeds what was paid.

use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::refunds::{ApproveRefundRequest, CreateRefundTicketRequest, TicketActionRequest},
    entity::{
        bookings::{Column as BookingCol, Entity as Bookings, Model as BookingModel},
        refund_tickets::{self, Entity as RefundTickets},
        refunds::{self, Column as RefundCol, Entity as Refunds},
    },
    error::{AppError, AppResult},
    models::{Refund, RefundTicket},
    response::ApiResponse,
    services::booking_service,
    state::AppState,
    status::{PaymentStatus, RefundTicketStatus},
};

pub async fn create_ticket(
    state: &AppState,
    payload: CreateRefundTicketRequest,
) -> AppResult<ApiResponse<RefundTicket>> {
    if payload.requested_amount <= 0 {
        return Err(AppError::BadRequest(
            "requested_amount must be positive".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let booking = Bookings::find()
        .filter(BookingCol::Id.eq(payload.booking_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let paid = amount_paid(&booking)?;
    let already_refunded = refunded_total(&txn, booking.id).await?;
    if payload.requested_amount + already_refunded > paid {
        return Err(AppError::RefundExceedsPaid);
    }

    let now = Utc::now();
    let ticket = refund_tickets::ActiveModel {
        id: Set(Uuid::new_v4()),
        booking_id: Set(booking.id),
        customer_id: Set(booking.customer_id),
        requested_amount: Set(payload.requested_amount),
        reason: Set(payload.reason),
        bank_name: Set(payload.bank_name),
        bank_account_number: Set(payload.bank_account_number),
        bank_account_holder: Set(payload.bank_account_holder),
        status: Set(RefundTicketStatus::Pending.as_str().to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(ticket.customer_id),
        "refund_ticket_created",
        Some("refund_tickets"),
        Some(serde_json::json!({
            "ticket_id": ticket.id,
            "booking_id": ticket.booking_id,
            "requested_amount": ticket.requested_amount,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Refund ticket created",
        ticket_from_entity(ticket)?,
    ))
}

/// Approve a pending ticket and disburse. The booking row lock serializes
/// concurrent approvals, so the refunded sum is checked against a stable
/// paid amount.
pub async fn approve(
    state: &AppState,
    ticket_id: Uuid,
    payload: ApproveRefundRequest,
) -> AppResult<ApiResponse<Refund>> {
    if payload.refunded_amount <= 0 {
        return Err(AppError::BadRequest(
            "refunded_amount must be positive".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let ticket = lock_pending_ticket(&txn, ticket_id).await?;
    if payload.refunded_amount > ticket.requested_amount {
        return Err(AppError::BadRequest(
            "refunded_amount exceeds the requested amount".into(),
        ));
    }

    let booking = Bookings::find()
        .filter(BookingCol::Id.eq(ticket.booking_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let paid = amount_paid(&booking)?;
    let already_refunded = refunded_total(&txn, booking.id).await?;
    if payload.refunded_amount + already_refunded > paid {
        return Err(AppError::RefundExceedsPaid);
    }

    let refund = refunds::ActiveModel {
        id: Set(Uuid::new_v4()),
        ticket_id: Set(ticket.id),
        booking_id: Set(booking.id),
        refunded_amount: Set(payload.refunded_amount),
        payment_reference: Set(payload.payment_reference),
        approved_by: Set(payload.approved_by),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    let mut ticket_active: refund_tickets::ActiveModel = ticket.into();
    ticket_active.status = Set(RefundTicketStatus::Approved.as_str().to_string());
    ticket_active.updated_at = Set(Utc::now().into());
    ticket_active.update(&txn).await?;

    if payload.refunded_amount + already_refunded == paid {
        let mut booking_active: crate::entity::bookings::ActiveModel = booking.into();
        booking_active.payment_status = Set(PaymentStatus::Refunded.as_str().to_string());
        booking_active.updated_at = Set(Utc::now().into());
        booking_active.update(&txn).await?;
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(payload.approved_by),
        "refund_approved",
        Some("refunds"),
        Some(serde_json::json!({
            "ticket_id": refund.ticket_id,
            "booking_id": refund.booking_id,
            "refunded_amount": refund.refunded_amount,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
    state
        .notifier
        .refund_approved(refund.booking_id, refund.refunded_amount);

    Ok(ApiResponse::success(
        "Refund approved",
        refund_from_entity(refund),
    ))
}

pub async fn reject(
    state: &AppState,
    ticket_id: Uuid,
    payload: TicketActionRequest,
) -> AppResult<ApiResponse<RefundTicket>> {
    close_ticket(state, ticket_id, payload, RefundTicketStatus::Rejected, "refund_rejected").await
}

pub async fn cancel(
    state: &AppState,
    ticket_id: Uuid,
    payload: TicketActionRequest,
) -> AppResult<ApiResponse<RefundTicket>> {
    close_ticket(state, ticket_id, payload, RefundTicketStatus::Cancelled, "refund_cancelled")
        .await
}

async fn close_ticket(
    state: &AppState,
    ticket_id: Uuid,
    payload: TicketActionRequest,
    target: RefundTicketStatus,
    action: &str,
) -> AppResult<ApiResponse<RefundTicket>> {
    let txn = state.orm.begin().await?;

    let ticket = lock_pending_ticket(&txn, ticket_id).await?;
    let mut active: refund_tickets::ActiveModel = ticket.into();
    active.status = Set(target.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let ticket = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(payload.actor_id),
        action,
        Some("refund_tickets"),
        Some(serde_json::json!({ "ticket_id": ticket.id, "note": payload.note })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Refund ticket updated",
        ticket_from_entity(ticket)?,
    ))
}

async fn lock_pending_ticket(
    txn: &DatabaseTransaction,
    ticket_id: Uuid,
) -> AppResult<refund_tickets::Model> {
    let ticket = RefundTickets::find_by_id(ticket_id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(AppError::NotFound)?;
    match RefundTicketStatus::parse(&ticket.status) {
        Some(RefundTicketStatus::Pending) => Ok(ticket),
        Some(_) => Err(AppError::BadRequest(
            "refund ticket is no longer pending".into(),
        )),
        None => Err(AppError::Internal(anyhow::anyhow!(
            "refund ticket {} has unknown status '{}'",
            ticket.id,
            ticket.status
        ))),
    }
}

/// The amount actually captured for a booking. Partial captures are not
/// tracked with their own amount, so they are not refundable here.
fn amount_paid(booking: &BookingModel) -> AppResult<i64> {
    match booking_service::parse_payment_status(booking)? {
        PaymentStatus::Paid | PaymentStatus::Refunded => Ok(booking.total_amount),
        PaymentStatus::Partial | PaymentStatus::Unpaid => Err(AppError::BadRequest(
            "booking has no refundable captured payment".into(),
        )),
    }
}

async fn refunded_total<C: sea_orm::ConnectionTrait>(
    conn: &C,
    booking_id: Uuid,
) -> AppResult<i64> {
    let refunds = Refunds::find()
        .filter(RefundCol::BookingId.eq(booking_id))
        .all(conn)
        .await?;
    Ok(refunds.iter().map(|r| r.refunded_amount).sum())
}

fn ticket_from_entity(model: refund_tickets::Model) -> AppResult<RefundTicket> {
    let status = RefundTicketStatus::parse(&model.status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "refund ticket {} has unknown status '{}'",
            model.id,
            model.status
        ))
    })?;
    Ok(RefundTicket {
        id: model.id,
        booking_id: model.booking_id,
        customer_id: model.customer_id,
        requested_amount: model.requested_amount,
        reason: model.reason,
        bank_name: model.bank_name,
        bank_account_number: model.bank_account_number,
        bank_account_holder: model.bank_account_holder,
        status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn refund_from_entity(model: refunds::Model) -> Refund {
    Refund {
        id: model.id,
        ticket_id: model.ticket_id,
        booking_id: model.booking_id,
        refunded_amount: model.refunded_amount,
        payment_reference: model.payment_reference,
        approved_by: model.approved_by,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
