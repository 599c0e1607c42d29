use axum_booking_api::{
    config::PlatformSettings,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::bookings::{CreateBookingRequest, TransitionRequest},
    dto::payments::{PaymentEvent, PaymentWebhookRequest},
    dto::refunds::{ApproveRefundRequest, CreateRefundTicketRequest},
    dto::settlement::CreatePayoutRequest,
    entity::{coupons::ActiveModel as CouponActive, properties::ActiveModel as PropertyActive,
        room_types::ActiveModel as RoomTypeActive},
    error::{AppError, CouponIneligibleReason},
    routes::params::{AvailabilityQuery, Pagination},
    services::{availability_service, booking_service, refund_service, settlement_service},
    state::AppState,
    status::{BookingStatus, PaymentStatus},
};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

// Integration flows against a real Postgres. Tests skip when no database is
// configured, mirroring how CI runs them with TEST_DATABASE_URL set.
async fn test_state() -> anyhow::Result<Option<AppState>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(None);
            }
        };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&pool).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE coupon_usages, refunds, refund_tickets, host_earnings, host_payouts, \
         bookings, inventory_holds, room_inventory, coupon_applications, coupons, holidays, \
         room_types, properties, audit_logs RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(Some(AppState::new(pool, orm, PlatformSettings::default())))
}

async fn seed_room_type(
    state: &AppState,
    total_rooms: i32,
    base_price: i64,
    weekend_price: Option<i64>,
    weekly_discount_percent: i64,
) -> anyhow::Result<(Uuid, Uuid, Uuid)> {
    let host_id = Uuid::new_v4();
    let property = PropertyActive {
        id: Set(Uuid::new_v4()),
        host_id: Set(host_id),
        name: Set(format!("Test Property {}", Uuid::new_v4())),
        property_type: Set("hotel".into()),
        city: Set("Da Nang".into()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    let room_type = RoomTypeActive {
        id: Set(Uuid::new_v4()),
        property_id: Set(property.id),
        name: Set("Standard".into()),
        total_rooms: Set(total_rooms),
        base_price: Set(base_price),
        weekend_price: Set(weekend_price),
        holiday_price: Set(None),
        weekly_discount_percent: Set(weekly_discount_percent),
        monthly_discount_percent: Set(0),
        max_adults: Set(2),
        max_children: Set(2),
        max_guests: Set(4),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok((host_id, property.id, room_type.id))
}

fn booking_request(
    customer_id: Uuid,
    room_type_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    rooms_count: i32,
    coupon_code: Option<String>,
) -> CreateBookingRequest {
    CreateBookingRequest {
        customer_id,
        room_type_id,
        check_in,
        check_out,
        rooms_count,
        adults: 2,
        children: 0,
        guest_name: "Nguyen Van A".into(),
        guest_email: "guest@example.com".into(),
        guest_phone: Some("+84 90 000 0000".into()),
        coupon_code,
    }
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[tokio::test]
async fn booking_settlement_flow() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let (host_id, _property_id, room_type_id) =
        seed_room_type(&state, 5, 1_000_000, Some(1_200_000), 10).await?;
    let customer_id = Uuid::new_v4();

    // Friday to Friday: 7 nights, 2 weekend nights at the default sat/sun
    // weekend, weekly discount kicks in.
    let check_in = d(2026, 6, 5);
    let check_out = d(2026, 6, 12);

    let created = booking_service::create_booking(
        &state,
        booking_request(customer_id, room_type_id, check_in, check_out, 1, None),
    )
    .await?;
    let created = created.data.unwrap();
    assert_eq!(created.booking.status, BookingStatus::Pending);
    assert_eq!(created.quote.subtotal, 7_400_000);
    assert_eq!(created.quote.discount_amount, 740_000);
    assert_eq!(created.booking.total_amount, 7_326_000);

    // The pending hold already counts against availability.
    let avail = availability_service::check_availability(
        &state,
        AvailabilityQuery {
            room_type_id,
            check_in,
            check_out,
            rooms_count: Some(1),
            adults: Some(2),
            children: Some(0),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(avail.available_rooms, 4);

    // Payment webhook confirms the booking and commits the hold.
    let paid = booking_service::handle_payment_webhook(
        &state,
        PaymentWebhookRequest {
            booking_code: created.booking.booking_code.clone(),
            event: PaymentEvent::Confirmed,
            amount: created.booking.total_amount,
            payment_reference: Some("PAY-1".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(paid.status, BookingStatus::Confirmed);
    assert_eq!(paid.payment_status, PaymentStatus::Paid);

    // Replaying the webhook is a no-op.
    let replay = booking_service::handle_payment_webhook(
        &state,
        PaymentWebhookRequest {
            booking_code: created.booking.booking_code.clone(),
            event: PaymentEvent::Confirmed,
            amount: created.booking.total_amount,
            payment_reference: Some("PAY-1".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(replay.status, BookingStatus::Confirmed);

    let actor = Uuid::new_v4();
    let checked_in = booking_service::transition(
        &state,
        created.booking.id,
        TransitionRequest {
            target_status: BookingStatus::CheckedIn,
            actor_id: actor,
            note: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(checked_in.status, BookingStatus::CheckedIn);

    let completed = booking_service::transition(
        &state,
        created.booking.id,
        TransitionRequest {
            target_status: BookingStatus::Completed,
            actor_id: actor,
            note: Some("checkout done".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(completed.status, BookingStatus::Completed);

    // Completing a paid booking created one pending earning:
    // (7,400,000 - 740,000) gross, 15% platform fee, minus tax.
    let payout = settlement_service::create_payout(
        &state,
        CreatePayoutRequest {
            host_id,
            period_start: check_out,
            period_end: check_out,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(payout.earnings.len(), 1);
    let earning = &payout.earnings[0];
    assert_eq!(earning.earning_amount, 6_660_000);
    assert_eq!(earning.platform_fee, 999_000);
    assert_eq!(earning.net_amount, 6_660_000 - 999_000 - 666_000);
    assert_eq!(payout.payout.net_payout_amount, earning.net_amount);
    assert_eq!(earning.payout_id, Some(payout.payout.id));

    // A second payout over the same period finds nothing pending.
    let err = settlement_service::create_payout(
        &state,
        CreatePayoutRequest {
            host_id,
            period_start: check_out,
            period_end: check_out,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn concurrent_bookings_for_last_room() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let (_, _, room_type_id) = seed_room_type(&state, 1, 800_000, None, 0).await?;
    let check_in = d(2026, 7, 1);
    let check_out = d(2026, 7, 4);

    let a = booking_service::create_booking(
        &state,
        booking_request(Uuid::new_v4(), room_type_id, check_in, check_out, 1, None),
    );
    let b = booking_service::create_booking(
        &state,
        booking_request(Uuid::new_v4(), room_type_id, check_in, check_out, 1, None),
    );
    let (res_a, res_b) = tokio::join!(a, b);

    let succeeded = [&res_a, &res_b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1, "exactly one booking should win the last room");

    let loser = if res_a.is_err() { res_a } else { res_b };
    assert!(matches!(
        loser.unwrap_err(),
        AppError::InsufficientInventory { .. }
    ));

    Ok(())
}

#[tokio::test]
async fn cancellation_releases_inventory() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let (_, _, room_type_id) = seed_room_type(&state, 1, 800_000, None, 0).await?;
    let check_in = d(2026, 8, 1);
    let check_out = d(2026, 8, 3);
    let customer = Uuid::new_v4();

    let created = booking_service::create_booking(
        &state,
        booking_request(customer, room_type_id, check_in, check_out, 1, None),
    )
    .await?
    .data
    .unwrap();

    // Room type is fully held now.
    let err = booking_service::create_booking(
        &state,
        booking_request(Uuid::new_v4(), room_type_id, check_in, check_out, 1, None),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InsufficientInventory { .. }));

    booking_service::transition(
        &state,
        created.booking.id,
        TransitionRequest {
            target_status: BookingStatus::Cancelled,
            actor_id: customer,
            note: Some("changed plans".into()),
        },
    )
    .await?;

    // Released hold frees the room again.
    let retry = booking_service::create_booking(
        &state,
        booking_request(Uuid::new_v4(), room_type_id, check_in, check_out, 1, None),
    )
    .await?;
    assert!(retry.data.is_some());

    Ok(())
}

#[tokio::test]
async fn late_capture_rejected_after_cancellation() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let (_, _, room_type_id) = seed_room_type(&state, 2, 800_000, None, 0).await?;
    let created = booking_service::create_booking(
        &state,
        booking_request(Uuid::new_v4(), room_type_id, d(2026, 9, 10), d(2026, 9, 12), 1, None),
    )
    .await?
    .data
    .unwrap();

    // Gateway reports the charge failed; the pending booking is cancelled.
    booking_service::handle_payment_webhook(
        &state,
        PaymentWebhookRequest {
            booking_code: created.booking.booking_code.clone(),
            event: PaymentEvent::Failed,
            amount: 0,
            payment_reference: None,
        },
    )
    .await?;

    // A late confirmation for the same booking must not mark it paid.
    let err = booking_service::handle_payment_webhook(
        &state,
        PaymentWebhookRequest {
            booking_code: created.booking.booking_code.clone(),
            event: PaymentEvent::Confirmed,
            amount: created.booking.total_amount,
            payment_reference: Some("PAY-LATE".into()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let booking = booking_service::get_booking(&state, created.booking.id)
        .await?
        .data
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Cancelled);
    assert_eq!(booking.payment_status, PaymentStatus::Unpaid);

    Ok(())
}

#[tokio::test]
async fn rejects_illegal_transitions() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let (_, _, room_type_id) = seed_room_type(&state, 2, 800_000, None, 0).await?;
    let created = booking_service::create_booking(
        &state,
        booking_request(Uuid::new_v4(), room_type_id, d(2026, 9, 1), d(2026, 9, 3), 1, None),
    )
    .await?
    .data
    .unwrap();

    let err = booking_service::transition(
        &state,
        created.booking.id,
        TransitionRequest {
            target_status: BookingStatus::Completed,
            actor_id: Uuid::new_v4(),
            note: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        AppError::InvalidStateTransition {
            from: BookingStatus::Pending,
            to: BookingStatus::Completed,
        }
    ));

    Ok(())
}

#[tokio::test]
async fn coupon_single_use_per_customer() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let (_, _, room_type_id) = seed_room_type(&state, 5, 1_000_000, None, 0).await?;
    let now = Utc::now();
    CouponActive {
        id: Set(Uuid::new_v4()),
        code: Set("ONCE".into()),
        is_active: Set(true),
        discount_type: Set("fixed_amount".into()),
        discount_value: Set(200_000),
        max_discount_amount: Set(None),
        min_order_amount: Set(0),
        min_nights: Set(1),
        start_date: Set((now - Duration::days(1)).into()),
        end_date: Set((now + Duration::days(30)).into()),
        max_total_uses: Set(Some(100)),
        max_uses_per_customer: Set(1),
        used_count: Set(0),
        applicable_to: Set("all".into()),
        created_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    let customer = Uuid::new_v4();
    let first = booking_service::create_booking(
        &state,
        booking_request(
            customer,
            room_type_id,
            d(2026, 10, 1),
            d(2026, 10, 3),
            1,
            Some("ONCE".into()),
        ),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(first.booking.coupon_discount_amount, 200_000);
    assert_eq!(
        first.booking.total_amount,
        first.quote.subtotal - 200_000
            + first.quote.tax_amount
            + first.quote.service_fee
    );

    // Same customer, different dates: second application must be rejected.
    let err = booking_service::create_booking(
        &state,
        booking_request(
            customer,
            room_type_id,
            d(2026, 10, 10),
            d(2026, 10, 12),
            1,
            Some("ONCE".into()),
        ),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        AppError::CouponIneligible(CouponIneligibleReason::AlreadyUsedByCustomer)
    ));

    // A different customer can still use it.
    let other = booking_service::create_booking(
        &state,
        booking_request(
            Uuid::new_v4(),
            room_type_id,
            d(2026, 10, 10),
            d(2026, 10, 12),
            1,
            Some("ONCE".into()),
        ),
    )
    .await?;
    assert!(other.data.is_some());

    Ok(())
}

#[tokio::test]
async fn refunds_never_exceed_paid_amount() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let (_, _, room_type_id) = seed_room_type(&state, 2, 1_000_000, None, 0).await?;
    let customer = Uuid::new_v4();
    let created = booking_service::create_booking(
        &state,
        booking_request(customer, room_type_id, d(2026, 11, 1), d(2026, 11, 3), 1, None),
    )
    .await?
    .data
    .unwrap();

    // Refund before any payment is rejected outright.
    let err = refund_service::create_ticket(
        &state,
        CreateRefundTicketRequest {
            booking_id: created.booking.id,
            requested_amount: 100_000,
            reason: "early cancel".into(),
            bank_name: "VCB".into(),
            bank_account_number: "001122".into(),
            bank_account_holder: "NGUYEN VAN A".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    booking_service::handle_payment_webhook(
        &state,
        PaymentWebhookRequest {
            booking_code: created.booking.booking_code.clone(),
            event: PaymentEvent::Confirmed,
            amount: created.booking.total_amount,
            payment_reference: Some("PAY-2".into()),
        },
    )
    .await?;

    booking_service::transition(
        &state,
        created.booking.id,
        TransitionRequest {
            target_status: BookingStatus::Cancelled,
            actor_id: customer,
            note: Some("paid then cancelled".into()),
        },
    )
    .await?;

    let total = created.booking.total_amount;

    // Asking for more than was paid fails.
    let err = refund_service::create_ticket(
        &state,
        CreateRefundTicketRequest {
            booking_id: created.booking.id,
            requested_amount: total + 1,
            reason: "too much".into(),
            bank_name: "VCB".into(),
            bank_account_number: "001122".into(),
            bank_account_holder: "NGUYEN VAN A".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::RefundExceedsPaid));

    let ticket = refund_service::create_ticket(
        &state,
        CreateRefundTicketRequest {
            booking_id: created.booking.id,
            requested_amount: total,
            reason: "full refund".into(),
            bank_name: "VCB".into(),
            bank_account_number: "001122".into(),
            bank_account_holder: "NGUYEN VAN A".into(),
        },
    )
    .await?
    .data
    .unwrap();

    let admin = Uuid::new_v4();
    let refund = refund_service::approve(
        &state,
        ticket.id,
        ApproveRefundRequest {
            approved_by: admin,
            refunded_amount: total,
            payment_reference: "RF-1".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(refund.refunded_amount, total);

    let booking = booking_service::get_booking(&state, created.booking.id)
        .await?
        .data
        .unwrap();
    assert_eq!(booking.payment_status, PaymentStatus::Refunded);

    // Fully refunded: no further ticket can be opened.
    let err = refund_service::create_ticket(
        &state,
        CreateRefundTicketRequest {
            booking_id: created.booking.id,
            requested_amount: 1,
            reason: "double dip".into(),
            bank_name: "VCB".into(),
            bank_account_number: "001122".into(),
            bank_account_holder: "NGUYEN VAN A".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::RefundExceedsPaid));

    Ok(())
}

#[tokio::test]
async fn listing_filters_by_customer() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let (_, _, room_type_id) = seed_room_type(&state, 5, 500_000, None, 0).await?;
    let customer = Uuid::new_v4();
    booking_service::create_booking(
        &state,
        booking_request(customer, room_type_id, d(2026, 12, 1), d(2026, 12, 3), 1, None),
    )
    .await?;
    booking_service::create_booking(
        &state,
        booking_request(Uuid::new_v4(), room_type_id, d(2026, 12, 1), d(2026, 12, 3), 1, None),
    )
    .await?;

    let list = booking_service::list_bookings(
        &state,
        axum_booking_api::routes::params::BookingListQuery {
            pagination: Pagination {
                page: Some(1),
                per_page: Some(20),
            },
            customer_id: Some(customer),
            status: None,
            sort_order: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(list.items.len(), 1);
    assert_eq!(list.items[0].customer_id, customer);

    Ok(())
}
