use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        bookings::{BookingCreated, BookingList, CreateBookingRequest, TransitionRequest},
        payments::{PaymentEvent, PaymentWebhookRequest},
        refunds::{ApproveRefundRequest, CreateRefundTicketRequest, TicketActionRequest},
        settlement::{CreatePayoutRequest, EarningList, PayoutWithEarnings},
    },
    models::{
        AvailabilityResult, AvailableDatesResult, Booking, CalendarDay, DailyRate, HostEarning,
        HostPayout, PriceKind, PriceQuote, Refund, RefundTicket,
    },
    response::{ApiResponse, Meta},
    routes::{availability, bookings, health, params, payments, pricing, refunds, settlement},
    status::{BookingStatus, PaymentStatus, RefundTicketStatus},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        availability::check_availability,
        availability::calendar,
        pricing::quote,
        bookings::list_bookings,
        bookings::create_booking,
        bookings::get_booking,
        bookings::transition_booking,
        payments::webhook,
        refunds::create_ticket,
        refunds::approve,
        refunds::reject,
        refunds::cancel,
        settlement::list_earnings,
        settlement::create_payout
    ),
    components(
        schemas(
            AvailabilityResult,
            AvailableDatesResult,
            CalendarDay,
            PriceQuote,
            DailyRate,
            PriceKind,
            Booking,
            BookingStatus,
            PaymentStatus,
            RefundTicketStatus,
            BookingCreated,
            BookingList,
            CreateBookingRequest,
            TransitionRequest,
            PaymentEvent,
            PaymentWebhookRequest,
            CreateRefundTicketRequest,
            ApproveRefundRequest,
            TicketActionRequest,
            RefundTicket,
            Refund,
            CreatePayoutRequest,
            PayoutWithEarnings,
            EarningList,
            HostEarning,
            HostPayout,
            params::Pagination,
            params::BookingListQuery,
            params::EarningListQuery,
            Meta,
            ApiResponse<PriceQuote>,
            ApiResponse<AvailabilityResult>,
            ApiResponse<BookingCreated>,
            ApiResponse<BookingList>,
            ApiResponse<PayoutWithEarnings>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Availability", description = "Room availability and calendars"),
        (name = "Pricing", description = "Price quotes"),
        (name = "Bookings", description = "Booking lifecycle"),
        (name = "Payments", description = "Payment gateway callbacks"),
        (name = "Refunds", description = "Refund tickets and disbursements"),
        (name = "Settlement", description = "Host earnings and payouts"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
