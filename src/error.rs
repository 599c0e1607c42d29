use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::response::ApiResponse;
use crate::status::BookingStatus;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Insufficient inventory for room type {room_type_id} on {date}")]
    InsufficientInventory { room_type_id: Uuid, date: NaiveDate },

    #[error("Coupon not applicable: {0}")]
    CouponIneligible(CouponIneligibleReason),

    #[error("Invalid booking transition {from} -> {to}")]
    InvalidStateTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Refund exceeds the amount paid")]
    RefundExceedsPaid,

    #[error("Concurrent update conflict, please retry")]
    ConcurrencyConflict,

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponIneligibleReason {
    NotFound,
    Inactive,
    NotStarted,
    Expired,
    MinNightsNotMet,
    MinOrderAmountNotMet,
    ScopeMismatch,
    UsageLimitReached,
    AlreadyUsedByCustomer,
}

impl std::fmt::Display for CouponIneligibleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CouponIneligibleReason::NotFound => "coupon not found",
            CouponIneligibleReason::Inactive => "coupon is not active",
            CouponIneligibleReason::NotStarted => "coupon is not yet valid",
            CouponIneligibleReason::Expired => "coupon has expired",
            CouponIneligibleReason::MinNightsNotMet => "minimum nights not met",
            CouponIneligibleReason::MinOrderAmountNotMet => "minimum order amount not met",
            CouponIneligibleReason::ScopeMismatch => "coupon does not apply to this property",
            CouponIneligibleReason::UsageLimitReached => "coupon usage limit reached",
            CouponIneligibleReason::AlreadyUsedByCustomer => "coupon already used by this customer",
        };
        f.write_str(s)
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::InvalidDateRange(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::InsufficientInventory { .. } => (StatusCode::CONFLICT, self.to_string()),
            AppError::CouponIneligible(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::InvalidStateTransition { .. } => (StatusCode::CONFLICT, self.to_string()),
            AppError::RefundExceedsPaid => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::ConcurrencyConflict => (StatusCode::CONFLICT, self.to_string()),
            AppError::DbError(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::OrmError(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = ApiResponse {
            message,
            data: Some(ErrorData {
                error: self.to_string(),
            }),
            meta: None,
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
