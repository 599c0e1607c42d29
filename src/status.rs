use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Booking lifecycle. Stored as text in the database; every transition goes
/// through [`BookingStatus::ensure_transition`] so illegal edges cannot be
/// written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    NoShow,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::NoShow => "no_show",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "checked_in" => Some(BookingStatus::CheckedIn),
            "no_show" => Some(BookingStatus::NoShow),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::NoShow
        )
    }

    /// The full transition table.
    pub fn can_transition_to(&self, target: BookingStatus) -> bool {
        use BookingStatus::*;
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, target),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, CheckedIn)
                | (Confirmed, Cancelled)
                | (Confirmed, NoShow)
                | (CheckedIn, Completed)
                | (CheckedIn, Cancelled)
        )
    }

    pub fn ensure_transition(&self, target: BookingStatus) -> Result<(), AppError> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(AppError::InvalidStateTransition {
                from: *self,
                to: target,
            })
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unpaid" => Some(PaymentStatus::Unpaid),
            "partial" => Some(PaymentStatus::Partial),
            "paid" => Some(PaymentStatus::Paid),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }

    /// Whether any money has actually been captured.
    pub fn has_paid_funds(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Partial | PaymentStatus::Paid | PaymentStatus::Refunded
        )
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inventory hold lifecycle: active until committed (booking confirmed) or
/// released (cancellation / payment failure). Expiry is a timestamp check,
/// not a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HoldStatus {
    Active,
    Committed,
    Released,
}

impl HoldStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoldStatus::Active => "active",
            HoldStatus::Committed => "committed",
            HoldStatus::Released => "released",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(HoldStatus::Active),
            "committed" => Some(HoldStatus::Committed),
            "released" => Some(HoldStatus::Released),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RefundTicketStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl RefundTicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundTicketStatus::Pending => "pending",
            RefundTicketStatus::Approved => "approved",
            RefundTicketStatus::Rejected => "rejected",
            RefundTicketStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RefundTicketStatus::Pending),
            "approved" => Some(RefundTicketStatus::Approved),
            "rejected" => Some(RefundTicketStatus::Rejected),
            "cancelled" => Some(RefundTicketStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EarningStatus {
    Pending,
    Paid,
}

impl EarningStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EarningStatus::Pending => "pending",
            EarningStatus::Paid => "paid",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::*;

    const ALL: [BookingStatus; 6] = [Pending, Confirmed, CheckedIn, NoShow, Completed, Cancelled];

    #[test]
    fn happy_path_transitions_allowed() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(CheckedIn));
        assert!(CheckedIn.can_transition_to(Completed));
    }

    #[test]
    fn cancellation_allowed_before_completion() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(CheckedIn.can_transition_to(Cancelled));
    }

    #[test]
    fn no_show_only_from_confirmed() {
        for from in ALL {
            assert_eq!(from.can_transition_to(NoShow), from == Confirmed);
        }
    }

    #[test]
    fn terminal_states_reject_everything() {
        for from in [Completed, Cancelled, NoShow] {
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to} should fail");
            }
        }
    }

    #[test]
    fn no_skipping_states() {
        assert!(!Pending.can_transition_to(CheckedIn));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Confirmed.can_transition_to(Completed));
    }

    #[test]
    fn ensure_transition_reports_the_edge() {
        let err = Completed.ensure_transition(Pending).unwrap_err();
        match err {
            crate::error::AppError::InvalidStateTransition { from, to } => {
                assert_eq!(from, Completed);
                assert_eq!(to, Pending);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn status_strings_round_trip() {
        for status in ALL {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
    }
}
