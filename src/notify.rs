//! Fire-and-forget notification collaborator. Actual delivery (email, push)
//! lives outside this service; the default implementation just traces.

use uuid::Uuid;

use crate::status::BookingStatus;

pub trait Notifier: Send + Sync {
    fn booking_created(&self, booking_id: Uuid, booking_code: &str);
    fn booking_status_changed(&self, booking_id: Uuid, from: BookingStatus, to: BookingStatus);
    fn refund_approved(&self, booking_id: Uuid, refunded_amount: i64);
}

#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn booking_created(&self, booking_id: Uuid, booking_code: &str) {
        tracing::info!(%booking_id, booking_code, "notify: booking created");
    }

    fn booking_status_changed(&self, booking_id: Uuid, from: BookingStatus, to: BookingStatus) {
        tracing::info!(%booking_id, %from, %to, "notify: booking status changed");
    }

    fn refund_approved(&self, booking_id: Uuid, refunded_amount: i64) {
        tracing::info!(%booking_id, refunded_amount, "notify: refund approved");
    }
}
