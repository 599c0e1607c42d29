pub mod bookings;
pub mod payments;
pub mod refunds;
pub mod settlement;
