pub mod availability_service;
pub mod booking_service;
pub mod coupon_service;
pub mod inventory;
pub mod pricing_service;
pub mod refund_service;
pub mod settlement_service;
