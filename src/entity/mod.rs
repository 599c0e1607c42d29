pub mod audit_logs;
pub mod bookings;
pub mod coupon_applications;
pub mod coupon_usages;
pub mod coupons;
pub mod holidays;
pub mod host_earnings;
pub mod host_payouts;
pub mod inventory_holds;
pub mod properties;
pub mod refund_tickets;
pub mod refunds;
pub mod room_inventory;
pub mod room_types;

pub use audit_logs::Entity as AuditLogs;
pub use bookings::Entity as Bookings;
pub use coupon_applications::Entity as CouponApplications;
pub use coupon_usages::Entity as CouponUsages;
pub use coupons::Entity as Coupons;
pub use holidays::Entity as Holidays;
pub use host_earnings::Entity as HostEarnings;
pub use host_payouts::Entity as HostPayouts;
pub use inventory_holds::Entity as InventoryHolds;
pub use properties::Entity as Properties;
pub use refund_tickets::Entity as RefundTickets;
pub use refunds::Entity as Refunds;
pub use room_inventory::Entity as RoomInventory;
pub use room_types::Entity as RoomTypes;
