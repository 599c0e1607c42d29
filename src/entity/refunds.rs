use sea_orm::entity::prelude::*;

/// The fulfillment record of an approved refund ticket; at most one per ticket.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "refunds")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub ticket_id: Uuid,
    pub booking_id: Uuid,
    pub refunded_amount: i64,
    pub payment_reference: String,
    pub approved_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::refund_tickets::Entity",
        from = "Column::TicketId",
        to = "super::refund_tickets::Column::Id"
    )]
    RefundTickets,
    #[sea_orm(
        belongs_to = "super::bookings::Entity",
        from = "Column::BookingId",
        to = "super::bookings::Column::Id"
    )]
    Bookings,
}

impl Related<super::refund_tickets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RefundTickets.def()
    }
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
