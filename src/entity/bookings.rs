use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub booking_code: String,
    pub customer_id: Uuid,
    pub property_id: Uuid,
    pub room_type_id: Uuid,
    pub hold_id: Uuid,
    pub check_in: Date,
    pub check_out: Date,
    pub nights: i32,
    pub adults: i32,
    pub children: i32,
    pub rooms_count: i32,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub room_price: i64,
    pub discount_amount: i64,
    pub coupon_discount_amount: i64,
    pub tax_amount: i64,
    pub service_fee: i64,
    pub total_amount: i64,
    pub status: String,
    pub payment_status: String,
    pub paid_at: Option<DateTimeWithTimeZone>,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::room_types::Entity",
        from = "Column::RoomTypeId",
        to = "super::room_types::Column::Id"
    )]
    RoomTypes,
    #[sea_orm(
        belongs_to = "super::properties::Entity",
        from = "Column::PropertyId",
        to = "super::properties::Column::Id"
    )]
    Properties,
    #[sea_orm(
        belongs_to = "super::inventory_holds::Entity",
        from = "Column::HoldId",
        to = "super::inventory_holds::Column::Id"
    )]
    InventoryHolds,
    #[sea_orm(has_many = "super::refund_tickets::Entity")]
    RefundTickets,
}

impl Related<super::room_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoomTypes.def()
    }
}

impl Related<super::properties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Properties.def()
    }
}

impl Related<super::refund_tickets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RefundTickets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
