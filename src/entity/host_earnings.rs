use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "host_earnings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub booking_id: Uuid,
    pub host_id: Uuid,
    pub earning_amount: i64,
    pub platform_fee: i64,
    pub tax_amount: i64,
    pub net_amount: i64,
    pub status: String,
    pub payout_id: Option<Uuid>,
    pub earned_at: Date,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bookings::Entity",
        from = "Column::BookingId",
        to = "super::bookings::Column::Id"
    )]
    Bookings,
    #[sea_orm(
        belongs_to = "super::host_payouts::Entity",
        from = "Column::PayoutId",
        to = "super::host_payouts::Column::Id"
    )]
    HostPayouts,
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::host_payouts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HostPayouts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
