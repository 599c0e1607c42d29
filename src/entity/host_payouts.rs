use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "host_payouts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub host_id: Uuid,
    pub period_start: Date,
    pub period_end: Date,
    pub total_earning_amount: i64,
    pub total_platform_fee: i64,
    pub net_payout_amount: i64,
    pub earnings_count: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::host_earnings::Entity")]
    HostEarnings,
}

impl Related<super::host_earnings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HostEarnings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
