use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub is_active: bool,
    pub discount_type: String,
    pub discount_value: i64,
    pub max_discount_amount: Option<i64>,
    pub min_order_amount: i64,
    pub min_nights: i32,
    pub start_date: DateTimeWithTimeZone,
    pub end_date: DateTimeWithTimeZone,
    pub max_total_uses: Option<i64>,
    pub max_uses_per_customer: i64,
    pub used_count: i64,
    pub applicable_to: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::coupon_applications::Entity")]
    CouponApplications,
    #[sea_orm(has_many = "super::coupon_usages::Entity")]
    CouponUsages,
}

impl Related<super::coupon_applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CouponApplications.def()
    }
}

impl Related<super::coupon_usages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CouponUsages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
