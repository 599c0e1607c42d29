use sea_orm::entity::prelude::*;

/// Sparse per-night ledger rows; a row exists only once a reservation has
/// touched that (room type, date).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "room_inventory")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub room_type_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub date: Date,
    pub rooms_booked: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::room_types::Entity",
        from = "Column::RoomTypeId",
        to = "super::room_types::Column::Id"
    )]
    RoomTypes,
}

impl Related<super::room_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoomTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
