use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sizes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::size_inventory::Entity")]
    SizeInventory,
}

impl Related<super::size_inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SizeInventory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
