use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "colours")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub name: String,
    pub hex_code: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::colour_inventory::Entity")]
    ColourInventory,
}

impl Related<super::colour_inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ColourInventory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
