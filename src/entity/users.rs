use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone_number: String,
    pub country: String,
    pub address: String,
    pub is_verified: bool,
    pub is_customer: bool,
    pub role: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::otps::Entity")]
    Otps,
}

impl Related<super::otps::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Otps.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
