use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "review_images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub review_id: Uuid,
    pub image_url: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product_reviews::Entity",
        from = "Column::ReviewId",
        to = "super::product_reviews::Column::Id"
    )]
    ProductReviews,
}

impl Related<super::product_reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductReviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
