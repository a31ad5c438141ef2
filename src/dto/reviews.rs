use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::ProductReview;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub description: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ReviewList {
    #[schema(value_type = Vec<ProductReview>)]
    pub items: Vec<ProductReview>,
}
