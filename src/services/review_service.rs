use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::reviews::{CreateReviewRequest, ReviewList},
    entity::{
        product_reviews::{
            ActiveModel as ReviewActive, Column as ReviewCol, Entity as ProductReviews,
            Model as ReviewModel,
        },
        products::Entity as Products,
        review_images::ActiveModel as ReviewImageActive,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_customer},
    models::ProductReview,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::account_service,
    state::AppState,
};

pub async fn list_reviews(
    state: &AppState,
    product_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ReviewList>> {
    let product = Products::find_by_id(product_id).one(&state.orm).await?;
    if product.is_none() {
        return Err(AppError::NotFound);
    }

    let (page, limit, offset) = pagination.normalize();
    let finder = ProductReviews::find()
        .filter(ReviewCol::ProductId.eq(product_id))
        .order_by_desc(ReviewCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(review_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<ProductReview>> {
    ensure_customer(user)?;
    let customer = account_service::customer_for_user(&state.orm, user.user_id).await?;

    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest(
            "rating must be between 1 and 5".into(),
        ));
    }

    let product = Products::find_by_id(product_id).one(&state.orm).await?;
    if product.is_none() {
        return Err(AppError::BadRequest("product not found".into()));
    }

    let txn = state.orm.begin().await?;

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer.id),
        product_id: Set(product_id),
        rating: Set(payload.rating),
        description: Set(payload.description),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    for url in &payload.image_urls {
        ReviewImageActive {
            id: Set(Uuid::new_v4()),
            review_id: Set(review.id),
            image_url: Set(url.clone()),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "review_create",
        Some("product_reviews"),
        Some(serde_json::json!({ "review_id": review.id, "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Review added",
        review_from_entity(review),
        Some(Meta::empty()),
    ))
}

fn review_from_entity(model: ReviewModel) -> ProductReview {
    ProductReview {
        id: model.id,
        customer_id: model.customer_id,
        product_id: model.product_id,
        rating: model.rating,
        description: model.description,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
