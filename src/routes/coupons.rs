use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::coupons::{CouponList, CreateCouponRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Coupon,
    response::ApiResponse,
    routes::params::Pagination,
    services::coupon_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_coupons).post(create_coupon))
        .route("/{code}", get(get_coupon).delete(delete_coupon))
}

#[utoipa::path(
    get,
    path = "/api/coupons",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "All coupon codes", body = ApiResponse<CouponList>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn list_coupons(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CouponList>>> {
    let resp = coupon_service::list_coupons(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/coupons",
    request_body = CreateCouponRequest,
    responses(
        (status = 200, description = "Coupon created", body = ApiResponse<Coupon>),
        (status = 400, description = "Expiry must be in the future"),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn create_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCouponRequest>,
) -> AppResult<Json<ApiResponse<Coupon>>> {
    let resp = coupon_service::create_coupon(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/coupons/{code}",
    params(
        ("code" = String, Path, description = "Coupon code")
    ),
    responses(
        (status = 200, description = "Valid coupon", body = ApiResponse<Coupon>),
        (status = 400, description = "Coupon has expired"),
        (status = 404, description = "Unknown code"),
    ),
    tag = "Coupons"
)]
pub async fn get_coupon(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<ApiResponse<Coupon>>> {
    let resp = coupon_service::get_valid_coupon(&state, &code).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/coupons/{code}",
    params(
        ("code" = Uuid, Path, description = "Coupon ID")
    ),
    responses(
        (status = 200, description = "Deleted coupon"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Coupon not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn delete_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = coupon_service::delete_coupon(&state, &user, id).await?;
    Ok(Json(resp))
}
