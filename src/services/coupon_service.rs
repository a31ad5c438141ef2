use chrono::{DateTime, Utc};
use rand::Rng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::coupons::{CouponList, CreateCouponRequest},
    entity::coupons::{
        ActiveModel as CouponActive, Column as CouponCol, Entity as Coupons, Model as CouponModel,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Coupon,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

const CODE_LEN: usize = 8;

pub async fn list_coupons(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CouponList>> {
    ensure_admin(user)?;
    retire_past_expiry(state).await?;

    let (page, limit, offset) = pagination.normalize();
    let finder = Coupons::find().order_by_desc(CouponCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(coupon_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Coupons", CouponList { items }, Some(meta)))
}

pub async fn create_coupon(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;

    // The strictly-in-the-future check runs before anything is written, so a
    // coupon expiring exactly now is rejected, never persisted-then-flagged.
    if !expires_in_future(payload.expiry_date, Utc::now()) {
        return Err(AppError::BadRequest(
            "expiry_date must be in the future".into(),
        ));
    }

    if payload.price.is_sign_negative() {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }

    let code = match payload.code {
        Some(code) if !code.trim().is_empty() => code.trim().to_uppercase(),
        _ => generate_code(),
    };

    let exist = Coupons::find()
        .filter(CouponCol::Code.eq(code.clone()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("Code is already taken".into()));
    }

    let active = CouponActive {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        price: Set(payload.price),
        expired: Set(false),
        expiry_date: Set(payload.expiry_date.into()),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let coupon = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "coupon_create",
        Some("coupons"),
        Some(serde_json::json!({ "coupon_id": coupon.id, "code": coupon.code })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Coupon created",
        coupon_from_entity(coupon),
        Some(Meta::empty()),
    ))
}

/// Customer-facing lookup used at checkout time. Rejects codes that are
/// flagged expired or past their expiry, flipping the flag on the way out.
pub async fn get_valid_coupon(state: &AppState, code: &str) -> AppResult<ApiResponse<Coupon>> {
    let coupon = Coupons::find()
        .filter(CouponCol::Code.eq(code.to_uppercase()))
        .one(&state.orm)
        .await?;
    let coupon = match coupon {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    if coupon.expired || coupon.expiry_date.with_timezone(&Utc) <= Utc::now() {
        if !coupon.expired {
            let mut active: CouponActive = coupon.into();
            active.expired = Set(true);
            active.updated_at = Set(Utc::now().into());
            active.update(&state.orm).await?;
        }
        return Err(AppError::BadRequest("Coupon has expired".into()));
    }

    Ok(ApiResponse::success(
        "Coupon",
        coupon_from_entity(coupon),
        None,
    ))
}

pub async fn delete_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Coupons::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Flip the expired flag on every persisted coupon whose expiry has passed.
async fn retire_past_expiry(state: &AppState) -> AppResult<()> {
    Coupons::update_many()
        .col_expr(CouponCol::Expired, sea_orm::sea_query::Expr::value(true))
        .filter(CouponCol::Expired.eq(false))
        .filter(CouponCol::ExpiryDate.lte(Utc::now()))
        .exec(&state.orm)
        .await?;
    Ok(())
}

/// 8 uppercase hex characters.
pub fn generate_code() -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| HEX[rng.random_range(0..HEX.len())] as char)
        .collect()
}

/// A coupon is only storable while its expiry is strictly ahead of now.
pub fn expires_in_future(expiry: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expiry > now
}

fn coupon_from_entity(model: CouponModel) -> Coupon {
    Coupon {
        id: model.id,
        code: model.code,
        price: model.price,
        expired: model.expired,
        expiry_date: model.expiry_date.with_timezone(&Utc),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
