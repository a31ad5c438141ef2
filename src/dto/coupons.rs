use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Coupon;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCouponRequest {
    /// Left empty, an 8-character code is generated.
    pub code: Option<String>,
    pub price: Decimal,
    pub expiry_date: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CouponList {
    #[schema(value_type = Vec<Coupon>)]
    pub items: Vec<Coupon>,
}
