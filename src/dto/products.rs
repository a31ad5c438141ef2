use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SizeVariantRequest {
    pub size_id: Uuid,
    pub quantity: i32,
    pub extra_price: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ColourVariantRequest {
    pub colour_id: Uuid,
    pub quantity: i32,
    pub extra_price: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub title: String,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub price: Decimal,
    pub percentage_off: Option<i32>,
    pub shipping_fee: Option<Decimal>,
    pub shipping_out_days: Option<i32>,
    pub inventory: i32,
    pub flash_sale_start_date: Option<DateTime<Utc>>,
    pub flash_sale_end_date: Option<DateTime<Utc>>,
    pub featured: Option<bool>,
    #[serde(default)]
    pub sizes: Vec<SizeVariantRequest>,
    #[serde(default)]
    pub colours: Vec<ColourVariantRequest>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub percentage_off: Option<i32>,
    pub shipping_fee: Option<Decimal>,
    pub shipping_out_days: Option<i32>,
    pub inventory: Option<i32>,
    pub flash_sale_start_date: Option<DateTime<Utc>>,
    pub flash_sale_end_date: Option<DateTime<Utc>>,
    pub featured: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SizeStock {
    pub id: Uuid,
    pub size_id: Uuid,
    pub title: String,
    pub quantity: i32,
    pub extra_price: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ColourStock {
    pub id: Uuid,
    pub colour_id: Uuid,
    pub name: String,
    pub hex_code: String,
    pub quantity: i32,
    pub extra_price: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub average_ratings: Decimal,
    pub images: Vec<String>,
    pub sizes: Vec<SizeStock>,
    pub colours: Vec<ColourStock>,
}
