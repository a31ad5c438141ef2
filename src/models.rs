use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone_number: String,
    pub country: String,
    pub address: String,
    pub is_verified: bool,
    pub is_customer: bool,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Seller {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub ratings: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Size {
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Colour {
    pub id: Uuid,
    pub name: String,
    pub hex_code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub percentage_off: i32,
    pub discount_price: Decimal,
    pub shipping_fee: Decimal,
    pub shipping_out_days: i32,
    pub inventory: i32,
    pub flash_sale_start_date: Option<DateTime<Utc>>,
    pub flash_sale_end_date: Option<DateTime<Utc>>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductReview {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub product_id: Uuid,
    pub rating: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub price: Decimal,
    pub expired: bool,
    pub expiry_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub size_id: Option<Uuid>,
    pub colour_id: Option<Uuid>,
    pub quantity: i32,
    pub extra_price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub transaction_ref: String,
    pub placed_at: DateTime<Utc>,
    pub total_price: Decimal,
    pub address_id: Option<Uuid>,
    pub payment_status: String,
    pub shipping_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub size: Option<String>,
    pub colour: Option<String>,
    pub ordered: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Country {
    pub id: Uuid,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub country_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub street_address: String,
    pub second_street_address: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
}
