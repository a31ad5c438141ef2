use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Customer, Seller, User};

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone_number: String,
    pub country: String,
    pub address: String,
    /// Registers a customer profile when true (the default), a seller
    /// profile otherwise.
    pub is_customer: Option<bool>,
    pub company_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct RequestOtpRequest {
    pub email: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub code: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: User,
    pub customer: Option<Customer>,
    pub seller: Option<Seller>,
}
