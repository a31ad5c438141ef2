use axum::Router;

use crate::state::AppState;

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod coupons;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/categories", catalog::category_router())
        .nest("/sizes", catalog::size_router())
        .nest("/colours", catalog::colour_router())
        .nest("/countries", catalog::country_router())
        .nest("/products", products::router())
        .nest("/coupons", coupons::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .nest("/addresses", addresses::router())
        .nest("/admin", admin::router())
}
