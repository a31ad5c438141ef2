use axum_storefront_api::pricing::{
    average_rating, discount_price, effective_unit_price, line_total,
};
use axum_storefront_api::services::coupon_service::{expires_in_future, generate_code};
use axum_storefront_api::services::product_service::slugify;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;

#[test]
fn discount_price_applies_percentage_off() {
    let price = Decimal::from(100);
    assert_eq!(discount_price(price, 10), Decimal::from(90));
}

#[test]
fn discount_price_rounds_to_two_decimals() {
    // 19.99 * 0.85 = 16.9915 -> 16.99
    let price = Decimal::new(1999, 2);
    assert_eq!(discount_price(price, 15), Decimal::new(1699, 2));
}

#[test]
fn discount_price_is_zero_without_discount() {
    let price = Decimal::from(100);
    assert_eq!(discount_price(price, 0), Decimal::ZERO);
}

#[test]
fn effective_price_falls_back_to_list_price() {
    let price = Decimal::from(75);
    assert_eq!(effective_unit_price(price, 0), price);
    assert_eq!(effective_unit_price(price, 20), Decimal::from(60));
}

#[test]
fn line_total_combines_discount_shipping_and_surcharge() {
    // price=100, 10% off, shipping=5, extra=2, qty=3 -> 90*3 + 5*3 + 2*3 = 291
    let total = line_total(
        Decimal::from(100),
        10,
        Decimal::from(5),
        Decimal::from(2),
        3,
    );
    assert_eq!(total, Decimal::from(291));
}

#[test]
fn line_total_without_discount_uses_list_price() {
    let total = line_total(
        Decimal::from(20),
        0,
        Decimal::ZERO,
        Decimal::ZERO,
        2,
    );
    assert_eq!(total, Decimal::from(40));
}

#[test]
fn average_rating_is_the_mean() {
    assert_eq!(average_rating(&[3, 4, 5]), Decimal::from(4));
}

#[test]
fn average_rating_of_nothing_is_zero() {
    assert_eq!(average_rating(&[]), Decimal::ZERO);
}

#[test]
fn coupon_codes_are_eight_uppercase_hex_chars() {
    for _ in 0..32 {
        let code = generate_code();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }
}

#[test]
fn coupon_expiry_must_be_strictly_in_the_future() {
    let now = Utc::now();
    assert!(expires_in_future(now + Duration::minutes(1), now));
    assert!(!expires_in_future(now, now));
    assert!(!expires_in_future(now - Duration::minutes(1), now));
}

#[test]
fn slugs_are_lowercase_and_dashed() {
    assert_eq!(slugify("Classic Tee"), "classic-tee");
    assert_eq!(slugify("  Wool -- Beanie!  "), "wool-beanie");
    assert_eq!(slugify("Size 10 Boots"), "size-10-boots");
}
