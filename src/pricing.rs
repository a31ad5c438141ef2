use rust_decimal::Decimal;

/// Discounted price for a product: `price * (1 - percentage_off/100)` rounded
/// to 2 decimal places. Zero when no discount is set.
pub fn discount_price(price: Decimal, percentage_off: i32) -> Decimal {
    if percentage_off <= 0 {
        return Decimal::ZERO;
    }
    let fraction = Decimal::from(percentage_off) / Decimal::from(100);
    (price * (Decimal::ONE - fraction)).round_dp(2)
}

/// The price a buyer actually pays per unit: the discounted price when one
/// applies, the list price otherwise.
pub fn effective_unit_price(price: Decimal, percentage_off: i32) -> Decimal {
    let discounted = discount_price(price, percentage_off);
    if discounted > Decimal::ZERO {
        discounted
    } else {
        price
    }
}

/// Total for one cart line: unit price, shipping fee and variant surcharge
/// all scale with quantity.
pub fn line_total(
    price: Decimal,
    percentage_off: i32,
    shipping_fee: Decimal,
    extra_price: Decimal,
    quantity: i32,
) -> Decimal {
    let qty = Decimal::from(quantity);
    (effective_unit_price(price, percentage_off) * qty + shipping_fee * qty + extra_price * qty)
        .round_dp(2)
}

/// Mean of review ratings, zero when there are none.
pub fn average_rating(ratings: &[i32]) -> Decimal {
    if ratings.is_empty() {
        return Decimal::ZERO;
    }
    let sum: i32 = ratings.iter().sum();
    (Decimal::from(sum) / Decimal::from(ratings.len() as u64)).round_dp(2)
}
