use axum_storefront_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::auth::RegisterRequest,
    dto::coupons::CreateCouponRequest,
    error::AppError,
    middleware::auth::AuthUser,
    services::{account_service, coupon_service},
    state::AppState,
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Statement};
use uuid::Uuid;

// Registration writes exactly one profile per account, and profile deletion
// cascades to the owning user without erroring when the user is already gone.
#[tokio::test]
async fn profile_lifecycle_flow() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let customer = register(&state, "customer@accounts.test", true).await?;
    let seller = register(&state, "seller@accounts.test", false).await?;

    assert_eq!(count(&state, "customers", customer.user_id).await?, 1);
    assert_eq!(count(&state, "sellers", customer.user_id).await?, 0);
    assert_eq!(count(&state, "customers", seller.user_id).await?, 0);
    assert_eq!(count(&state, "sellers", seller.user_id).await?, 1);

    // An OTP with the 15-minute window was issued at registration.
    let otp: (chrono::DateTime<Utc>, chrono::DateTime<Utc>) = sqlx::query_as(
        "SELECT created_at, expiry_date FROM otps WHERE user_id = $1",
    )
    .bind(customer.user_id)
    .fetch_one(&state.pool)
    .await?;
    let window = otp.1 - otp.0;
    assert!(window >= Duration::minutes(14) && window <= Duration::minutes(16));

    // Deleting the customer profile removes the owning user.
    let customer_row: (Uuid,) =
        sqlx::query_as("SELECT id FROM customers WHERE user_id = $1")
            .bind(customer.user_id)
            .fetch_one(&state.pool)
            .await?;
    account_service::delete_customer(&state.pool, &customer, customer_row.0).await?;
    let users: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE id = $1")
        .bind(customer.user_id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(users.0, 0);

    // The seller path behaves the same, and repeating the delete is a clean
    // NotFound rather than a failure mid-cascade.
    let seller_row: (Uuid,) = sqlx::query_as("SELECT id FROM sellers WHERE user_id = $1")
        .bind(seller.user_id)
        .fetch_one(&state.pool)
        .await?;
    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        role: "admin".into(),
    };
    account_service::delete_seller(&state.pool, &admin, seller_row.0).await?;
    let users: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE id = $1")
        .bind(seller.user_id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(users.0, 0);

    let repeat = account_service::delete_seller(&state.pool, &admin, seller_row.0).await;
    assert!(matches!(repeat, Err(AppError::NotFound)));

    Ok(())
}

#[tokio::test]
async fn coupon_expiry_rules() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;
    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        role: "admin".into(),
    };

    // Past or boundary expiry is rejected outright.
    let rejected = coupon_service::create_coupon(
        &state,
        &admin,
        CreateCouponRequest {
            code: None,
            price: Decimal::from(5),
            expiry_date: Utc::now() - Duration::minutes(1),
        },
    )
    .await;
    assert!(matches!(rejected, Err(AppError::BadRequest(_))));

    let coupon = coupon_service::create_coupon(
        &state,
        &admin,
        CreateCouponRequest {
            code: None,
            price: Decimal::from(5),
            expiry_date: Utc::now() + Duration::hours(1),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(coupon.code.len(), 8);
    assert!(!coupon.expired);

    let found = coupon_service::get_valid_coupon(&state, &coupon.code)
        .await?
        .data
        .unwrap();
    assert_eq!(found.id, coupon.id);

    // Force the stored expiry into the past; the lookup flips the flag and
    // rejects the code.
    sqlx::query("UPDATE coupons SET expiry_date = now() - interval '1 hour' WHERE id = $1")
        .bind(coupon.id)
        .execute(&state.pool)
        .await?;
    let expired = coupon_service::get_valid_coupon(&state, &coupon.code).await;
    assert!(matches!(expired, Err(AppError::BadRequest(_))));
    let flag: (bool,) = sqlx::query_as("SELECT expired FROM coupons WHERE id = $1")
        .bind(coupon.id)
        .fetch_one(&state.pool)
        .await?;
    assert!(flag.0);

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, cart_items, carts, addresses, countries, coupons, review_images, product_reviews, product_images, colour_inventory, size_inventory, products, colours, sizes, categories, otps, sellers, customers, audit_logs, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState { pool, orm })
}

async fn register(state: &AppState, email: &str, is_customer: bool) -> anyhow::Result<AuthUser> {
    let resp = account_service::register_account(
        &state.pool,
        RegisterRequest {
            email: email.into(),
            password: "secret123".into(),
            full_name: "Account Tester".into(),
            phone_number: "+1 555 000 9876".into(),
            country: "US".into(),
            address: "2 Account Street".into(),
            is_customer: Some(is_customer),
            company_name: (!is_customer).then(|| "Account Supply Co".to_string()),
            date_of_birth: None,
            gender: None,
        },
    )
    .await?;
    let user = resp.data.unwrap();
    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
    })
}

async fn count(state: &AppState, table: &str, user_id: Uuid) -> anyhow::Result<i64> {
    let query = format!("SELECT COUNT(*) FROM {table} WHERE user_id = $1");
    let row: (i64,) = sqlx::query_as(&query).bind(user_id).fetch_one(&state.pool).await?;
    Ok(row.0)
}
