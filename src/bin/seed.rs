use argon2::{
    Argon2, PasswordHasher,
    password_hash::{rand_core::OsRng, SaltString},
};
use axum_storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let admin_id = ensure_account(&pool, "admin@example.com", "admin123", "admin", true).await?;
    let seller_id =
        ensure_account(&pool, "seller@example.com", "seller123", "seller", false).await?;
    let customer_id =
        ensure_account(&pool, "customer@example.com", "customer123", "customer", true).await?;

    let category_id = ensure_category(&pool, "Clothing").await?;
    seed_reference_data(&pool).await?;
    seed_products(&pool, seller_id, category_id).await?;

    println!(
        "Seed completed. Admin: {admin_id}, Seller: {seller_id}, Customer: {customer_id}"
    );
    Ok(())
}

async fn ensure_account(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
    is_customer: bool,
) -> anyhow::Result<Uuid> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = row {
        return Ok(id);
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let id = Uuid::new_v4();
    let mut txn = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash, full_name, phone_number, is_verified, is_customer, role)
        VALUES ($1, $2, $3, $4, $5, TRUE, $6, $7)
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .bind(format!("Seed {role}"))
    .bind("+1000000000")
    .bind(is_customer)
    .bind(role)
    .execute(&mut *txn)
    .await?;

    if is_customer {
        sqlx::query("INSERT INTO customers (id, user_id) VALUES ($1, $2)")
            .bind(Uuid::new_v4())
            .bind(id)
            .execute(&mut *txn)
            .await?;
    } else {
        sqlx::query("INSERT INTO sellers (id, user_id, company_name) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(id)
            .bind("Seed Supply Co")
            .execute(&mut *txn)
            .await?;
    }

    txn.commit().await?;
    Ok(id)
}

async fn ensure_category(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<Uuid> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = row {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO categories (id, name) VALUES ($1, $2)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;
    Ok(id)
}

async fn seed_reference_data(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    for title in ["S", "M", "L", "XL"] {
        let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM sizes WHERE title = $1")
            .bind(title)
            .fetch_optional(pool)
            .await?;
        if exist.is_none() {
            sqlx::query("INSERT INTO sizes (id, title) VALUES ($1, $2)")
                .bind(Uuid::new_v4())
                .bind(title)
                .execute(pool)
                .await?;
        }
    }

    for (name, hex) in [("Black", "#000000"), ("White", "#FFFFFF"), ("Red", "#FF0000")] {
        let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM colours WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        if exist.is_none() {
            sqlx::query("INSERT INTO colours (id, name, hex_code) VALUES ($1, $2, $3)")
                .bind(Uuid::new_v4())
                .bind(name)
                .bind(hex)
                .execute(pool)
                .await?;
        }
    }

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM countries WHERE code = $1")
        .bind("US")
        .fetch_optional(pool)
        .await?;
    if exist.is_none() {
        sqlx::query("INSERT INTO countries (id, name, code) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind("United States")
            .bind("US")
            .execute(pool)
            .await?;
    }

    Ok(())
}

async fn seed_products(
    pool: &sqlx::PgPool,
    seller_user_id: Uuid,
    category_id: Uuid,
) -> anyhow::Result<()> {
    let seller: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM sellers WHERE user_id = $1")
        .bind(seller_user_id)
        .fetch_optional(pool)
        .await?;
    let seller_id = match seller {
        Some((id,)) => id,
        None => anyhow::bail!("seed seller is missing its profile"),
    };

    for (title, price, pct, inventory) in [
        ("Classic Tee", Decimal::new(2500, 2), 0, 120),
        ("Canvas Tote", Decimal::new(1800, 2), 10, 45),
        ("Wool Beanie", Decimal::new(1500, 2), 25, 8),
    ] {
        let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE title = $1")
            .bind(title)
            .fetch_optional(pool)
            .await?;
        if exist.is_some() {
            continue;
        }

        let slug = title.to_lowercase().replace(' ', "-");
        sqlx::query(
            r#"
            INSERT INTO products
                (id, seller_id, category_id, title, slug, description, price, percentage_off, shipping_fee, inventory)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(seller_id)
        .bind(category_id)
        .bind(title)
        .bind(slug)
        .bind(format!("{title} from the seed catalog"))
        .bind(price)
        .bind(pct)
        .bind(Decimal::new(500, 2))
        .bind(inventory)
        .execute(pool)
        .await?;
    }

    Ok(())
}
