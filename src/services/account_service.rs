use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use rand::Rng;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::{DbPool, OrmConn},
    dto::auth::{
        Claims, LoginRequest, LoginResponse, ProfileResponse, RegisterRequest, RequestOtpRequest,
        VerifyOtpRequest,
    },
    entity::{
        customers::{Column as CustomerCol, Entity as Customers, Model as CustomerModel},
        sellers::{Column as SellerCol, Entity as Sellers, Model as SellerModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Customer, Seller, User},
    response::{ApiResponse, Meta},
};

/// Verification codes stay valid for this long after issue.
const OTP_TTL_MINUTES: i64 = 15;

pub async fn register_account(
    pool: &DbPool,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    validate_email(&payload.email)?;
    validate_full_name(&payload.full_name)?;
    validate_phone_number(&payload.phone_number)?;

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(payload.email.as_str())
        .fetch_optional(pool)
        .await?;

    if exist.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let is_customer = payload.is_customer.unwrap_or(true);
    let role = if is_customer { "customer" } else { "seller" };
    let id = Uuid::new_v4();

    // User row and its single profile row are written together; there is no
    // save hook that could leave a user without a profile.
    let mut txn = pool.begin().await?;

    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, full_name, phone_number, country, address, is_customer, role)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(payload.email.as_str())
    .bind(password_hash)
    .bind(payload.full_name.as_str())
    .bind(payload.phone_number.as_str())
    .bind(payload.country.as_str())
    .bind(payload.address.as_str())
    .bind(is_customer)
    .bind(role)
    .fetch_one(&mut *txn)
    .await?;

    if is_customer {
        sqlx::query(
            "INSERT INTO customers (id, user_id, date_of_birth, gender) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(user.id)
        .bind(payload.date_of_birth)
        .bind(payload.gender.as_deref())
        .execute(&mut *txn)
        .await?;
    } else {
        sqlx::query("INSERT INTO sellers (id, user_id, company_name) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(user.id)
            .bind(payload.company_name.as_deref().unwrap_or_default())
            .execute(&mut *txn)
            .await?;
    }

    issue_otp(&mut txn, user.id).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.id),
        "account_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id, "role": role })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
    Ok(ApiResponse::success("Account created", user, None))
}

pub async fn login(pool: &DbPool, payload: LoginRequest) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;

    let row: Option<(Uuid, String, String)> =
        sqlx::query_as("SELECT id, password_hash, role FROM users WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(pool)
            .await?;

    let (user_id, stored_hash, role) = match row {
        Some(r) => r,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.clone(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    let resp = LoginResponse {
        token: format!("Bearer {}", token),
    };

    if let Err(err) = log_audit(
        pool,
        Some(user_id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": user_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

pub async fn request_otp(
    pool: &DbPool,
    payload: RequestOtpRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let user: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(payload.email.as_str())
        .fetch_optional(pool)
        .await?;
    let user_id = match user {
        Some((id,)) => id,
        None => return Err(AppError::NotFound),
    };

    let mut txn = pool.begin().await?;
    issue_otp(&mut txn, user_id).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Verification code sent",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn verify_otp(
    pool: &DbPool,
    payload: VerifyOtpRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let user: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(payload.email.as_str())
        .fetch_optional(pool)
        .await?;
    let user_id = match user {
        Some((id,)) => id,
        None => return Err(AppError::NotFound),
    };

    let otp: Option<(Uuid, chrono::DateTime<Utc>)> = sqlx::query_as(
        r#"
        SELECT id, expiry_date FROM otps
        WHERE user_id = $1 AND code = $2 AND expired = FALSE
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(payload.code)
    .fetch_optional(pool)
    .await?;

    let (otp_id, expiry_date) = match otp {
        Some(o) => o,
        None => return Err(AppError::BadRequest("Invalid verification code".into())),
    };

    sqlx::query("UPDATE otps SET expired = TRUE, updated_at = now() WHERE id = $1")
        .bind(otp_id)
        .execute(pool)
        .await?;

    if expiry_date <= Utc::now() {
        return Err(AppError::BadRequest(
            "Verification code has expired".into(),
        ));
    }

    sqlx::query("UPDATE users SET is_verified = TRUE, updated_at = now() WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(ApiResponse::success(
        "Account verified",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn me(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<ProfileResponse>> {
    let account: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user.user_id)
        .fetch_optional(pool)
        .await?;
    let account = match account {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let customer: Option<Customer> =
        sqlx::query_as("SELECT * FROM customers WHERE user_id = $1")
            .bind(user.user_id)
            .fetch_optional(pool)
            .await?;
    let seller: Option<Seller> = sqlx::query_as("SELECT * FROM sellers WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_optional(pool)
        .await?;

    let data = ProfileResponse {
        user: account,
        customer,
        seller,
    };
    Ok(ApiResponse::success("Profile", data, None))
}

/// Explicit cascade: removing a customer profile removes the owning user.
/// The user delete is idempotent, a row already gone is not an error.
pub async fn delete_customer(
    pool: &DbPool,
    user: &AuthUser,
    customer_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT user_id FROM customers WHERE id = $1")
        .bind(customer_id)
        .fetch_optional(pool)
        .await?;
    let owner_id = match row {
        Some((id,)) => id,
        None => return Err(AppError::NotFound),
    };

    if user.role != "admin" && owner_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let mut txn = pool.begin().await?;
    sqlx::query("DELETE FROM customers WHERE id = $1")
        .bind(customer_id)
        .execute(&mut *txn)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(owner_id)
        .execute(&mut *txn)
        .await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "customer_delete",
        Some("customers"),
        Some(serde_json::json!({ "customer_id": customer_id, "user_id": owner_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Customer deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn delete_seller(
    pool: &DbPool,
    user: &AuthUser,
    seller_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT user_id FROM sellers WHERE id = $1")
        .bind(seller_id)
        .fetch_optional(pool)
        .await?;
    let owner_id = match row {
        Some((id,)) => id,
        None => return Err(AppError::NotFound),
    };

    if user.role != "admin" && owner_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let mut txn = pool.begin().await?;
    sqlx::query("DELETE FROM sellers WHERE id = $1")
        .bind(seller_id)
        .execute(&mut *txn)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(owner_id)
        .execute(&mut *txn)
        .await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "seller_delete",
        Some("sellers"),
        Some(serde_json::json!({ "seller_id": seller_id, "user_id": owner_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Seller deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Resolve the customer profile behind an authenticated user.
pub(crate) async fn customer_for_user(
    orm: &OrmConn,
    user_id: Uuid,
) -> AppResult<CustomerModel> {
    let customer = Customers::find()
        .filter(CustomerCol::UserId.eq(user_id))
        .one(orm)
        .await?;
    match customer {
        Some(c) => Ok(c),
        None => Err(AppError::BadRequest("Customer profile not found".into())),
    }
}

/// Resolve the seller profile behind an authenticated user.
pub(crate) async fn seller_for_user(orm: &OrmConn, user_id: Uuid) -> AppResult<SellerModel> {
    let seller = Sellers::find()
        .filter(SellerCol::UserId.eq(user_id))
        .one(orm)
        .await?;
    match seller {
        Some(s) => Ok(s),
        None => Err(AppError::BadRequest("Seller profile not found".into())),
    }
}

async fn issue_otp(
    txn: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
) -> AppResult<i32> {
    let code: i32 = rand::rng().random_range(100_000..1_000_000);
    let expiry = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

    sqlx::query("INSERT INTO otps (id, user_id, code, expiry_date) VALUES ($1, $2, $3, $4)")
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(code)
        .bind(expiry)
        .execute(&mut **txn)
        .await?;

    // Mail delivery is an external collaborator; the code is traced so local
    // setups can complete verification.
    tracing::info!(user_id = %user_id, code, "verification code issued");
    Ok(code)
}

fn validate_email(email: &str) -> AppResult<()> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') || trimmed.starts_with('@') {
        return Err(AppError::BadRequest("A valid email address is required".into()));
    }
    Ok(())
}

fn validate_full_name(full_name: &str) -> AppResult<()> {
    if full_name.trim().split_whitespace().count() < 2 {
        return Err(AppError::BadRequest(
            "Full name must include first and last name".into(),
        ));
    }
    Ok(())
}

fn validate_phone_number(phone: &str) -> AppResult<()> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    let valid_chars = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'));
    if digits < 7 || !valid_chars {
        return Err(AppError::BadRequest("A valid phone number is required".into()));
    }
    Ok(())
}
