use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::auth::{
        LoginRequest, LoginResponse, ProfileResponse, RegisterRequest, RequestOtpRequest,
        VerifyOtpRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    services::account_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/otp/request", post(request_otp))
        .route("/otp/verify", post(verify_otp))
        .route("/me", get(me))
        .route("/customers/{id}", delete(delete_customer))
        .route("/sellers/{id}", delete(delete_seller))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = ApiResponse<User>),
        (status = 400, description = "Validation failed"),
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = account_service::register_account(&state.pool, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Invalid credentials"),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = account_service::login(&state.pool, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/otp/request",
    request_body = RequestOtpRequest,
    responses(
        (status = 200, description = "Verification code issued"),
        (status = 404, description = "Unknown email"),
    ),
    tag = "Auth"
)]
pub async fn request_otp(
    State(state): State<AppState>,
    Json(payload): Json<RequestOtpRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = account_service::request_otp(&state.pool, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/otp/verify",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Account verified"),
        (status = 400, description = "Invalid or expired code"),
    ),
    tag = "Auth"
)]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = account_service::verify_otp(&state.pool, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current account with profile", body = ApiResponse<ProfileResponse>),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProfileResponse>>> {
    let resp = account_service::me(&state.pool, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/auth/customers/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer profile ID")
    ),
    responses(
        (status = 200, description = "Customer and owning user deleted"),
        (status = 404, description = "Customer not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = account_service::delete_customer(&state.pool, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/auth/sellers/{id}",
    params(
        ("id" = Uuid, Path, description = "Seller profile ID")
    ),
    responses(
        (status = 200, description = "Seller and owning user deleted"),
        (status = 404, description = "Seller not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn delete_seller(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = account_service::delete_seller(&state.pool, &user, id).await?;
    Ok(Json(resp))
}
