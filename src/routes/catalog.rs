use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::catalog::{
        CategoryList, ColourList, CountryList, CreateCategoryRequest, CreateColourRequest,
        CreateCountryRequest, CreateSizeRequest, SizeList,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Category, Colour, Country, Size},
    response::ApiResponse,
    routes::params::Pagination,
    services::catalog_service,
    state::AppState,
};

pub fn category_router() -> Router<AppState> {
    Router::new().route("/", get(list_categories).post(create_category))
}

pub fn size_router() -> Router<AppState> {
    Router::new().route("/", get(list_sizes).post(create_size))
}

pub fn colour_router() -> Router<AppState> {
    Router::new().route("/", get(list_colours).post(create_colour))
}

pub fn country_router() -> Router<AppState> {
    Router::new().route("/", get(list_countries).post(create_country))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "All categories", body = ApiResponse<CategoryList>)
    ),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = catalog_service::list_categories(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Category added", body = ApiResponse<Category>),
        (status = 400, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = catalog_service::create_category(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/sizes",
    responses(
        (status = 200, description = "All sizes", body = ApiResponse<SizeList>)
    ),
    tag = "Catalog"
)]
pub async fn list_sizes(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<SizeList>>> {
    let resp = catalog_service::list_sizes(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/sizes",
    request_body = CreateSizeRequest,
    responses(
        (status = 200, description = "Size created", body = ApiResponse<Size>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_size(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateSizeRequest>,
) -> AppResult<Json<ApiResponse<Size>>> {
    let resp = catalog_service::create_size(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/colours",
    responses(
        (status = 200, description = "All colours", body = ApiResponse<ColourList>)
    ),
    tag = "Catalog"
)]
pub async fn list_colours(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ColourList>>> {
    let resp = catalog_service::list_colours(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/colours",
    request_body = CreateColourRequest,
    responses(
        (status = 200, description = "Colour created", body = ApiResponse<Colour>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_colour(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateColourRequest>,
) -> AppResult<Json<ApiResponse<Colour>>> {
    let resp = catalog_service::create_colour(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/countries",
    responses(
        (status = 200, description = "All countries", body = ApiResponse<CountryList>)
    ),
    tag = "Catalog"
)]
pub async fn list_countries(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CountryList>>> {
    let resp = catalog_service::list_countries(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/countries",
    request_body = CreateCountryRequest,
    responses(
        (status = 200, description = "Country created", body = ApiResponse<Country>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_country(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCountryRequest>,
) -> AppResult<Json<ApiResponse<Country>>> {
    let resp = catalog_service::create_country(&state, &user, payload).await?;
    Ok(Json(resp))
}
