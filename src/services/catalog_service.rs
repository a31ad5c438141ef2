use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::catalog::{
        CategoryList, ColourList, CountryList, CreateCategoryRequest, CreateColourRequest,
        CreateCountryRequest, CreateSizeRequest, SizeList,
    },
    entity::{
        categories::{
            ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories,
            Model as CategoryModel,
        },
        colours::{ActiveModel as ColourActive, Column as ColourCol, Entity as Colours, Model as ColourModel},
        countries::{
            ActiveModel as CountryActive, Column as CountryCol, Entity as Countries,
            Model as CountryModel,
        },
        sizes::{ActiveModel as SizeActive, Column as SizeCol, Entity as Sizes, Model as SizeModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Colour, Country, Size},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_categories(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<CategoryList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Categories::find().order_by_asc(CategoryCol::Name);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(meta),
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }

    let active = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let category = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "category_create",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Category has been added",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn list_sizes(state: &AppState) -> AppResult<ApiResponse<SizeList>> {
    let items = Sizes::find()
        .order_by_asc(SizeCol::Title)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(size_from_entity)
        .collect();
    Ok(ApiResponse::success("Sizes", SizeList { items }, None))
}

pub async fn create_size(
    state: &AppState,
    user: &AuthUser,
    payload: CreateSizeRequest,
) -> AppResult<ApiResponse<Size>> {
    ensure_admin(user)?;
    if payload.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".into()));
    }

    let active = SizeActive {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title.trim().to_string()),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let size = active.insert(&state.orm).await?;

    Ok(ApiResponse::success(
        "Size created",
        size_from_entity(size),
        Some(Meta::empty()),
    ))
}

pub async fn list_colours(state: &AppState) -> AppResult<ApiResponse<ColourList>> {
    let items = Colours::find()
        .order_by_asc(ColourCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(colour_from_entity)
        .collect();
    Ok(ApiResponse::success("Colours", ColourList { items }, None))
}

pub async fn create_colour(
    state: &AppState,
    user: &AuthUser,
    payload: CreateColourRequest,
) -> AppResult<ApiResponse<Colour>> {
    ensure_admin(user)?;
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }

    let active = ColourActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        hex_code: Set(payload.hex_code.trim().to_string()),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let colour = active.insert(&state.orm).await?;

    Ok(ApiResponse::success(
        "Colour created",
        colour_from_entity(colour),
        Some(Meta::empty()),
    ))
}

pub async fn list_countries(state: &AppState) -> AppResult<ApiResponse<CountryList>> {
    let items = Countries::find()
        .order_by_asc(CountryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(country_from_entity)
        .collect();
    Ok(ApiResponse::success(
        "Countries",
        CountryList { items },
        None,
    ))
}

pub async fn create_country(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCountryRequest,
) -> AppResult<ApiResponse<Country>> {
    ensure_admin(user)?;
    if payload.name.trim().is_empty() || payload.code.trim().is_empty() {
        return Err(AppError::BadRequest("name and code are required".into()));
    }

    let active = CountryActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        code: Set(payload.code.trim().to_uppercase()),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let country = active.insert(&state.orm).await?;

    Ok(ApiResponse::success(
        "Country created",
        country_from_entity(country),
        Some(Meta::empty()),
    ))
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn size_from_entity(model: SizeModel) -> Size {
    Size {
        id: model.id,
        title: model.title,
    }
}

fn colour_from_entity(model: ColourModel) -> Colour {
    Colour {
        id: model.id,
        name: model.name,
        hex_code: model.hex_code,
    }
}

fn country_from_entity(model: CountryModel) -> Country {
    Country {
        id: model.id,
        name: model.name,
        code: model.code,
    }
}
