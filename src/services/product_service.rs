use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::{
        ColourStock, CreateProductRequest, ProductDetail, ProductList, SizeStock,
        UpdateProductRequest,
    },
    entity::{
        categories::Entity as Categories,
        colour_inventory::{
            ActiveModel as ColourInvActive, Column as ColourInvCol, Entity as ColourInventory,
        },
        colours::Entity as Colours,
        product_images::{ActiveModel as ImageActive, Column as ImageCol, Entity as ProductImages},
        product_reviews::{Column as ReviewCol, Entity as ProductReviews},
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
        size_inventory::{
            ActiveModel as SizeInvActive, Column as SizeInvCol, Entity as SizeInventory,
        },
        sizes::Entity as Sizes,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_seller},
    models::Product,
    pricing,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::account_service,
    state::AppState,
};

/// Storefront listing: only products with stock, the filtered manager.
pub async fn list_available(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let condition = Condition::all().add(Column::Inventory.gt(0));
    list_with_condition(state, query, condition).await
}

/// Unfiltered listing, including out-of-stock rows. Operator only.
pub async fn list_all(
    state: &AppState,
    user: &AuthUser,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    list_with_condition(state, query, Condition::all()).await
}

async fn list_with_condition(
    state: &AppState,
    query: ProductQuery,
    mut condition: Condition,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Title).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    if let Some(featured) = query.featured {
        condition = condition.add(Column::Featured.eq(featured));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Title => Column::Title,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    let data = ProductList { items };
    Ok(ApiResponse::success("Products", data, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    let product = Products::find_by_id(id).one(&state.orm).await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let ratings: Vec<i32> = ProductReviews::find()
        .select_only()
        .column(ReviewCol::Rating)
        .filter(ReviewCol::ProductId.eq(id))
        .into_tuple()
        .all(&state.orm)
        .await?;
    let average_ratings = pricing::average_rating(&ratings);

    let images = ProductImages::find()
        .filter(ImageCol::ProductId.eq(id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|img| img.image_url)
        .collect();

    let sizes = SizeInventory::find()
        .filter(SizeInvCol::ProductId.eq(id))
        .find_also_related(Sizes)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(stock, size)| SizeStock {
            id: stock.id,
            size_id: stock.size_id,
            title: size.map(|s| s.title).unwrap_or_default(),
            quantity: stock.quantity,
            extra_price: stock.extra_price,
        })
        .collect();

    let colours = ColourInventory::find()
        .filter(ColourInvCol::ProductId.eq(id))
        .find_also_related(Colours)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(stock, colour)| {
            let (name, hex_code) = colour
                .map(|c| (c.name, c.hex_code))
                .unwrap_or_default();
            ColourStock {
                id: stock.id,
                colour_id: stock.colour_id,
                name,
                hex_code,
                quantity: stock.quantity,
                extra_price: stock.extra_price,
            }
        })
        .collect();

    let data = ProductDetail {
        product: product_from_entity(product),
        average_ratings,
        images,
        sizes,
        colours,
    };
    Ok(ApiResponse::success("Product", data, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_seller(user)?;
    let seller = account_service::seller_for_user(&state.orm, user.user_id).await?;

    validate_pricing_fields(&payload)?;

    let exist = Products::find()
        .filter(Column::Title.eq(payload.title.clone()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("Title is already taken".into()));
    }

    if let Some(category_id) = payload.category_id {
        let category = Categories::find_by_id(category_id).one(&state.orm).await?;
        if category.is_none() {
            return Err(AppError::BadRequest("Category not found".into()));
        }
    }

    let id = Uuid::new_v4();
    let slug = slugify(&payload.title);

    let txn = state.orm.begin().await?;

    let active = ActiveModel {
        id: Set(id),
        seller_id: Set(seller.id),
        category_id: Set(payload.category_id),
        title: Set(payload.title),
        slug: Set(slug),
        description: Set(payload.description),
        price: Set(payload.price),
        percentage_off: Set(payload.percentage_off.unwrap_or(0)),
        shipping_fee: Set(payload.shipping_fee.unwrap_or_default()),
        shipping_out_days: Set(payload.shipping_out_days.unwrap_or(0)),
        inventory: Set(payload.inventory),
        flash_sale_start_date: Set(payload.flash_sale_start_date.map(Into::into)),
        flash_sale_end_date: Set(payload.flash_sale_end_date.map(Into::into)),
        featured: Set(payload.featured.unwrap_or(false)),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let product = active.insert(&txn).await?;

    for variant in &payload.sizes {
        let size = Sizes::find_by_id(variant.size_id).one(&txn).await?;
        if size.is_none() {
            return Err(AppError::BadRequest("Size not found".into()));
        }
        SizeInvActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product.id),
            size_id: Set(variant.size_id),
            quantity: Set(variant.quantity),
            extra_price: Set(variant.extra_price.unwrap_or_default()),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }

    for variant in &payload.colours {
        let colour = Colours::find_by_id(variant.colour_id).one(&txn).await?;
        if colour.is_none() {
            return Err(AppError::BadRequest("Colour not found".into()));
        }
        ColourInvActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product.id),
            colour_id: Set(variant.colour_id),
            quantity: Set(variant.quantity),
            extra_price: Set(variant.extra_price.unwrap_or_default()),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }

    for url in &payload.image_urls {
        ImageActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product.id),
            image_url: Set(url.clone()),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    ensure_owner_or_admin(state, user, &existing).await?;

    if let Some(pct) = payload.percentage_off {
        if !(0..=100).contains(&pct) {
            return Err(AppError::BadRequest(
                "percentage_off must be between 0 and 100".into(),
            ));
        }
    }

    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        let taken = Products::find()
            .filter(Column::Title.eq(title.clone()))
            .filter(Column::Id.ne(id))
            .one(&state.orm)
            .await?;
        if taken.is_some() {
            return Err(AppError::BadRequest("Title is already taken".into()));
        }
        active.slug = Set(slugify(&title));
        active.title = Set(title);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(Some(category_id));
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(pct) = payload.percentage_off {
        active.percentage_off = Set(pct);
    }
    if let Some(fee) = payload.shipping_fee {
        active.shipping_fee = Set(fee);
    }
    if let Some(days) = payload.shipping_out_days {
        active.shipping_out_days = Set(days);
    }
    if let Some(inventory) = payload.inventory {
        active.inventory = Set(inventory);
    }
    if let Some(start) = payload.flash_sale_start_date {
        active.flash_sale_start_date = Set(Some(start.into()));
    }
    if let Some(end) = payload.flash_sale_end_date {
        active.flash_sale_end_date = Set(Some(end.into()));
    }
    if let Some(featured) = payload.featured {
        active.featured = Set(featured);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    ensure_owner_or_admin(state, user, &existing).await?;

    Products::delete_by_id(id).exec(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn ensure_owner_or_admin(
    state: &AppState,
    user: &AuthUser,
    product: &ProductModel,
) -> AppResult<()> {
    if user.role == "admin" {
        return Ok(());
    }
    let seller = account_service::seller_for_user(&state.orm, user.user_id).await?;
    if product.seller_id != seller.id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

fn validate_pricing_fields(payload: &CreateProductRequest) -> AppResult<()> {
    if payload.price.is_sign_negative() {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if !(0..=100).contains(&payload.percentage_off.unwrap_or(0)) {
        return Err(AppError::BadRequest(
            "percentage_off must be between 0 and 100".into(),
        ));
    }
    if payload.inventory < 0 {
        return Err(AppError::BadRequest("inventory must not be negative".into()));
    }
    if let (Some(start), Some(end)) = (
        payload.flash_sale_start_date,
        payload.flash_sale_end_date,
    ) {
        if end <= start {
            return Err(AppError::BadRequest(
                "flash sale window must end after it starts".into(),
            ));
        }
    }
    Ok(())
}

pub fn product_from_entity(model: ProductModel) -> Product {
    let discount_price = pricing::discount_price(model.price, model.percentage_off);
    Product {
        id: model.id,
        seller_id: model.seller_id,
        category_id: model.category_id,
        title: model.title,
        slug: model.slug,
        description: model.description,
        price: model.price,
        percentage_off: model.percentage_off,
        discount_price,
        shipping_fee: model.shipping_fee,
        shipping_out_days: model.shipping_out_days,
        inventory: model.inventory,
        flash_sale_start_date: model.flash_sale_start_date.map(|dt| dt.with_timezone(&Utc)),
        flash_sale_end_date: model.flash_sale_end_date.map(|dt| dt.with_timezone(&Utc)),
        featured: model.featured,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

/// Lowercase the title and collapse anything non-alphanumeric into single
/// dashes, the usual URL slug shape.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
