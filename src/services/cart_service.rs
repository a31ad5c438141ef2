use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::OrmConn,
    dto::cart::{AddToCartRequest, CartItemView, CartView, UpdateCartItemRequest},
    entity::{
        cart_items::{
            ActiveModel as CartItemActive, Column as CartItemCol, Entity as CartItems,
            Model as CartItemModel,
        },
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts, Model as CartModel},
        colour_inventory::{Column as ColourInvCol, Entity as ColourInventory},
        colours::Entity as Colours,
        products::Entity as Products,
        size_inventory::{Column as SizeInvCol, Entity as SizeInventory},
        sizes::Entity as Sizes,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_customer},
    models::CartItem,
    pricing,
    response::{ApiResponse, Meta},
    services::{account_service, product_service},
    state::AppState,
};

pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    ensure_customer(user)?;
    let customer = account_service::customer_for_user(&state.orm, user.user_id).await?;
    let cart = get_or_create_cart(&state.orm, customer.id).await?;

    let rows = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .order_by_desc(CartItemCol::CreatedAt)
        .find_also_related(Products)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    let mut total_price = Decimal::ZERO;
    for (item, product) in rows {
        let product = match product {
            Some(p) => p,
            None => continue,
        };

        let size = match item.size_id {
            Some(size_id) => Sizes::find_by_id(size_id)
                .one(&state.orm)
                .await?
                .map(|s| s.title),
            None => None,
        };
        let colour = match item.colour_id {
            Some(colour_id) => Colours::find_by_id(colour_id)
                .one(&state.orm)
                .await?
                .map(|c| c.name),
            None => None,
        };

        let line_total = pricing::line_total(
            product.price,
            product.percentage_off,
            product.shipping_fee,
            item.extra_price,
            item.quantity,
        );
        total_price += line_total;

        items.push(CartItemView {
            id: item.id,
            product: product_service::product_from_entity(product),
            size,
            colour,
            quantity: item.quantity,
            extra_price: item.extra_price,
            total_price: line_total,
        });
    }

    let data = CartView {
        id: cart.id,
        items,
        total_price,
    };
    Ok(ApiResponse::success("Cart", data, None))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    ensure_customer(user)?;
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let customer = account_service::customer_for_user(&state.orm, user.user_id).await?;

    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?;
    if product.is_none() {
        return Err(AppError::BadRequest("product not found".to_string()));
    }

    // Variant surcharges come from the product's own inventory rows; a size
    // or colour the product is not stocked in is rejected outright.
    let mut extra_price = Decimal::ZERO;
    if let Some(size_id) = payload.size_id {
        let stock = SizeInventory::find()
            .filter(SizeInvCol::ProductId.eq(payload.product_id))
            .filter(SizeInvCol::SizeId.eq(size_id))
            .one(&state.orm)
            .await?;
        match stock {
            Some(stock) => extra_price += stock.extra_price,
            None => {
                return Err(AppError::BadRequest(
                    "product is not stocked in that size".into(),
                ));
            }
        }
    }
    if let Some(colour_id) = payload.colour_id {
        let stock = ColourInventory::find()
            .filter(ColourInvCol::ProductId.eq(payload.product_id))
            .filter(ColourInvCol::ColourId.eq(colour_id))
            .one(&state.orm)
            .await?;
        match stock {
            Some(stock) => extra_price += stock.extra_price,
            None => {
                return Err(AppError::BadRequest(
                    "product is not stocked in that colour".into(),
                ));
            }
        }
    }

    let cart = get_or_create_cart(&state.orm, customer.id).await?;

    let mut condition = Condition::all()
        .add(CartItemCol::CartId.eq(cart.id))
        .add(CartItemCol::ProductId.eq(payload.product_id));
    condition = match payload.size_id {
        Some(size_id) => condition.add(CartItemCol::SizeId.eq(size_id)),
        None => condition.add(CartItemCol::SizeId.is_null()),
    };
    condition = match payload.colour_id {
        Some(colour_id) => condition.add(CartItemCol::ColourId.eq(colour_id)),
        None => condition.add(CartItemCol::ColourId.is_null()),
    };

    let existing = CartItems::find().filter(condition).one(&state.orm).await?;

    let cart_item = if let Some(item) = existing {
        let mut active: CartItemActive = item.into();
        active.quantity = Set(payload.quantity);
        active.extra_price = Set(extra_price);
        active.updated_at = Set(Utc::now().into());
        active.update(&state.orm).await?
    } else {
        CartItemActive {
            id: Set(Uuid::new_v4()),
            cart_id: Set(cart.id),
            product_id: Set(payload.product_id),
            size_id: Set(payload.size_id),
            colour_id: Set(payload.colour_id),
            quantity: Set(payload.quantity),
            extra_price: Set(extra_price),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&state.orm)
        .await?
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": payload.product_id, "quantity": payload.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("OK", cart_item_from_entity(cart_item), None))
}

pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    ensure_customer(user)?;
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let customer = account_service::customer_for_user(&state.orm, user.user_id).await?;
    let cart = get_or_create_cart(&state.orm, customer.id).await?;

    let item = CartItems::find_by_id(item_id)
        .filter(CartItemCol::CartId.eq(cart.id))
        .one(&state.orm)
        .await?;
    let item = match item {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };

    let mut active: CartItemActive = item.into();
    active.quantity = Set(payload.quantity);
    active.updated_at = Set(Utc::now().into());
    let item = active.update(&state.orm).await?;

    Ok(ApiResponse::success("Updated", cart_item_from_entity(item), None))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_customer(user)?;
    let customer = account_service::customer_for_user(&state.orm, user.user_id).await?;
    let cart = get_or_create_cart(&state.orm, customer.id).await?;

    let result = CartItems::delete_many()
        .filter(CartItemCol::Id.eq(item_id))
        .filter(CartItemCol::CartId.eq(cart.id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "cart_item_id": item_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Every customer gets one cart, created the first time it is touched.
pub(crate) async fn get_or_create_cart(
    orm: &OrmConn,
    customer_id: Uuid,
) -> AppResult<CartModel> {
    let existing = Carts::find()
        .filter(CartCol::CustomerId.eq(customer_id))
        .one(orm)
        .await?;
    if let Some(cart) = existing {
        return Ok(cart);
    }

    let cart = CartActive {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(orm)
    .await?;
    Ok(cart)
}

fn cart_item_from_entity(model: CartItemModel) -> CartItem {
    CartItem {
        id: model.id,
        cart_id: model.cart_id,
        product_id: model.product_id,
        size_id: model.size_id,
        colour_id: model.colour_id,
        quantity: model.quantity,
        extra_price: model.extra_price,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
