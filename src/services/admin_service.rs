use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{OrderList, OrderWithItems},
    dto::products::ProductList,
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, Product},
    response::{ApiResponse, Meta},
    routes::admin::{LowStockQuery, UpdateShippingStatusRequest},
    routes::params::{OrderListQuery, SortOrder},
    services::{order_service, product_service},
    state::AppState,
};

/// Shipping states an operator may set.
const SHIPPING_STATUSES: &[&str] = &["pending", "processing", "shipped", "delivered"];

/// Matches the storefront's low-inventory cutoff.
const LOW_STOCK_DEFAULT: i32 = 20;

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::ShippingStatus.eq(status.clone()));
    }

    let mut finder = Orders::find().filter(condition);

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::PlacedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::PlacedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_service::order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(order_service::order_from_entity);
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_service::order_item_from_entity)
        .collect();

    let data = OrderWithItems { order, items };
    Ok(ApiResponse::success("Order found", data, Some(Meta::empty())))
}

pub async fn update_shipping_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateShippingStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    if !SHIPPING_STATUSES.contains(&payload.status.as_str()) {
        return Err(AppError::BadRequest(format!(
            "status must be one of {:?}",
            SHIPPING_STATUSES
        )));
    }

    let existing = Orders::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let mut active: OrderActive = existing.into();
    active.shipping_status = Set(payload.status);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_shipping_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.shipping_status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        order_service::order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub async fn list_low_stock(
    state: &AppState,
    user: &AuthUser,
    query: LowStockQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    let threshold = query.threshold.unwrap_or(LOW_STOCK_DEFAULT);
    let (page, limit, offset) = query.pagination.normalize();

    let mut finder = Products::find().filter(ProdCol::Inventory.lt(threshold));
    finder = finder
        .order_by_asc(ProdCol::Inventory)
        .order_by_desc(ProdCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_service::product_from_entity)
        .collect();

    let data = ProductList { items };
    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Low stock", data, Some(meta)))
}

/// Zero out a product's stock, removing it from the storefront listing.
pub async fn clear_inventory(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    let result = Products::update_many()
        .col_expr(ProdCol::Inventory, Expr::value(0))
        .col_expr(ProdCol::UpdatedAt, Expr::value(Utc::now()))
        .filter(ProdCol::Id.eq(id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    let product = Products::find_by_id(id).one(&state.orm).await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "inventory_clear",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Inventory cleared",
        product_service::product_from_entity(product),
        Some(Meta::empty()),
    ))
}
