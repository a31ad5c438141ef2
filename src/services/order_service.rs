use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{CheckoutRequest, OrderList, OrderWithItems, PayOrderRequest},
    entity::{
        addresses::{Column as AddressCol, Entity as Addresses},
        cart_items::{Column as CartItemCol, Entity as CartItems},
        colours::Entity as Colours,
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        products::{Column as ProdCol, Entity as Products},
        sizes::Entity as Sizes,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_customer},
    models::{Order, OrderItem},
    pricing,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{account_service, cart_service},
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_customer(user)?;
    let customer = account_service::customer_for_user(&state.orm, user.user_id).await?;

    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(OrderCol::CustomerId.eq(customer.id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::ShippingStatus.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
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
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// Turn the customer's cart into an order: price every line, snapshot the
/// variant choices, take stock, and empty the cart — all in one transaction.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_customer(user)?;
    let customer = account_service::customer_for_user(&state.orm, user.user_id).await?;
    let cart = cart_service::get_or_create_cart(&state.orm, customer.id).await?;

    if let Some(address_id) = payload.address_id {
        let address = Addresses::find_by_id(address_id)
            .filter(AddressCol::CustomerId.eq(customer.id))
            .one(&state.orm)
            .await?;
        if address.is_none() {
            return Err(AppError::BadRequest("address not found".into()));
        }
    }

    let txn = state.orm.begin().await?;

    let cart_rows = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .all(&txn)
        .await?;

    if cart_rows.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let mut total_price = Decimal::ZERO;
    let mut lines = Vec::with_capacity(cart_rows.len());
    for row in &cart_rows {
        if row.quantity <= 0 {
            return Err(AppError::BadRequest("Cart has invalid quantity".into()));
        }

        let product = Products::find_by_id(row.product_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        let product = match product {
            Some(p) => p,
            None => return Err(AppError::BadRequest("product no longer exists".into())),
        };

        if product.inventory < row.quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for product {}",
                product.id
            )));
        }

        let size = match row.size_id {
            Some(size_id) => Sizes::find_by_id(size_id).one(&txn).await?.map(|s| s.title),
            None => None,
        };
        let colour = match row.colour_id {
            Some(colour_id) => Colours::find_by_id(colour_id)
                .one(&txn)
                .await?
                .map(|c| c.name),
            None => None,
        };

        total_price += pricing::line_total(
            product.price,
            product.percentage_off,
            product.shipping_fee,
            row.extra_price,
            row.quantity,
        );

        let unit_price = pricing::effective_unit_price(product.price, product.percentage_off);
        lines.push((row, product, unit_price, size, colour));
    }

    let order_id = Uuid::new_v4();
    let transaction_ref = match payload.transaction_ref {
        Some(txn_ref) if !txn_ref.trim().is_empty() => txn_ref.trim().to_string(),
        _ => build_transaction_ref(order_id),
    };

    let order = OrderActive {
        id: Set(order_id),
        customer_id: Set(customer.id),
        transaction_ref: Set(transaction_ref),
        placed_at: Set(Utc::now().into()),
        total_price: Set(total_price),
        address_id: Set(payload.address_id),
        payment_status: Set("pending".into()),
        shipping_status: Set("pending".into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::new();
    for (row, product, unit_price, size, colour) in lines {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            customer_id: Set(customer.id),
            product_id: Set(product.id),
            quantity: Set(row.quantity),
            unit_price: Set(unit_price),
            size: Set(size),
            colour: Set(colour),
            ordered: Set(true),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;

        order_items.push(order_item_from_entity(item));

        Products::update_many()
            .col_expr(ProdCol::Inventory, Expr::col(ProdCol::Inventory).sub(row.quantity))
            .filter(ProdCol::Id.eq(product.id))
            .exec(&txn)
            .await?;
    }

    CartItems::delete_many()
        .filter(CartItemCol::CartId.eq(cart.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Checkout success",
        OrderWithItems {
            order: order_from_entity(order),
            items: order_items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn pay_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: PayOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_customer(user)?;
    let customer = account_service::customer_for_user(&state.orm, user.user_id).await?;

    let txn = state.orm.begin().await?;

    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::CustomerId.eq(customer.id))
                .add(OrderCol::Id.eq(id)),
        )
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if order.payment_status == "paid" {
        return Err(AppError::BadRequest("Order already paid".into()));
    }
    if order.transaction_ref != payload.transaction_ref {
        return Err(AppError::BadRequest("Transaction reference mismatch".into()));
    }

    let mut active: OrderActive = order.into();
    active.payment_status = Set("paid".into());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&txn)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_paid",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Payment recorded",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_customer(user)?;
    let customer = account_service::customer_for_user(&state.orm, user.user_id).await?;

    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::CustomerId.eq(customer.id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        customer_id: model.customer_id,
        transaction_ref: model.transaction_ref,
        placed_at: model.placed_at.with_timezone(&Utc),
        total_price: model.total_price,
        address_id: model.address_id,
        payment_status: model.payment_status,
        shipping_status: model.shipping_status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
        unit_price: model.unit_price,
        size: model.size,
        colour: model.colour,
        ordered: model.ordered,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn build_transaction_ref(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.to_string();
    let short = &suffix[..8];
    format!("TXN-{}-{}", date, short)
}
