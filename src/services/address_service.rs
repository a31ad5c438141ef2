use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    dto::addresses::{AddressList, CreateAddressRequest},
    entity::{
        addresses::{
            ActiveModel as AddressActive, Column as AddressCol, Entity as Addresses,
            Model as AddressModel,
        },
        countries::Entity as Countries,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_customer},
    models::Address,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::account_service,
    state::AppState,
};

pub async fn list_addresses(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<AddressList>> {
    ensure_customer(user)?;
    let customer = account_service::customer_for_user(&state.orm, user.user_id).await?;

    let (page, limit, offset) = pagination.normalize();
    let finder = Addresses::find()
        .filter(AddressCol::CustomerId.eq(customer.id))
        .order_by_desc(AddressCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(address_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Addresses",
        AddressList { items },
        Some(meta),
    ))
}

pub async fn create_address(
    state: &AppState,
    user: &AuthUser,
    payload: CreateAddressRequest,
) -> AppResult<ApiResponse<Address>> {
    ensure_customer(user)?;
    let customer = account_service::customer_for_user(&state.orm, user.user_id).await?;

    if payload.street_address.trim().is_empty() || payload.city.trim().is_empty() {
        return Err(AppError::BadRequest(
            "street_address and city are required".into(),
        ));
    }

    if let Some(country_id) = payload.country_id {
        let country = Countries::find_by_id(country_id).one(&state.orm).await?;
        if country.is_none() {
            return Err(AppError::BadRequest("country not found".into()));
        }
    }

    let active = AddressActive {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer.id),
        country_id: Set(payload.country_id),
        first_name: Set(payload.first_name),
        last_name: Set(payload.last_name),
        street_address: Set(payload.street_address),
        second_street_address: Set(payload.second_street_address),
        city: Set(payload.city),
        state: Set(payload.state),
        zip_code: Set(payload.zip_code),
        phone_number: Set(payload.phone_number),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let address = active.insert(&state.orm).await?;

    Ok(ApiResponse::success(
        "Address created",
        address_from_entity(address),
        Some(Meta::empty()),
    ))
}

pub async fn delete_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_customer(user)?;
    let customer = account_service::customer_for_user(&state.orm, user.user_id).await?;

    let result = Addresses::delete_many()
        .filter(AddressCol::Id.eq(id))
        .filter(AddressCol::CustomerId.eq(customer.id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn address_from_entity(model: AddressModel) -> Address {
    Address {
        id: model.id,
        customer_id: model.customer_id,
        country_id: model.country_id,
        first_name: model.first_name,
        last_name: model.last_name,
        street_address: model.street_address,
        second_street_address: model.second_street_address,
        city: model.city,
        state: model.state,
        zip_code: model.zip_code,
        phone_number: model.phone_number,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
