use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Address;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAddressRequest {
    pub country_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub street_address: String,
    pub second_street_address: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone_number: String,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct AddressList {
    #[schema(value_type = Vec<Address>)]
    pub items: Vec<Address>,
}
