use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Category, Colour, Country, Size};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSizeRequest {
    pub title: String,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct SizeList {
    #[schema(value_type = Vec<Size>)]
    pub items: Vec<Size>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateColourRequest {
    pub name: String,
    pub hex_code: String,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ColourList {
    #[schema(value_type = Vec<Colour>)]
    pub items: Vec<Colour>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCountryRequest {
    pub name: String,
    pub code: String,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CountryList {
    #[schema(value_type = Vec<Country>)]
    pub items: Vec<Country>,
}
