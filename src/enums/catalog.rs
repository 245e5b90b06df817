use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::catalog::{Ingredient, Pizza, PizzaSize};

#[derive(Serialize, Debug, ToSchema)]
pub struct PizzaContainer {
    pub pizza: Pizza,
    pub ingredients: Vec<Ingredient>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreatePizzaRequest {
    pub pizza: crate::models::catalog::NewPizza,
    #[serde(default)]
    pub ingredient_ids: Vec<i32>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePizzaRequest {
    pub pizza: crate::models::catalog::UpdatePizza,
    pub ingredient_ids: Option<Vec<i32>>,
}

#[derive(Deserialize, IntoParams, Default)]
pub struct CatalogQuery {
    pub last_id: Option<i32>,
    pub page_size: Option<i64>,
    #[serde(default)]
    pub include_deleted: bool,
}

impl CatalogQuery {
    pub fn limit(&self) -> i64 {
        self.page_size.unwrap_or(20).clamp(1, 100)
    }
}

#[derive(Serialize, ToSchema)]
pub struct PizzasResponse {
    pub status: String,
    pub data: Vec<PizzaContainer>,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PizzaResponse {
    pub status: String,
    pub data: Option<PizzaContainer>,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct IngredientsResponse {
    pub status: String,
    pub data: Vec<Ingredient>,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct IngredientResponse {
    pub status: String,
    pub data: Option<Ingredient>,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SizesResponse {
    pub status: String,
    pub data: Vec<PizzaSize>,
    pub error: Option<String>,
}
