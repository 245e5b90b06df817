use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One cart line with names resolved for display. `price` and `weight` are
/// per-unit; `total_price`/`total_weight` are scaled by quantity.
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct CartLineView {
    pub line_id: i32,
    pub pizza_id: i32,
    pub pizza_name: String,
    pub size_id: i32,
    pub size_name: String,
    pub quantity: i32,
    pub is_custom: bool,
    #[schema(value_type = String)]
    pub price: BigDecimal,
    pub weight: i32,
    #[schema(value_type = String)]
    pub total_price: BigDecimal,
    pub total_weight: i32,
    pub added_ingredient_ids: Vec<i32>,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct CartView {
    pub order_id: i32,
    #[schema(value_type = String)]
    pub price: BigDecimal,
    pub weight: i32,
    pub lines: Vec<CartLineView>,
}

#[derive(Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub pizza_id: i32,
    pub size_id: i32,
    #[serde(default)]
    pub ingredient_ids: Vec<i32>,
    pub quantity: i32,
}

/// Body-addressed: `PUT /api/carts` names the line it replaces.
#[derive(Deserialize, ToSchema)]
pub struct UpdateCartRequest {
    pub line_id: i32,
    pub pizza_id: i32,
    pub size_id: i32,
    #[serde(default)]
    pub ingredient_ids: Vec<i32>,
    pub quantity: i32,
}

#[derive(Deserialize, ToSchema)]
pub struct SubmitCartRequest {
    #[schema(value_type = String)]
    pub expected_price: BigDecimal,
    pub address: String,
}

#[derive(Serialize, ToSchema)]
pub struct CartResponse {
    pub status: String,
    pub data: Option<CartView>,
    pub error: Option<String>,
}

/// Submission failures carry the current server-side cart so a stale client
/// can reconcile.
#[derive(Serialize, ToSchema)]
pub struct SubmitCartResponse {
    pub status: String,
    pub data: Option<crate::models::order::Order>,
    pub cart: Option<CartView>,
    pub error: Option<String>,
}
