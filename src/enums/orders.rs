use serde::Serialize;
use utoipa::ToSchema;

use crate::enums::carts::CartLineView;
use crate::models::order::Order;

#[derive(Serialize, Debug, ToSchema)]
pub struct OrderContainer {
    pub order: Order,
    pub lines: Vec<CartLineView>,
}

#[derive(Serialize, ToSchema)]
pub struct OrdersResponse {
    pub status: String,
    pub data: Vec<Order>,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct OrderResponse {
    pub status: String,
    pub data: Option<OrderContainer>,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct OrderActionResponse {
    pub status: String,
    pub data: Option<Order>,
    pub error: Option<String>,
}
