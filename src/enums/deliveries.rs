use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::order::{Delivery, Order};

#[derive(Deserialize, ToSchema)]
pub struct CompleteDeliveryRequest {
    /// Resolved against the order status names; `is_delivered` marks the
    /// delivery successful, anything else records a failed delivery.
    pub status: String,
    pub comment: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DeliveriesResponse {
    pub status: String,
    pub data: Vec<Delivery>,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DeliveryResponse {
    pub status: String,
    pub data: Option<Delivery>,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AvailableOrdersResponse {
    pub status: String,
    pub data: Vec<Order>,
    pub error: Option<String>,
}
