use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::order::Review;

#[derive(Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub order_id: i32,
    pub rating: i16,
    pub content: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateReviewRequest {
    pub rating: Option<i16>,
    pub content: Option<String>,
}

#[derive(Deserialize, IntoParams, Default)]
pub struct ReviewQuery {
    pub last_id: Option<i32>,
    pub page_size: Option<i64>,
    pub order_id: Option<i32>,
}

impl ReviewQuery {
    pub fn limit(&self) -> i64 {
        self.page_size.unwrap_or(20).clamp(1, 100)
    }
}

#[derive(Serialize, ToSchema)]
pub struct ReviewsResponse {
    pub status: String,
    pub data: Vec<Review>,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ReviewResponse {
    pub status: String,
    pub data: Option<Review>,
    pub error: Option<String>,
}
