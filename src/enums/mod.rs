pub mod account;
pub mod carts;
pub mod catalog;
pub mod deliveries;
pub mod orders;
pub mod reviews;

use serde::Deserialize;
use utoipa::IntoParams;

/// Keyset pagination: pass the smallest id from the previous page as
/// `last_id` to fetch the next one. Listings are ordered by id descending.
#[derive(Deserialize, IntoParams, Default)]
pub struct PageQuery {
    pub last_id: Option<i32>,
    pub page_size: Option<i64>,
}

impl PageQuery {
    pub fn limit(&self) -> i64 {
        self.page_size.unwrap_or(20).clamp(1, 100)
    }
}
