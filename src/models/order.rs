use std::io::Write;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Order lifecycle state machine.
///
/// NotPlaced is the cart. Terminal states: IsCancelled, IsDelivered,
/// IsNotDelivered.
#[derive(
    FromSqlRow, AsExpression, PartialEq, Eq, Copy, Clone, Debug, Serialize, Deserialize, ToSchema,
)]
#[diesel(sql_type = crate::db::schema::sql_types::OrderStatus)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    NotPlaced,
    IsBeingFormed,
    IsBeingPrepared,
    IsBeingTransferred,
    HasBeenTransferred,
    IsCancelled,
    IsDelivered,
    IsNotDelivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::NotPlaced => "not_placed",
            OrderStatus::IsBeingFormed => "is_being_formed",
            OrderStatus::IsBeingPrepared => "is_being_prepared",
            OrderStatus::IsBeingTransferred => "is_being_transferred",
            OrderStatus::HasBeenTransferred => "has_been_transferred",
            OrderStatus::IsCancelled => "is_cancelled",
            OrderStatus::IsDelivered => "is_delivered",
            OrderStatus::IsNotDelivered => "is_not_delivered",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "not_placed" => Some(OrderStatus::NotPlaced),
            "is_being_formed" => Some(OrderStatus::IsBeingFormed),
            "is_being_prepared" => Some(OrderStatus::IsBeingPrepared),
            "is_being_transferred" => Some(OrderStatus::IsBeingTransferred),
            "has_been_transferred" => Some(OrderStatus::HasBeenTransferred),
            "is_cancelled" => Some(OrderStatus::IsCancelled),
            "is_delivered" => Some(OrderStatus::IsDelivered),
            "is_not_delivered" => Some(OrderStatus::IsNotDelivered),
            _ => None,
        }
    }

    /// Cancellation is only permitted while the order is still in the
    /// kitchen pipeline.
    pub fn cancellable(&self) -> bool {
        matches!(
            self,
            OrderStatus::IsBeingFormed
                | OrderStatus::IsBeingPrepared
                | OrderStatus::IsBeingTransferred
        )
    }
}

impl ToSql<crate::db::schema::sql_types::OrderStatus, Pg> for OrderStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<crate::db::schema::sql_types::OrderStatus, Pg> for OrderStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        std::str::from_utf8(bytes.as_bytes())
            .ok()
            .and_then(OrderStatus::parse)
            .ok_or_else(|| "Unrecognized enum variant".into())
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, ToSchema)]
#[diesel(table_name = crate::db::schema::orders)]
#[diesel(primary_key(order_id))]
pub struct Order {
    pub order_id: i32,
    pub client_id: i32,
    pub manager_id: Option<i32>,
    #[schema(value_type = String)]
    pub price: BigDecimal,
    pub weight: i32,
    pub address: String,
    pub status: OrderStatus,
    pub order_time: Option<DateTime<Utc>>,
    pub accepted_time: Option<DateTime<Utc>>,
    pub completion_time: Option<DateTime<Utc>>,
    pub cancellation_time: Option<DateTime<Utc>>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::orders)]
pub struct NewOrder {
    pub client_id: i32,
    pub price: BigDecimal,
    pub weight: i32,
    pub address: String,
    pub status: OrderStatus,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, ToSchema)]
#[diesel(table_name = crate::db::schema::order_lines)]
#[diesel(primary_key(line_id))]
pub struct OrderLine {
    pub line_id: i32,
    pub order_id: i32,
    pub pizza_id: i32,
    pub size_id: i32,
    pub quantity: i32,
    pub is_custom: bool,
    #[schema(value_type = String)]
    pub price: BigDecimal,
    pub weight: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::order_lines)]
pub struct NewOrderLine {
    pub order_id: i32,
    pub pizza_id: i32,
    pub size_id: i32,
    pub quantity: i32,
    pub is_custom: bool,
    pub price: BigDecimal,
    pub weight: i32,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, ToSchema)]
#[diesel(table_name = crate::db::schema::deliveries)]
#[diesel(primary_key(delivery_id))]
pub struct Delivery {
    pub delivery_id: i32,
    pub order_id: i32,
    pub courier_id: i32,
    pub acceptance_time: DateTime<Utc>,
    pub delivery_time: Option<DateTime<Utc>>,
    pub successful: Option<bool>,
    pub comment: Option<String>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::deliveries)]
pub struct NewDelivery {
    pub order_id: i32,
    pub courier_id: i32,
    pub acceptance_time: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, ToSchema)]
#[diesel(table_name = crate::db::schema::reviews)]
#[diesel(primary_key(review_id))]
pub struct Review {
    pub review_id: i32,
    pub order_id: i32,
    pub client_id: i32,
    pub rating: i16,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::reviews)]
pub struct NewReview {
    pub order_id: i32,
    pub client_id: i32,
    pub rating: i16,
    pub content: String,
}
