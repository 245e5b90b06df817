use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error};
use diesel::PgConnection;
use log::{debug, error};

use crate::db::orders::OrderOperations;
use crate::db::{DbConnection, RepositoryError};
use crate::models::order::{Delivery, NewDelivery, Order, OrderStatus};

#[derive(Clone)]
pub struct DeliveryOperations {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl DeliveryOperations {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    /// Courier claims an order that is ready for pickup. Creates the
    /// delivery record and moves the order to HasBeenTransferred.
    pub fn take_order(
        &self,
        order_id_val: i32,
        courier_id_val: i32,
    ) -> Result<Delivery, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "take_order: failed to acquire DB connection for order {}: {}",
                order_id_val, e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            let order = OrderOperations::lock_order(conn, order_id_val)?;
            if order.status != OrderStatus::IsBeingTransferred {
                return Err(RepositoryError::InvalidState(format!(
                    "Order {} cannot be taken in status {}",
                    order_id_val,
                    order.status.as_str()
                )));
            }

            {
                use crate::db::schema::orders::dsl::*;
                diesel::update(orders.find(order_id_val))
                    .set(status.eq(OrderStatus::HasBeenTransferred))
                    .execute(conn)
                    .map_err(RepositoryError::DatabaseError)?;
            }

            use crate::db::schema::deliveries::dsl::*;
            let delivery = diesel::insert_into(deliveries)
                .values(&NewDelivery {
                    order_id: order_id_val,
                    courier_id: courier_id_val,
                    acceptance_time: Utc::now(),
                })
                .get_result::<Delivery>(conn)
                .map_err(|e| match e {
                    Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        RepositoryError::InvalidState(format!(
                            "Order {order_id_val} already has a delivery"
                        ))
                    }
                    other => RepositoryError::DatabaseError(other),
                })?;

            debug!(
                "take_order: courier {} took order {} as delivery {}",
                courier_id_val, order_id_val, delivery.delivery_id
            );
            Ok(delivery)
        })
    }

    /// Close out a delivery. `status_name` is matched against the order
    /// status names; `is_delivered` records success, anything else records a
    /// failed delivery with the courier's comment.
    pub fn complete_delivery(
        &self,
        order_id_val: i32,
        status_name: &str,
        comment_val: Option<&str>,
    ) -> Result<Delivery, RepositoryError> {
        let resolved = OrderStatus::parse(status_name).ok_or_else(|| {
            RepositoryError::ValidationError(format!("Unknown delivery status '{status_name}'"))
        })?;

        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "complete_delivery: failed to acquire DB connection for order {}: {}",
                order_id_val, e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            let delivery: Delivery;
            {
                use crate::db::schema::deliveries::dsl::*;
                delivery = deliveries
                    .filter(order_id.eq(order_id_val))
                    .for_update()
                    .first::<Delivery>(conn)
                    .map_err(|e| match e {
                        Error::NotFound => RepositoryError::NotFound(format!(
                            "No delivery found for order {order_id_val}"
                        )),
                        other => RepositoryError::DatabaseError(other),
                    })?;
            }

            if delivery.successful.is_some() {
                return Err(RepositoryError::InvalidState(format!(
                    "Delivery for order {order_id_val} is already completed"
                )));
            }

            let succeeded = resolved == OrderStatus::IsDelivered;
            let final_status = if succeeded {
                OrderStatus::IsDelivered
            } else {
                OrderStatus::IsNotDelivered
            };

            let updated: Delivery;
            {
                use crate::db::schema::deliveries::dsl::*;
                updated = diesel::update(deliveries.find(delivery.delivery_id))
                    .set((
                        delivery_time.eq(Some(Utc::now())),
                        successful.eq(Some(succeeded)),
                        comment.eq(comment_val),
                    ))
                    .get_result::<Delivery>(conn)
                    .map_err(RepositoryError::DatabaseError)?;
            }

            {
                use crate::db::schema::orders::dsl::*;
                diesel::update(orders.find(order_id_val))
                    .set(status.eq(final_status))
                    .execute(conn)
                    .map_err(RepositoryError::DatabaseError)?;
            }

            debug!(
                "complete_delivery: order {} closed as {}",
                order_id_val,
                final_status.as_str()
            );
            Ok(updated)
        })
    }

    pub fn get_deliveries_by_courier(
        &self,
        courier_id_val: i32,
        last_id: Option<i32>,
        limit: i64,
    ) -> Result<Vec<Delivery>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::deliveries::dsl::*;
        let mut query = deliveries
            .filter(courier_id.eq(courier_id_val))
            .order_by(delivery_id.desc())
            .limit(limit)
            .into_boxed();
        if let Some(cursor) = last_id {
            query = query.filter(delivery_id.lt(cursor));
        }
        query.load::<Delivery>(conn.connection()).map_err(|e| {
            error!(
                "get_deliveries_by_courier: error loading deliveries for courier {}: {}",
                courier_id_val, e
            );
            RepositoryError::DatabaseError(e)
        })
    }

    /// Orders waiting for a courier.
    pub fn get_available_orders(
        &self,
        last_id: Option<i32>,
        limit: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::orders::dsl::*;
        let mut query = orders
            .filter(status.eq(OrderStatus::IsBeingTransferred))
            .order_by(order_id.desc())
            .limit(limit)
            .into_boxed();
        if let Some(cursor) = last_id {
            query = query.filter(order_id.lt(cursor));
        }
        query
            .load::<Order>(conn.connection())
            .map_err(RepositoryError::DatabaseError)
    }
}
