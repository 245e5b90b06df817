use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error;
use diesel::PgConnection;
use log::{debug, error};

use crate::db::carts::CartOperations;
use crate::db::{DbConnection, RepositoryError};
use crate::enums::orders::OrderContainer;
use crate::models::order::{Order, OrderStatus};

#[derive(Clone)]
pub struct OrderOperations {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl OrderOperations {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    pub fn get_order(&self, order_id_val: i32) -> Result<OrderContainer, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "get_order: failed to acquire DB connection for order {}: {}",
                order_id_val, e
            );
            e
        })?;

        let order = Self::load_order(conn.connection(), order_id_val)?;
        let view = CartOperations::load_cart_view(conn.connection(), order_id_val)?;
        Ok(OrderContainer {
            order,
            lines: view.lines,
        })
    }

    /// Orders the client has placed. The cart itself is not listed here.
    pub fn get_orders_by_client(
        &self,
        client_id_val: i32,
        last_id: Option<i32>,
        limit: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::orders::dsl::*;
        let mut query = orders
            .filter(client_id.eq(client_id_val))
            .filter(status.ne(OrderStatus::NotPlaced))
            .order_by(order_id.desc())
            .limit(limit)
            .into_boxed();
        if let Some(cursor) = last_id {
            query = query.filter(order_id.lt(cursor));
        }
        query.load::<Order>(conn.connection()).map_err(|e| {
            error!(
                "get_orders_by_client: error loading orders for client {}: {}",
                client_id_val, e
            );
            RepositoryError::DatabaseError(e)
        })
    }

    /// All placed orders, for the manager dashboard.
    pub fn get_placed_orders(
        &self,
        last_id: Option<i32>,
        limit: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::orders::dsl::*;
        let mut query = orders
            .filter(status.ne(OrderStatus::NotPlaced))
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

    /// Orders a courier has picked up, in any of the post-pickup states.
    pub fn get_orders_by_courier(
        &self,
        courier_id_val: i32,
        last_id: Option<i32>,
        limit: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::{deliveries, orders};
        let mut query = orders::table
            .inner_join(deliveries::table.on(deliveries::order_id.eq(orders::order_id)))
            .filter(deliveries::courier_id.eq(courier_id_val))
            .filter(orders::status.eq_any(vec![
                OrderStatus::HasBeenTransferred,
                OrderStatus::IsDelivered,
                OrderStatus::IsNotDelivered,
            ]))
            .select(Order::as_select())
            .order_by(orders::order_id.desc())
            .limit(limit)
            .into_boxed();
        if let Some(cursor) = last_id {
            query = query.filter(orders::order_id.lt(cursor));
        }
        query.load::<Order>(conn.connection()).map_err(|e| {
            error!(
                "get_orders_by_courier: error loading orders for courier {}: {}",
                courier_id_val, e
            );
            RepositoryError::DatabaseError(e)
        })
    }

    /// Manager takes a formed order into preparation.
    pub fn accept_order(
        &self,
        order_id_val: i32,
        manager_id_val: i32,
    ) -> Result<Order, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "accept_order: failed to acquire DB connection for order {}: {}",
                order_id_val, e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            let order = Self::lock_order(conn, order_id_val)?;
            if order.status != OrderStatus::IsBeingFormed {
                return Err(RepositoryError::InvalidState(format!(
                    "Order {} cannot be accepted in status {}",
                    order_id_val,
                    order.status.as_str()
                )));
            }

            use crate::db::schema::orders::dsl::*;
            diesel::update(orders.find(order_id_val))
                .set((
                    manager_id.eq(Some(manager_id_val)),
                    status.eq(OrderStatus::IsBeingPrepared),
                    accepted_time.eq(Some(Utc::now())),
                ))
                .get_result::<Order>(conn)
                .map_err(RepositoryError::DatabaseError)
        })
    }

    /// Kitchen done; order is ready for courier pickup.
    pub fn transfer_to_delivery(&self, order_id_val: i32) -> Result<Order, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "transfer_to_delivery: failed to acquire DB connection for order {}: {}",
                order_id_val, e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            let order = Self::lock_order(conn, order_id_val)?;
            if order.status != OrderStatus::IsBeingPrepared {
                return Err(RepositoryError::InvalidState(format!(
                    "Order {} cannot be transferred in status {}",
                    order_id_val,
                    order.status.as_str()
                )));
            }

            use crate::db::schema::orders::dsl::*;
            diesel::update(orders.find(order_id_val))
                .set((
                    status.eq(OrderStatus::IsBeingTransferred),
                    completion_time.eq(Some(Utc::now())),
                ))
                .get_result::<Order>(conn)
                .map_err(RepositoryError::DatabaseError)
        })
    }

    /// Cancel a placed order. When `owner_id` is given the order must belong
    /// to that client.
    pub fn cancel_order(
        &self,
        order_id_val: i32,
        owner_id: Option<i32>,
    ) -> Result<Order, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "cancel_order: failed to acquire DB connection for order {}: {}",
                order_id_val, e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            let order = Self::lock_order(conn, order_id_val)?;
            if let Some(owner) = owner_id {
                if order.client_id != owner {
                    return Err(RepositoryError::NotFound(format!(
                        "Order {order_id_val} not found"
                    )));
                }
            }
            if !order.status.cancellable() {
                return Err(RepositoryError::InvalidState(format!(
                    "Order {} cannot be cancelled in status {}",
                    order_id_val,
                    order.status.as_str()
                )));
            }

            use crate::db::schema::orders::dsl::*;
            let cancelled = diesel::update(orders.find(order_id_val))
                .set((
                    status.eq(OrderStatus::IsCancelled),
                    cancellation_time.eq(Some(Utc::now())),
                ))
                .get_result::<Order>(conn)
                .map_err(RepositoryError::DatabaseError)?;

            debug!("cancel_order: order {} cancelled", order_id_val);
            Ok(cancelled)
        })
    }

    fn load_order(conn: &mut PgConnection, order_id_val: i32) -> Result<Order, RepositoryError> {
        use crate::db::schema::orders::dsl::*;
        orders
            .find(order_id_val)
            .first::<Order>(conn)
            .map_err(|e| match e {
                Error::NotFound => {
                    RepositoryError::NotFound(format!("Order {order_id_val} not found"))
                }
                other => RepositoryError::DatabaseError(other),
            })
    }

    /// Row-locked read for status transitions. Must run in a transaction.
    pub(crate) fn lock_order(
        conn: &mut PgConnection,
        order_id_val: i32,
    ) -> Result<Order, RepositoryError> {
        use crate::db::schema::orders::dsl::*;
        orders
            .find(order_id_val)
            .for_update()
            .first::<Order>(conn)
            .map_err(|e| match e {
                Error::NotFound => {
                    RepositoryError::NotFound(format!("Order {order_id_val} not found"))
                }
                other => RepositoryError::DatabaseError(other),
            })
    }
}
