use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error;
use diesel::PgConnection;
use log::error;

use crate::db::{DbConnection, RepositoryError};
use crate::models::order::{NewReview, Order, OrderStatus, Review};

#[derive(Clone)]
pub struct ReviewOperations {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl ReviewOperations {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    /// A client may review an order they placed. The cart cannot be
    /// reviewed; any placed order can, so feedback about a cancelled or
    /// failed delivery is also allowed.
    pub fn create_review(
        &self,
        client_id_val: i32,
        order_id_val: i32,
        rating_val: i16,
        content_val: String,
    ) -> Result<Review, RepositoryError> {
        if !(1..=5).contains(&rating_val) {
            return Err(RepositoryError::ValidationError(format!(
                "Rating must be between 1 and 5, got {rating_val}"
            )));
        }

        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "create_review: failed to acquire DB connection for order {}: {}",
                order_id_val, e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            let order: Order;
            {
                use crate::db::schema::orders::dsl::*;
                order = orders
                    .find(order_id_val)
                    .first::<Order>(conn)
                    .map_err(|e| match e {
                        Error::NotFound => {
                            RepositoryError::NotFound(format!("Order {order_id_val} not found"))
                        }
                        other => RepositoryError::DatabaseError(other),
                    })?;
            }
            if order.client_id != client_id_val {
                return Err(RepositoryError::NotFound(format!(
                    "Order {order_id_val} not found"
                )));
            }
            if order.status == OrderStatus::NotPlaced {
                return Err(RepositoryError::ValidationError(
                    "Cannot review an order that has not been placed".to_string(),
                ));
            }

            use crate::db::schema::reviews::dsl::*;
            diesel::insert_into(reviews)
                .values(&NewReview {
                    order_id: order_id_val,
                    client_id: client_id_val,
                    rating: rating_val,
                    content: content_val,
                })
                .get_result::<Review>(conn)
                .map_err(|e| {
                    error!(
                        "create_review: error inserting review for order {}: {}",
                        order_id_val, e
                    );
                    RepositoryError::DatabaseError(e)
                })
        })
    }

    pub fn update_review(
        &self,
        review_id_val: i32,
        client_id_val: i32,
        rating_val: Option<i16>,
        content_val: Option<String>,
    ) -> Result<Review, RepositoryError> {
        if let Some(r) = rating_val {
            if !(1..=5).contains(&r) {
                return Err(RepositoryError::ValidationError(format!(
                    "Rating must be between 1 and 5, got {r}"
                )));
            }
        }

        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "update_review: failed to acquire DB connection for review {}: {}",
                review_id_val, e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            let existing = Self::load_owned_review(conn, review_id_val, client_id_val)?;

            use crate::db::schema::reviews::dsl::*;
            diesel::update(reviews.find(existing.review_id))
                .set((
                    rating.eq(rating_val.unwrap_or(existing.rating)),
                    content.eq(content_val.unwrap_or(existing.content)),
                ))
                .get_result::<Review>(conn)
                .map_err(RepositoryError::DatabaseError)
        })
    }

    pub fn delete_review(
        &self,
        review_id_val: i32,
        client_id_val: i32,
    ) -> Result<(), RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "delete_review: failed to acquire DB connection for review {}: {}",
                review_id_val, e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            let existing = Self::load_owned_review(conn, review_id_val, client_id_val)?;

            use crate::db::schema::reviews::dsl::*;
            diesel::delete(reviews.find(existing.review_id))
                .execute(conn)
                .map_err(RepositoryError::DatabaseError)?;
            Ok(())
        })
    }

    pub fn get_reviews(
        &self,
        order_id_filter: Option<i32>,
        last_id: Option<i32>,
        limit: i64,
    ) -> Result<Vec<Review>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::reviews::dsl::*;
        let mut query = reviews.order_by(review_id.desc()).limit(limit).into_boxed();
        if let Some(order) = order_id_filter {
            query = query.filter(order_id.eq(order));
        }
        if let Some(cursor) = last_id {
            query = query.filter(review_id.lt(cursor));
        }
        query
            .load::<Review>(conn.connection())
            .map_err(RepositoryError::DatabaseError)
    }

    /// Ownership is folded into NotFound so other clients cannot probe for
    /// review ids.
    fn load_owned_review(
        conn: &mut PgConnection,
        review_id_val: i32,
        client_id_val: i32,
    ) -> Result<Review, RepositoryError> {
        use crate::db::schema::reviews::dsl::*;
        let review = reviews
            .find(review_id_val)
            .first::<Review>(conn)
            .map_err(|e| match e {
                Error::NotFound => {
                    RepositoryError::NotFound(format!("Review {review_id_val} not found"))
                }
                other => RepositoryError::DatabaseError(other),
            })?;
        if review.client_id != client_id_val {
            return Err(RepositoryError::NotFound(format!(
                "Review {review_id_val} not found"
            )));
        }
        Ok(review)
    }
}
