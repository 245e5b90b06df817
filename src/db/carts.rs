use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error;
use diesel::PgConnection;
use log::{debug, error};
use std::collections::HashMap;

use crate::db::{DbConnection, RepositoryError};
use crate::enums::carts::{CartLineView, CartView};
use crate::models::catalog::{Ingredient, ItemState, Pizza, PizzaSize};
use crate::models::order::{NewOrder, NewOrderLine, Order, OrderLine, OrderStatus};
use crate::pricing;

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::order_line_ingredients)]
struct LineIngredientInsert {
    line_id: i32,
    ingredient_id: i32,
}

/// Unit price/weight for one line plus the custom flag, computed from the
/// current catalog.
struct LinePricing {
    unit_price: BigDecimal,
    unit_weight: i32,
    is_custom: bool,
}

#[derive(Clone)]
pub struct CartOperations {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl CartOperations {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    /// Fetch the client's cart (the NotPlaced order), creating an empty one
    /// on first use.
    pub fn get_or_create_cart(&self, client_id_val: i32) -> Result<CartView, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("get_or_create_cart: failed to acquire DB connection: {}", e);
            e
        })?;

        if let Some(order) = Self::find_cart_order(conn.connection(), client_id_val)? {
            return Self::load_cart_view(conn.connection(), order.order_id);
        }

        {
            use crate::db::schema::orders::dsl::*;
            diesel::insert_into(orders)
                .values(&NewOrder {
                    client_id: client_id_val,
                    price: BigDecimal::from(0),
                    weight: 0,
                    address: String::new(),
                    status: OrderStatus::NotPlaced,
                })
                .execute(conn.connection())
                .map_err(|e| {
                    error!(
                        "get_or_create_cart: error creating cart for client {}: {}",
                        client_id_val, e
                    );
                    RepositoryError::DatabaseError(e)
                })?;
        }

        // Re-fetch; a miss after a successful insert is a storage
        // consistency failure.
        let order = Self::find_cart_order(conn.connection(), client_id_val)?.ok_or_else(|| {
            RepositoryError::NotFound(format!(
                "Cart missing after creation for client {client_id_val}"
            ))
        })?;
        Self::load_cart_view(conn.connection(), order.order_id)
    }

    pub fn add_item(
        &self,
        client_id_val: i32,
        pizza_id_val: i32,
        size_id_val: i32,
        ingredient_ids: &[i32],
        quantity_val: i32,
    ) -> Result<CartView, RepositoryError> {
        if quantity_val <= 0 {
            return Err(RepositoryError::ValidationError(format!(
                "Quantity must be positive, got {quantity_val}"
            )));
        }

        let cart = self.get_or_create_cart(client_id_val)?;

        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("add_item: failed to acquire DB connection: {}", e);
            e
        })?;

        conn.connection().transaction(|conn| {
            let pricing = Self::price_line(conn, pizza_id_val, size_id_val, ingredient_ids)?;

            let new_line_id: i32;
            {
                use crate::db::schema::order_lines::dsl::*;
                new_line_id = diesel::insert_into(order_lines)
                    .values(&NewOrderLine {
                        order_id: cart.order_id,
                        pizza_id: pizza_id_val,
                        size_id: size_id_val,
                        quantity: quantity_val,
                        is_custom: pricing.is_custom,
                        price: pricing.unit_price.clone(),
                        weight: pricing.unit_weight,
                    })
                    .returning(line_id)
                    .get_result::<i32>(conn)
                    .map_err(RepositoryError::DatabaseError)?;
            }

            Self::insert_line_ingredients(conn, new_line_id, ingredient_ids)?;

            let price_delta = &pricing.unit_price * BigDecimal::from(quantity_val);
            let weight_delta = pricing.unit_weight * quantity_val;
            Self::shift_order_totals(conn, cart.order_id, &price_delta, weight_delta)?;

            debug!(
                "add_item: line {} added to cart {} for client {}",
                new_line_id, cart.order_id, client_id_val
            );

            Self::load_cart_view(conn, cart.order_id)
        })
    }

    pub fn update_item(
        &self,
        client_id_val: i32,
        line_id_val: i32,
        pizza_id_val: i32,
        size_id_val: i32,
        ingredient_ids: &[i32],
        quantity_val: i32,
    ) -> Result<CartView, RepositoryError> {
        if quantity_val <= 0 {
            return Err(RepositoryError::ValidationError(format!(
                "Quantity must be positive, got {quantity_val}"
            )));
        }

        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("update_item: failed to acquire DB connection: {}", e);
            e
        })?;

        conn.connection().transaction(|conn| {
            let (line, order) = Self::load_owned_cart_line(conn, line_id_val, client_id_val)?;

            let pricing = Self::price_line(conn, pizza_id_val, size_id_val, ingredient_ids)?;

            // Subtract the old line totals, add the recomputed ones.
            let old_price = &line.price * BigDecimal::from(line.quantity);
            let new_price = &pricing.unit_price * BigDecimal::from(quantity_val);
            let price_delta = new_price - old_price;
            let weight_delta =
                pricing.unit_weight * quantity_val - line.weight * line.quantity;

            {
                use crate::db::schema::order_lines::dsl::*;
                diesel::update(order_lines.find(line_id_val))
                    .set((
                        pizza_id.eq(pizza_id_val),
                        size_id.eq(size_id_val),
                        quantity.eq(quantity_val),
                        is_custom.eq(pricing.is_custom),
                        price.eq(&pricing.unit_price),
                        weight.eq(pricing.unit_weight),
                    ))
                    .execute(conn)
                    .map_err(RepositoryError::DatabaseError)?;
            }

            {
                use crate::db::schema::order_line_ingredients::dsl::*;
                diesel::delete(order_line_ingredients.filter(line_id.eq(line_id_val)))
                    .execute(conn)
                    .map_err(RepositoryError::DatabaseError)?;
            }
            Self::insert_line_ingredients(conn, line_id_val, ingredient_ids)?;

            Self::shift_order_totals(conn, order.order_id, &price_delta, weight_delta)?;

            Self::load_cart_view(conn, order.order_id)
        })
    }

    pub fn remove_item(
        &self,
        client_id_val: i32,
        line_id_val: i32,
    ) -> Result<CartView, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("remove_item: failed to acquire DB connection: {}", e);
            e
        })?;

        conn.connection().transaction(|conn| {
            let (line, order) = Self::load_owned_cart_line(conn, line_id_val, client_id_val)?;

            let price_delta = -(&line.price * BigDecimal::from(line.quantity));
            let weight_delta = -(line.weight * line.quantity);

            {
                use crate::db::schema::order_lines::dsl::*;
                diesel::delete(order_lines.find(line_id_val))
                    .execute(conn)
                    .map_err(RepositoryError::DatabaseError)?;
            }

            Self::shift_order_totals(conn, order.order_id, &price_delta, weight_delta)?;

            Self::load_cart_view(conn, order.order_id)
        })
    }

    /// Submit the cart: staleness-check the price the client saw, then move
    /// the order into IsBeingFormed.
    pub fn submit(
        &self,
        client_id_val: i32,
        expected_price: &BigDecimal,
        address_val: &str,
    ) -> Result<Order, RepositoryError> {
        if expected_price <= &BigDecimal::from(0) {
            return Err(RepositoryError::ValidationError(format!(
                "Expected price must be positive, got {expected_price}"
            )));
        }
        if address_val.trim().is_empty() {
            return Err(RepositoryError::ValidationError(
                "Delivery address must not be empty".to_string(),
            ));
        }

        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("submit: failed to acquire DB connection: {}", e);
            e
        })?;

        conn.connection().transaction(|conn| {
            let cart: Order;
            {
                use crate::db::schema::orders::dsl::*;
                cart = orders
                    .filter(client_id.eq(client_id_val))
                    .filter(status.eq(OrderStatus::NotPlaced))
                    .for_update()
                    .first::<Order>(conn)
                    .map_err(|e| match e {
                        Error::NotFound => RepositoryError::NotFound(format!(
                            "No cart found for client {client_id_val}"
                        )),
                        other => RepositoryError::DatabaseError(other),
                    })?;
            }

            // An empty cart carries a zero price, so it has to be reported
            // before the staleness check or it would always read as outdated.
            let line_count: i64;
            {
                use crate::db::schema::order_lines::dsl::*;
                line_count = order_lines
                    .filter(order_id.eq(cart.order_id))
                    .count()
                    .get_result(conn)
                    .map_err(RepositoryError::DatabaseError)?;
            }
            if line_count == 0 {
                return Err(RepositoryError::EmptyCart(format!(
                    "Cart {} has no lines",
                    cart.order_id
                )));
            }

            if cart.price != *expected_price {
                return Err(RepositoryError::OutdatedCart {
                    expected: expected_price.to_string(),
                    actual: cart.price.to_string(),
                });
            }

            use crate::db::schema::orders::dsl::*;
            diesel::update(orders.find(cart.order_id))
                .set((
                    status.eq(OrderStatus::IsBeingFormed),
                    order_time.eq(Some(Utc::now())),
                    address.eq(address_val),
                ))
                .get_result::<Order>(conn)
                .map_err(RepositoryError::DatabaseError)
        })
    }

    fn find_cart_order(
        conn: &mut PgConnection,
        client_id_val: i32,
    ) -> Result<Option<Order>, RepositoryError> {
        use crate::db::schema::orders::dsl::*;
        orders
            .filter(client_id.eq(client_id_val))
            .filter(status.eq(OrderStatus::NotPlaced))
            .first::<Order>(conn)
            .optional()
            .map_err(|e| {
                error!(
                    "find_cart_order: error fetching cart for client {}: {}",
                    client_id_val, e
                );
                RepositoryError::DatabaseError(e)
            })
    }

    /// Load a cart line and its parent order, verifying ownership and that
    /// the parent is still a cart.
    fn load_owned_cart_line(
        conn: &mut PgConnection,
        line_id_val: i32,
        client_id_val: i32,
    ) -> Result<(OrderLine, Order), RepositoryError> {
        use crate::db::schema::{order_lines, orders};

        let (line, order) = order_lines::table
            .inner_join(orders::table.on(order_lines::order_id.eq(orders::order_id)))
            .filter(order_lines::line_id.eq(line_id_val))
            .select((OrderLine::as_select(), Order::as_select()))
            .first::<(OrderLine, Order)>(conn)
            .map_err(|e| match e {
                Error::NotFound => {
                    RepositoryError::NotFound(format!("Cart line {line_id_val} not found"))
                }
                other => RepositoryError::DatabaseError(other),
            })?;

        if order.client_id != client_id_val {
            return Err(RepositoryError::NotFound(format!(
                "Cart line {line_id_val} not found"
            )));
        }
        if order.status != OrderStatus::NotPlaced {
            return Err(RepositoryError::InvalidState(format!(
                "Order {} is no longer a cart (status {})",
                order.order_id,
                order.status.as_str()
            )));
        }

        Ok((line, order))
    }

    /// Resolve pizza, size and extras, then compute unit price/weight.
    fn price_line(
        conn: &mut PgConnection,
        pizza_id_val: i32,
        size_id_val: i32,
        ingredient_ids: &[i32],
    ) -> Result<LinePricing, RepositoryError> {
        let pizza = Self::load_pizza(conn, pizza_id_val)?;
        if pizza.state != ItemState::Active {
            return Err(RepositoryError::ValidationError(format!(
                "Pizza '{}' is not available",
                pizza.name
            )));
        }

        let size = Self::load_size(conn, size_id_val)?;
        let extras = Self::load_ingredients_by_ids(conn, ingredient_ids)?;
        for ingredient in &extras {
            if ingredient.state != ItemState::Active {
                return Err(RepositoryError::ValidationError(format!(
                    "Ingredient '{}' is not available",
                    ingredient.name
                )));
            }
        }
        let defaults = Self::load_default_ingredients(conn, pizza_id_val)?;

        Ok(LinePricing {
            unit_price: pricing::unit_price(&size, &defaults, &extras),
            unit_weight: pricing::unit_weight(&size, &defaults, &extras),
            is_custom: !ingredient_ids.is_empty(),
        })
    }

    fn load_pizza(conn: &mut PgConnection, pizza_id_val: i32) -> Result<Pizza, RepositoryError> {
        use crate::db::schema::pizzas::dsl::*;
        pizzas
            .find(pizza_id_val)
            .first::<Pizza>(conn)
            .map_err(|e| match e {
                Error::NotFound => {
                    RepositoryError::NotFound(format!("Pizza {pizza_id_val} not found"))
                }
                other => RepositoryError::DatabaseError(other),
            })
    }

    fn load_size(conn: &mut PgConnection, size_id_val: i32) -> Result<PizzaSize, RepositoryError> {
        use crate::db::schema::pizza_sizes::dsl::*;
        pizza_sizes
            .find(size_id_val)
            .first::<PizzaSize>(conn)
            .map_err(|e| match e {
                Error::NotFound => {
                    RepositoryError::NotFound(format!("Pizza size {size_id_val} not found"))
                }
                other => RepositoryError::DatabaseError(other),
            })
    }

    fn load_ingredients_by_ids(
        conn: &mut PgConnection,
        ids: &[i32],
    ) -> Result<Vec<Ingredient>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        use crate::db::schema::ingredients::dsl::*;
        let found = ingredients
            .filter(ingredient_id.eq_any(ids.to_vec()))
            .load::<Ingredient>(conn)
            .map_err(RepositoryError::DatabaseError)?;

        for &wanted in ids {
            if !found.iter().any(|i| i.ingredient_id == wanted) {
                return Err(RepositoryError::NotFound(format!(
                    "Ingredient {wanted} not found"
                )));
            }
        }
        Ok(found)
    }

    fn load_default_ingredients(
        conn: &mut PgConnection,
        pizza_id_val: i32,
    ) -> Result<Vec<Ingredient>, RepositoryError> {
        use crate::db::schema::{ingredients, pizza_ingredients};
        pizza_ingredients::table
            .inner_join(
                ingredients::table
                    .on(pizza_ingredients::ingredient_id.eq(ingredients::ingredient_id)),
            )
            .filter(pizza_ingredients::pizza_id.eq(pizza_id_val))
            .select(Ingredient::as_select())
            .load::<Ingredient>(conn)
            .map_err(RepositoryError::DatabaseError)
    }

    fn insert_line_ingredients(
        conn: &mut PgConnection,
        line_id_val: i32,
        ingredient_ids: &[i32],
    ) -> Result<(), RepositoryError> {
        if ingredient_ids.is_empty() {
            return Ok(());
        }

        let rows: Vec<LineIngredientInsert> = ingredient_ids
            .iter()
            .map(|&ingredient_id_val| LineIngredientInsert {
                line_id: line_id_val,
                ingredient_id: ingredient_id_val,
            })
            .collect();

        use crate::db::schema::order_line_ingredients::dsl::*;
        diesel::insert_into(order_line_ingredients)
            .values(&rows)
            .execute(conn)
            .map_err(RepositoryError::DatabaseError)?;
        Ok(())
    }

    /// Apply a delta to the parent order's aggregate price and weight.
    fn shift_order_totals(
        conn: &mut PgConnection,
        order_id_val: i32,
        price_delta: &BigDecimal,
        weight_delta: i32,
    ) -> Result<(), RepositoryError> {
        use crate::db::schema::orders::dsl::*;

        let (current_price, current_weight) = orders
            .find(order_id_val)
            .select((price, weight))
            .for_update()
            .first::<(BigDecimal, i32)>(conn)
            .map_err(RepositoryError::DatabaseError)?;

        diesel::update(orders.find(order_id_val))
            .set((
                price.eq(current_price + price_delta),
                weight.eq(current_weight + weight_delta),
            ))
            .execute(conn)
            .map_err(RepositoryError::DatabaseError)?;
        Ok(())
    }

    /// Assemble the display view of a cart or placed order from a fresh
    /// read.
    pub(crate) fn load_cart_view(
        conn: &mut PgConnection,
        order_id_val: i32,
    ) -> Result<CartView, RepositoryError> {
        use crate::db::schema::{order_line_ingredients, order_lines, orders, pizza_sizes, pizzas};

        let order = orders::table
            .find(order_id_val)
            .first::<Order>(conn)
            .map_err(|e| match e {
                Error::NotFound => {
                    RepositoryError::NotFound(format!("Order {order_id_val} not found"))
                }
                other => RepositoryError::DatabaseError(other),
            })?;

        let rows: Vec<(OrderLine, String, String)> = order_lines::table
            .inner_join(pizzas::table.on(order_lines::pizza_id.eq(pizzas::pizza_id)))
            .inner_join(pizza_sizes::table.on(order_lines::size_id.eq(pizza_sizes::size_id)))
            .filter(order_lines::order_id.eq(order_id_val))
            .select((OrderLine::as_select(), pizzas::name, pizza_sizes::name))
            .order_by(order_lines::line_id.asc())
            .load(conn)
            .map_err(RepositoryError::DatabaseError)?;

        let line_ids: Vec<i32> = rows.iter().map(|(line, _, _)| line.line_id).collect();
        let mut extras_by_line: HashMap<i32, Vec<i32>> = HashMap::new();
        if !line_ids.is_empty() {
            let pairs: Vec<(i32, i32)> = order_line_ingredients::table
                .filter(order_line_ingredients::line_id.eq_any(&line_ids))
                .select((
                    order_line_ingredients::line_id,
                    order_line_ingredients::ingredient_id,
                ))
                .load(conn)
                .map_err(RepositoryError::DatabaseError)?;
            for (lid, iid) in pairs {
                extras_by_line.entry(lid).or_default().push(iid);
            }
        }

        let lines = rows
            .into_iter()
            .map(|(line, pizza_name, size_name)| {
                let total_price = &line.price * BigDecimal::from(line.quantity);
                CartLineView {
                    line_id: line.line_id,
                    pizza_id: line.pizza_id,
                    pizza_name,
                    size_id: line.size_id,
                    size_name,
                    quantity: line.quantity,
                    is_custom: line.is_custom,
                    price: line.price,
                    weight: line.weight,
                    total_price,
                    total_weight: line.weight * line.quantity,
                    added_ingredient_ids: extras_by_line
                        .remove(&line.line_id)
                        .unwrap_or_default(),
                }
            })
            .collect();

        Ok(CartView {
            order_id: order.order_id,
            price: order.price,
            weight: order.weight,
            lines,
        })
    }
}
