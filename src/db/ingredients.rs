use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error;
use diesel::PgConnection;
use log::{debug, error, info};
use std::collections::HashSet;

use crate::db::{DbConnection, RepositoryError};
use crate::models::catalog::{
    CatalogVisibility, Ingredient, ItemState, NewIngredient, PizzaSize, UpdateIngredient,
};
use crate::models::order::{OrderLine, OrderStatus};
use crate::pricing;

#[derive(Clone)]
pub struct IngredientOperations {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl IngredientOperations {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    pub fn get_all_ingredients(
        &self,
        visibility: CatalogVisibility,
        last_id: Option<i32>,
        limit: i64,
    ) -> Result<Vec<Ingredient>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::ingredients::dsl::*;
        let mut query = ingredients
            .order_by(ingredient_id.desc())
            .limit(limit)
            .into_boxed();
        match visibility {
            CatalogVisibility::ActiveOnly => {
                query = query.filter(state.eq(ItemState::Active));
            }
            CatalogVisibility::NotDeleted => {
                query = query.filter(state.ne(ItemState::Deleted));
            }
            CatalogVisibility::All => {}
        }
        if let Some(cursor) = last_id {
            query = query.filter(ingredient_id.lt(cursor));
        }
        query
            .load::<Ingredient>(conn.connection())
            .map_err(RepositoryError::DatabaseError)
    }

    pub fn get_ingredient(&self, ingredient_id_val: i32) -> Result<Ingredient, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::ingredients::dsl::*;
        ingredients
            .find(ingredient_id_val)
            .first::<Ingredient>(conn.connection())
            .map_err(|e| match e {
                Error::NotFound => {
                    RepositoryError::NotFound(format!("Ingredient {ingredient_id_val} not found"))
                }
                other => RepositoryError::DatabaseError(other),
            })
    }

    pub fn add_ingredient(
        &self,
        new_ingredient: NewIngredient,
    ) -> Result<Ingredient, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("add_ingredient: failed to acquire DB connection: {}", e);
            e
        })?;

        use crate::db::schema::ingredients::dsl::*;
        diesel::insert_into(ingredients)
            .values(&new_ingredient)
            .get_result(conn.connection())
            .map_err(|e| {
                error!(
                    "add_ingredient: error inserting ingredient '{}': {}",
                    new_ingredient.name, e
                );
                RepositoryError::DatabaseError(e)
            })
    }

    /// Update an ingredient, then re-price every cart line the change
    /// touches. Only NotPlaced orders are recomputed; placed orders keep the
    /// price they were submitted with.
    pub fn update_ingredient(
        &self,
        ingredient_id_val: i32,
        changes: UpdateIngredient,
    ) -> Result<Ingredient, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("update_ingredient: failed to acquire DB connection: {}", e);
            e
        })?;

        conn.connection().transaction(|conn| {
            let updated: Ingredient;
            {
                use crate::db::schema::ingredients::dsl::*;
                updated = diesel::update(ingredients.find(ingredient_id_val))
                    .set(&changes)
                    .get_result::<Ingredient>(conn)
                    .map_err(|e| match e {
                        Error::NotFound => RepositoryError::NotFound(format!(
                            "Ingredient {ingredient_id_val} not found"
                        )),
                        other => RepositoryError::DatabaseError(other),
                    })?;
            }

            let affected = Self::recompute_affected_carts(conn, ingredient_id_val)?;
            if affected > 0 {
                info!(
                    "update_ingredient: ingredient {} changed, re-priced {} cart lines",
                    ingredient_id_val, affected
                );
            }

            Ok(updated)
        })
    }

    /// Soft delete: the ingredient stays referenced by existing lines and
    /// recipes but can no longer be added.
    pub fn remove_ingredient(&self, ingredient_id_val: i32) -> Result<Ingredient, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("remove_ingredient: failed to acquire DB connection: {}", e);
            e
        })?;

        use crate::db::schema::ingredients::dsl::*;
        diesel::update(ingredients.find(ingredient_id_val))
            .set(state.eq(ItemState::Deleted))
            .get_result::<Ingredient>(conn.connection())
            .map_err(|e| match e {
                Error::NotFound => {
                    RepositoryError::NotFound(format!("Ingredient {ingredient_id_val} not found"))
                }
                other => RepositoryError::DatabaseError(other),
            })
    }

    /// Find every line on a NotPlaced order that involves the ingredient,
    /// either through the pizza's default set or as a line extra, recompute
    /// each from current catalog values, and refresh the affected orders'
    /// aggregates as the sum of their lines.
    fn recompute_affected_carts(
        conn: &mut PgConnection,
        ingredient_id_val: i32,
    ) -> Result<usize, RepositoryError> {
        use crate::db::schema::{order_line_ingredients, order_lines, orders, pizza_ingredients};

        let via_pizza: Vec<i32> = order_lines::table
            .inner_join(orders::table.on(order_lines::order_id.eq(orders::order_id)))
            .inner_join(
                pizza_ingredients::table
                    .on(order_lines::pizza_id.eq(pizza_ingredients::pizza_id)),
            )
            .filter(orders::status.eq(OrderStatus::NotPlaced))
            .filter(pizza_ingredients::ingredient_id.eq(ingredient_id_val))
            .select(order_lines::line_id)
            .load::<i32>(conn)
            .map_err(RepositoryError::DatabaseError)?;

        let via_extras: Vec<i32> = order_lines::table
            .inner_join(orders::table.on(order_lines::order_id.eq(orders::order_id)))
            .inner_join(
                order_line_ingredients::table
                    .on(order_lines::line_id.eq(order_line_ingredients::line_id)),
            )
            .filter(orders::status.eq(OrderStatus::NotPlaced))
            .filter(order_line_ingredients::ingredient_id.eq(ingredient_id_val))
            .select(order_lines::line_id)
            .load::<i32>(conn)
            .map_err(RepositoryError::DatabaseError)?;

        let line_ids: HashSet<i32> = via_pizza.into_iter().chain(via_extras).collect();
        if line_ids.is_empty() {
            return Ok(0);
        }

        let mut affected_orders: HashSet<i32> = HashSet::new();
        for line_id_val in &line_ids {
            let order_id_val = Self::reprice_line(conn, *line_id_val)?;
            affected_orders.insert(order_id_val);
        }

        for order_id_val in affected_orders {
            Self::refresh_order_totals(conn, order_id_val)?;
        }

        Ok(line_ids.len())
    }

    /// Recompute one line's unit price/weight from current catalog values.
    /// Returns the parent order id.
    fn reprice_line(conn: &mut PgConnection, line_id_val: i32) -> Result<i32, RepositoryError> {
        use crate::db::schema::{
            ingredients, order_line_ingredients, order_lines, pizza_ingredients, pizza_sizes,
        };

        let line = order_lines::table
            .find(line_id_val)
            .first::<OrderLine>(conn)
            .map_err(RepositoryError::DatabaseError)?;

        let size = pizza_sizes::table
            .find(line.size_id)
            .first::<PizzaSize>(conn)
            .map_err(RepositoryError::DatabaseError)?;

        let defaults: Vec<Ingredient> = pizza_ingredients::table
            .inner_join(
                ingredients::table
                    .on(pizza_ingredients::ingredient_id.eq(ingredients::ingredient_id)),
            )
            .filter(pizza_ingredients::pizza_id.eq(line.pizza_id))
            .select(Ingredient::as_select())
            .load::<Ingredient>(conn)
            .map_err(RepositoryError::DatabaseError)?;

        let extras: Vec<Ingredient> = order_line_ingredients::table
            .inner_join(
                ingredients::table
                    .on(order_line_ingredients::ingredient_id.eq(ingredients::ingredient_id)),
            )
            .filter(order_line_ingredients::line_id.eq(line_id_val))
            .select(Ingredient::as_select())
            .load::<Ingredient>(conn)
            .map_err(RepositoryError::DatabaseError)?;

        let unit_price = pricing::unit_price(&size, &defaults, &extras);
        let unit_weight = pricing::unit_weight(&size, &defaults, &extras);

        {
            use crate::db::schema::order_lines::dsl::*;
            diesel::update(order_lines.find(line_id_val))
                .set((price.eq(&unit_price), weight.eq(unit_weight)))
                .execute(conn)
                .map_err(RepositoryError::DatabaseError)?;
        }

        debug!(
            "reprice_line: line {} re-priced to {} / {}g",
            line_id_val, unit_price, unit_weight
        );
        Ok(line.order_id)
    }

    /// Set the order aggregates to the sum of its line totals.
    fn refresh_order_totals(
        conn: &mut PgConnection,
        order_id_val: i32,
    ) -> Result<(), RepositoryError> {
        use crate::db::schema::order_lines;

        let lines: Vec<OrderLine> = order_lines::table
            .filter(order_lines::order_id.eq(order_id_val))
            .load::<OrderLine>(conn)
            .map_err(RepositoryError::DatabaseError)?;

        let total_price: BigDecimal = lines
            .iter()
            .map(|line| &line.price * BigDecimal::from(line.quantity))
            .sum();
        let total_weight: i32 = lines.iter().map(|line| line.weight * line.quantity).sum();

        use crate::db::schema::orders::dsl::*;
        diesel::update(orders.find(order_id_val))
            .set((price.eq(total_price), weight.eq(total_weight)))
            .execute(conn)
            .map_err(RepositoryError::DatabaseError)?;
        Ok(())
    }
}
