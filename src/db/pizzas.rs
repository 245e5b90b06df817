use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error;
use diesel::PgConnection;
use log::error;

use crate::db::{DbConnection, RepositoryError};
use crate::enums::catalog::PizzaContainer;
use crate::models::catalog::{
    CatalogVisibility, Ingredient, ItemState, NewPizza, NewPizzaSize, Pizza, PizzaSize,
    UpdatePizza,
};

#[derive(Insertable)]
#[diesel(table_name = crate::db::schema::pizza_ingredients)]
struct RecipeRow {
    pizza_id: i32,
    ingredient_id: i32,
}

#[derive(Clone)]
pub struct PizzaOperations {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl PizzaOperations {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    pub fn get_all_pizzas(
        &self,
        visibility: CatalogVisibility,
        last_id: Option<i32>,
        limit: i64,
    ) -> Result<Vec<PizzaContainer>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("get_all_pizzas: failed to acquire DB connection: {}", e);
            e
        })?;

        let page: Vec<Pizza>;
        {
            use crate::db::schema::pizzas::dsl::*;
            let mut query = pizzas.order_by(pizza_id.desc()).limit(limit).into_boxed();
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
                query = query.filter(pizza_id.lt(cursor));
            }
            page = query
                .load::<Pizza>(conn.connection())
                .map_err(RepositoryError::DatabaseError)?;
        }

        page.into_iter()
            .map(|pizza| {
                let ingredients = Self::load_recipe(conn.connection(), pizza.pizza_id)?;
                Ok(PizzaContainer { pizza, ingredients })
            })
            .collect()
    }

    pub fn get_pizza(&self, pizza_id_val: i32) -> Result<PizzaContainer, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        let pizza: Pizza;
        {
            use crate::db::schema::pizzas::dsl::*;
            pizza = pizzas
                .find(pizza_id_val)
                .first::<Pizza>(conn.connection())
                .map_err(|e| match e {
                    Error::NotFound => {
                        RepositoryError::NotFound(format!("Pizza {pizza_id_val} not found"))
                    }
                    other => RepositoryError::DatabaseError(other),
                })?;
        }
        let ingredients = Self::load_recipe(conn.connection(), pizza_id_val)?;
        Ok(PizzaContainer { pizza, ingredients })
    }

    pub fn add_pizza(
        &self,
        new_pizza: NewPizza,
        ingredient_ids: Vec<i32>,
    ) -> Result<PizzaContainer, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("add_pizza: failed to acquire DB connection: {}", e);
            e
        })?;

        conn.connection().transaction(|conn| {
            Self::check_ingredients_exist(conn, &ingredient_ids)?;

            let pizza: Pizza;
            {
                use crate::db::schema::pizzas::dsl::*;
                pizza = diesel::insert_into(pizzas)
                    .values(&new_pizza)
                    .get_result(conn)
                    .map_err(|e| {
                        error!("add_pizza: error inserting pizza '{}': {}", new_pizza.name, e);
                        RepositoryError::DatabaseError(e)
                    })?;
            }

            Self::replace_recipe(conn, pizza.pizza_id, &ingredient_ids)?;
            let ingredients = Self::load_recipe(conn, pizza.pizza_id)?;
            Ok(PizzaContainer { pizza, ingredients })
        })
    }

    /// Change pizza fields and, when a new ingredient set is given, replace
    /// the default recipe wholesale.
    pub fn update_pizza(
        &self,
        pizza_id_val: i32,
        changes: UpdatePizza,
        ingredient_ids: Option<Vec<i32>>,
    ) -> Result<PizzaContainer, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "update_pizza: failed to acquire DB connection for pizza {}: {}",
                pizza_id_val, e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            let pizza: Pizza;
            {
                use crate::db::schema::pizzas::dsl::*;
                pizza = diesel::update(pizzas.find(pizza_id_val))
                    .set(&changes)
                    .get_result::<Pizza>(conn)
                    .map_err(|e| match e {
                        Error::NotFound => {
                            RepositoryError::NotFound(format!("Pizza {pizza_id_val} not found"))
                        }
                        other => RepositoryError::DatabaseError(other),
                    })?;
            }

            if let Some(ids) = ingredient_ids {
                Self::check_ingredients_exist(conn, &ids)?;
                {
                    use crate::db::schema::pizza_ingredients::dsl::*;
                    diesel::delete(pizza_ingredients.filter(pizza_id.eq(pizza_id_val)))
                        .execute(conn)
                        .map_err(RepositoryError::DatabaseError)?;
                }
                Self::replace_recipe(conn, pizza_id_val, &ids)?;
            }

            let ingredients = Self::load_recipe(conn, pizza_id_val)?;
            Ok(PizzaContainer { pizza, ingredients })
        })
    }

    /// Soft delete: existing order lines keep their reference.
    pub fn remove_pizza(&self, pizza_id_val: i32) -> Result<Pizza, RepositoryError> {
        self.set_state(pizza_id_val, ItemState::Deleted)
    }

    pub fn restore_pizza(&self, pizza_id_val: i32) -> Result<Pizza, RepositoryError> {
        self.set_state(pizza_id_val, ItemState::Active)
    }

    fn set_state(&self, pizza_id_val: i32, new_state: ItemState) -> Result<Pizza, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "set_state: failed to acquire DB connection for pizza {}: {}",
                pizza_id_val, e
            );
            e
        })?;

        use crate::db::schema::pizzas::dsl::*;
        diesel::update(pizzas.find(pizza_id_val))
            .set(state.eq(new_state))
            .get_result::<Pizza>(conn.connection())
            .map_err(|e| match e {
                Error::NotFound => {
                    RepositoryError::NotFound(format!("Pizza {pizza_id_val} not found"))
                }
                other => RepositoryError::DatabaseError(other),
            })
    }

    pub fn get_all_sizes(&self) -> Result<Vec<PizzaSize>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::pizza_sizes::dsl::*;
        pizza_sizes
            .order_by(size_id.asc())
            .load::<PizzaSize>(conn.connection())
            .map_err(RepositoryError::DatabaseError)
    }

    pub fn add_size(&self, new_size: NewPizzaSize) -> Result<PizzaSize, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("add_size: failed to acquire DB connection: {}", e);
            e
        })?;

        use crate::db::schema::pizza_sizes::dsl::*;
        diesel::insert_into(pizza_sizes)
            .values(&new_size)
            .get_result(conn.connection())
            .map_err(|e| {
                error!("add_size: error inserting size '{}': {}", new_size.name, e);
                RepositoryError::DatabaseError(e)
            })
    }

    fn load_recipe(
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
            .order_by(ingredients::ingredient_id.asc())
            .load::<Ingredient>(conn)
            .map_err(RepositoryError::DatabaseError)
    }

    fn check_ingredients_exist(
        conn: &mut PgConnection,
        ids: &[i32],
    ) -> Result<(), RepositoryError> {
        if ids.is_empty() {
            return Ok(());
        }
        use crate::db::schema::ingredients::dsl::*;
        let found: i64 = ingredients
            .filter(ingredient_id.eq_any(ids))
            .count()
            .get_result(conn)
            .map_err(RepositoryError::DatabaseError)?;
        if found as usize != ids.len() {
            return Err(RepositoryError::ValidationError(
                "One or more ingredient ids do not exist".to_string(),
            ));
        }
        Ok(())
    }

    fn replace_recipe(
        conn: &mut PgConnection,
        pizza_id_val: i32,
        ids: &[i32],
    ) -> Result<(), RepositoryError> {
        if ids.is_empty() {
            return Ok(());
        }
        use crate::db::schema::pizza_ingredients::dsl::*;
        let rows: Vec<RecipeRow> = ids
            .iter()
            .map(|id| RecipeRow {
                pizza_id: pizza_id_val,
                ingredient_id: *id,
            })
            .collect();
        diesel::insert_into(pizza_ingredients)
            .values(&rows)
            .execute(conn)
            .map_err(RepositoryError::DatabaseError)?;
        Ok(())
    }
}
