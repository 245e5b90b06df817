#[macro_use]
extern crate log;

pub mod api;
pub mod auth;
pub mod db;
pub mod enums;
pub mod models;
pub mod pricing;
pub mod test_utils;

use crate::auth::AuthConfig;
use crate::db::{
    establish_connection_pool, run_db_migrations, CartOperations, DeliveryOperations,
    IngredientOperations, OrderOperations, PizzaOperations, ReviewOperations, UserOperations,
};

#[derive(Clone)]
pub struct AppState {
    pub auth_cfg: AuthConfig,
    pub user_ops: UserOperations,
    pub pizza_ops: PizzaOperations,
    pub ingredient_ops: IngredientOperations,
    pub cart_ops: CartOperations,
    pub order_ops: OrderOperations,
    pub delivery_ops: DeliveryOperations,
    pub review_ops: ReviewOperations,
}

impl AppState {
    pub fn new(url: &str, auth_cfg: AuthConfig) -> Self {
        let db = establish_connection_pool(url);
        run_db_migrations(db.clone()).expect("Unable to run migrations");

        AppState {
            auth_cfg,
            user_ops: UserOperations::new(db.clone()),
            pizza_ops: PizzaOperations::new(db.clone()),
            ingredient_ops: IngredientOperations::new(db.clone()),
            cart_ops: CartOperations::new(db.clone()),
            order_ops: OrderOperations::new(db.clone()),
            delivery_ops: DeliveryOperations::new(db.clone()),
            review_ops: ReviewOperations::new(db),
        }
    }
}
