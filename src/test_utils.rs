use std::sync::Once;

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;

use crate::auth::password::hash_password;
use crate::db::{establish_connection_pool, run_db_migrations, DbConnection, RepositoryError};
use crate::models::catalog::{ItemState, NewIngredient, NewPizza, NewPizzaSize};
use crate::models::user::{NewUser, UserRole};

// Fixture strategy:
// - One user per role plus a small catalog: two sizes, two ingredients,
//   one pizza whose default recipe is just the cheese.
// - Seed values are chosen so a small Margherita prices to 230
//   (200 base + 2/g * 15 g cheese) for easy assertions.
const TEST_JWT_SECRET: &str = "test-jwt-secret";
pub const TEST_PASSWORD: &str = "correct horse battery staple";
static TEST_THREADS_GUARD: Once = Once::new();

fn ensure_single_threaded_tests() {
    TEST_THREADS_GUARD.call_once(|| {
        let threads = test_threads_from_args().or_else(|| std::env::var("RUST_TEST_THREADS").ok());
        if threads.as_deref() != Some("1") {
            panic!(
                "Tests must run with --test-threads=1 or RUST_TEST_THREADS=1 because init_test_env mutates environment variables."
            );
        }
    });
}

fn test_threads_from_args() -> Option<String> {
    let mut args = std::env::args();
    while let Some(arg) = args.next() {
        if arg == "--test-threads" {
            return args.next();
        }
        if let Some(value) = arg.strip_prefix("--test-threads=") {
            return Some(value.to_string());
        }
    }
    None
}

fn set_env_if_unset(key: &str, value: &str) {
    if std::env::var_os(key).is_none() {
        std::env::set_var(key, value);
    }
}

pub fn init_test_env() {
    ensure_single_threaded_tests();
    set_env_if_unset("JWT_SECRET", TEST_JWT_SECRET);
}

pub fn build_test_pool(database_url: &str) -> Pool<ConnectionManager<PgConnection>> {
    let pool = establish_connection_pool(database_url);
    run_db_migrations(pool.clone()).expect("Unable to run migrations");
    pool
}

pub fn reset_db(pool: &Pool<ConnectionManager<PgConnection>>) -> Result<(), RepositoryError> {
    let mut conn = DbConnection::new(pool)?;
    diesel::sql_query(
        "TRUNCATE TABLE reviews, deliveries, order_line_ingredients, order_lines, orders, \
         pizza_ingredients, pizzas, ingredients, pizza_sizes, users RESTART IDENTITY CASCADE",
    )
    .execute(conn.connection())
    .map_err(RepositoryError::DatabaseError)?;
    Ok(())
}

pub struct TestFixtures {
    pub client_id: i32,
    pub manager_id: i32,
    pub courier_id: i32,
    pub size_small_id: i32,
    pub size_medium_id: i32,
    pub cheese_id: i32,
    pub pepperoni_id: i32,
    pub pizza_id: i32,
}

pub fn seed_basic_fixtures(
    pool: &Pool<ConnectionManager<PgConnection>>,
) -> Result<TestFixtures, RepositoryError> {
    let mut conn = DbConnection::new(pool)?;

    let client_id = insert_user(
        conn.connection(),
        "client@example.com",
        "Client One",
        UserRole::Client,
    )?;
    let manager_id = insert_user(
        conn.connection(),
        "manager@example.com",
        "Manager One",
        UserRole::Manager,
    )?;
    let courier_id = insert_user(
        conn.connection(),
        "courier@example.com",
        "Courier One",
        UserRole::Courier,
    )?;

    let size_small_id = seed_size(conn.connection(), "Small", 200, 400)?;
    let size_medium_id = seed_size(conn.connection(), "Medium", 300, 600)?;

    let cheese_id = seed_ingredient(
        conn.connection(),
        "Mozzarella",
        2,
        15,
        20,
        30,
        ItemState::Active,
    )?;
    let pepperoni_id = seed_ingredient(
        conn.connection(),
        "Pepperoni",
        3,
        10,
        15,
        20,
        ItemState::Active,
    )?;

    let pizza_id = seed_pizza(
        conn.connection(),
        "Margherita",
        ItemState::Active,
        &[cheese_id],
    )?;

    Ok(TestFixtures {
        client_id,
        manager_id,
        courier_id,
        size_small_id,
        size_medium_id,
        cheese_id,
        pepperoni_id,
        pizza_id,
    })
}

pub fn insert_user(
    conn: &mut PgConnection,
    email_val: &str,
    name_val: &str,
    role_val: UserRole,
) -> Result<i32, RepositoryError> {
    use crate::db::schema::users::dsl::*;

    let hash = hash_password(TEST_PASSWORD)
        .map_err(|e| RepositoryError::ValidationError(e.to_string()))?;
    let new_user = NewUser {
        email: email_val.to_string(),
        password_hash: hash,
        name: name_val.to_string(),
        role: role_val,
    };

    diesel::insert_into(users)
        .values(&new_user)
        .returning(user_id)
        .get_result(conn)
        .map_err(RepositoryError::DatabaseError)
}

pub fn seed_size(
    conn: &mut PgConnection,
    name_val: &str,
    base_price_val: i64,
    base_weight_val: i32,
) -> Result<i32, RepositoryError> {
    use crate::db::schema::pizza_sizes::dsl::*;

    let new_size = NewPizzaSize {
        name: name_val.to_string(),
        base_price: BigDecimal::from(base_price_val),
        base_weight: base_weight_val,
    };

    diesel::insert_into(pizza_sizes)
        .values(&new_size)
        .returning(size_id)
        .get_result(conn)
        .map_err(RepositoryError::DatabaseError)
}

pub fn seed_ingredient(
    conn: &mut PgConnection,
    name_val: &str,
    price_per_gram_val: i64,
    weight_small_val: i32,
    weight_medium_val: i32,
    weight_big_val: i32,
    state_val: ItemState,
) -> Result<i32, RepositoryError> {
    use crate::db::schema::ingredients::dsl::*;

    let new_ingredient = NewIngredient {
        name: name_val.to_string(),
        description: None,
        price_per_gram: BigDecimal::from(price_per_gram_val),
        weight_small: weight_small_val,
        weight_medium: weight_medium_val,
        weight_big: weight_big_val,
        state: state_val,
    };

    diesel::insert_into(ingredients)
        .values(&new_ingredient)
        .returning(ingredient_id)
        .get_result(conn)
        .map_err(RepositoryError::DatabaseError)
}

pub fn seed_pizza(
    conn: &mut PgConnection,
    name_val: &str,
    state_val: ItemState,
    default_ingredient_ids: &[i32],
) -> Result<i32, RepositoryError> {
    let new_pizza = NewPizza {
        name: name_val.to_string(),
        description: None,
        image_link: None,
        state: state_val,
    };

    let new_pizza_id: i32 = {
        use crate::db::schema::pizzas::dsl::*;
        diesel::insert_into(pizzas)
            .values(&new_pizza)
            .returning(pizza_id)
            .get_result(conn)
            .map_err(RepositoryError::DatabaseError)?
    };

    {
        use crate::db::schema::pizza_ingredients::dsl::*;
        for id in default_ingredient_ids {
            diesel::insert_into(pizza_ingredients)
                .values((pizza_id.eq(new_pizza_id), ingredient_id.eq(*id)))
                .execute(conn)
                .map_err(RepositoryError::DatabaseError)?;
        }
    }

    Ok(new_pizza_id)
}
