use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error};
use diesel::PgConnection;
use log::error;

use crate::db::{DbConnection, RepositoryError};
use crate::models::user::{NewUser, User};

#[derive(Clone)]
pub struct UserOperations {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl UserOperations {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    pub fn create_user(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("create_user: failed to acquire DB connection: {}", e);
            e
        })?;

        use crate::db::schema::users::dsl::*;

        diesel::insert_into(users)
            .values(&new_user)
            .get_result(conn.connection())
            .map_err(|e| {
                error!(
                    "create_user: error inserting user with email '{}': {}",
                    new_user.email, e
                );
                match e {
                    Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        RepositoryError::ValidationError(format!(
                            "Email already registered: {}",
                            new_user.email
                        ))
                    }
                    other => RepositoryError::DatabaseError(other),
                }
            })
    }

    pub fn get_user_by_email(&self, email_addr: &str) -> Result<User, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::users::dsl::*;
        users
            .filter(email.eq(email_addr))
            .limit(1)
            .get_result::<User>(conn.connection())
            .map_err(|e| match e {
                Error::NotFound => RepositoryError::NotFound(email_addr.to_string()),
                other => {
                    error!(
                        "get_user_by_email: error fetching user with email '{}': {}",
                        email_addr, other
                    );
                    RepositoryError::DatabaseError(other)
                }
            })
    }

    pub fn get_user_by_id(&self, search_user_id: i32) -> Result<User, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::users::dsl::*;
        users
            .find(search_user_id)
            .get_result::<User>(conn.connection())
            .map_err(|e| match e {
                Error::NotFound => RepositoryError::NotFound(search_user_id.to_string()),
                other => {
                    error!(
                        "get_user_by_id: error fetching user {}: {}",
                        search_user_id, other
                    );
                    RepositoryError::DatabaseError(other)
                }
            })
    }
}
