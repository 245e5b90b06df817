use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Invalid order state: {0}")]
    InvalidState(String),
    #[error("Cart is outdated: server price is {actual}, client expected {expected}")]
    OutdatedCart { expected: String, actual: String },
    #[error("Cart is empty: {0}")]
    EmptyCart(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),
    #[error("Connection pool error: {0}")]
    ConnectionPoolError(#[from] diesel::r2d2::PoolError),
}
