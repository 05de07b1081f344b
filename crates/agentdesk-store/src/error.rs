use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Password hash error: {0}")]
    PasswordHash(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid stored data: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
