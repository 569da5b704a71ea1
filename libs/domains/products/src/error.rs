use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::{DatabaseError, UnitOfWorkError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product with ID: {0} not found.")]
    NotFound(i32),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    UnitOfWork(#[from] UnitOfWorkError),
}

pub type ProductResult<T> = Result<T, ProductError>;

// A store failure surfacing from a repository call is a persistence failure
impl From<DatabaseError> for ProductError {
    fn from(err: DatabaseError) -> Self {
        ProductError::UnitOfWork(UnitOfWorkError::Persistence(err))
    }
}

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(_) => AppError::NotFound(err.to_string()),
            ProductError::Validation(msg) => AppError::BadRequest(msg),
            ProductError::UnitOfWork(UnitOfWorkError::Persistence(e)) => {
                AppError::Database(e.to_string())
            }
            ProductError::UnitOfWork(e) => AppError::InternalServerError(e.to_string()),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
