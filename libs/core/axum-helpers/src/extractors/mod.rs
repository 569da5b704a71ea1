//! Custom extractors for Axum handlers.
//!
//! Both reject with the shared [`ErrorResponse`](crate::errors::ErrorResponse)
//! body so clients see one error shape across the API.

pub mod id_path;
pub mod validated_json;

pub use id_path::IdPath;
pub use validated_json::ValidatedJson;
