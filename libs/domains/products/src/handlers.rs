use axum::{
    Json, Router,
    extract::{OriginalUri, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AppError, IdPath, ValidatedJson,
    errors::responses::{
        BadRequestIdResponse, BadRequestResponse, BadRequestValidationResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use database::{Session, UnitOfWorkProvider};
use utoipa::OpenApi;

use crate::error::ProductResult;
use crate::models::{CreateProduct, Product, UpdateProduct};
use crate::service::ProductService;

pub const TAG: &str = "products";

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        get_product,
        create_product,
        update_product,
        patch_product,
        delete_product,
    ),
    components(
        schemas(Product, CreateProduct, UpdateProduct),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestIdResponse,
            BadRequestResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Inventory product endpoints")
    )
)]
pub struct ApiDoc;

/// Create the product router; every request runs in its own unit of work.
pub fn router<S: Session>(provider: UnitOfWorkProvider<S>) -> Router {
    Router::new()
        .route("/", get(list_products::<S>).post(create_product::<S>))
        .route(
            "/{id}",
            get(get_product::<S>)
                .put(update_product::<S>)
                .patch(patch_product::<S>)
                .delete(delete_product::<S>),
        )
        .with_state(provider)
}

/// List all products
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "List of products", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<S: Session>(
    State(provider): State<UnitOfWorkProvider<S>>,
) -> ProductResult<Json<Vec<Product>>> {
    let mut service = ProductService::new(provider.begin());
    let products = service.get_all().await?;
    Ok(Json(products))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<S: Session>(
    State(provider): State<UnitOfWorkProvider<S>>,
    IdPath(id): IdPath,
) -> ProductResult<Json<Product>> {
    let mut service = ProductService::new(provider.begin());
    let product = service.get_by_id(id).await?;
    Ok(Json(product))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = Product,
            headers(("Location" = String, description = "URL of the created product"))),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<S: Session>(
    State(provider): State<UnitOfWorkProvider<S>>,
    OriginalUri(uri): OriginalUri,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let mut service = ProductService::new(provider.begin());
    let product = service.add(input).await?;

    let location = format!("{}/{}", uri.path().trim_end_matches('/'), product.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(product),
    ))
}

/// Replace a product
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body = Product,
    responses(
        (status = 204, description = "Product updated"),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<S: Session>(
    State(provider): State<UnitOfWorkProvider<S>>,
    IdPath(id): IdPath,
    ValidatedJson(product): ValidatedJson<Product>,
) -> Result<StatusCode, AppError> {
    if id != product.id {
        return Err(AppError::BadRequest(
            "Product ID in the URL and object do not match.".to_string(),
        ));
    }

    let mut service = ProductService::new(provider.begin());
    service.update(product).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Partially update a product
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn patch_product<S: Session>(
    State(provider): State<UnitOfWorkProvider<S>>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> ProductResult<Json<Product>> {
    let mut service = ProductService::new(provider.begin());
    let product = service.patch(id, input).await?;
    Ok(Json(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<S: Session>(
    State(provider): State<UnitOfWorkProvider<S>>,
    IdPath(id): IdPath,
) -> ProductResult<StatusCode> {
    let mut service = ProductService::new(provider.begin());
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
