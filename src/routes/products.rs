use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::products::{ProductList, ProductPayload, ProductVariantList, VariantPayload},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Product, ProductVariant},
    response::ApiResponse,
    routes::params::ProductQuery,
    services::product_service,
    state::AppState,
    upload,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RenameVariantRequest {
    pub color: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(list_products))
        .route("/", axum::routing::post(create_product))
        .route("/{id}", axum::routing::get(get_product))
        .route("/{id}", axum::routing::put(update_product))
        .route("/{id}", axum::routing::delete(delete_product))
        .route("/by-slug/{slug}", axum::routing::get(get_product_by_slug))
        .route(
            "/by-category/{slug}",
            axum::routing::get(get_products_by_category),
        )
        .route("/similar/{id}", axum::routing::get(get_similar_products))
        .route("/{id}/variants", axum::routing::get(list_variants))
        .route("/{id}/variants", axum::routing::post(create_variant))
        .route(
            "/{id}/variants/{variant_id}",
            axum::routing::put(update_variant),
        )
        .route(
            "/{id}/variants/{variant_id}",
            axum::routing::delete(delete_variant),
        )
        .route(
            "/{id}/variants/{variant_id}/name",
            axum::routing::patch(rename_variant),
        )
        .route(
            "/{id}/variants/{variant_id}/images",
            axum::routing::patch(update_variant_images),
        )
}

async fn payload_from_form(
    state: &AppState,
    multipart: &mut Multipart,
) -> AppResult<ProductPayload> {
    let form = upload::read_form(&state.config, multipart).await?;
    Ok(ProductPayload {
        name: form.require("name")?,
        description: form.get("description").unwrap_or_default().to_string(),
        price: form.parse("price")?,
        info: form.get("info").unwrap_or_default().to_string(),
        remains: form.parse_opt("remains")?.unwrap_or(0),
        category_id: form.parse("category_id")?,
        images: form.images.clone(),
    })
}

async fn variant_from_form(
    state: &AppState,
    multipart: &mut Multipart,
) -> AppResult<VariantPayload> {
    let form = upload::read_form(&state.config, multipart).await?;
    Ok(VariantPayload {
        color: form.require("color")?,
        kind: form.get("kind").map(str::to_string),
        images: form.images.clone(),
    })
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("search_term" = Option<String>, Query, description = "Matches product name, description and category name"),
        ("ratings" = Option<String>, Query, description = "Pipe-separated star values, e.g. 4|5"),
        ("min_price" = Option<i64>, Query, description = "Minimum price in cents"),
        ("max_price" = Option<i64>, Query, description = "Maximum price in cents"),
        ("category_id" = Option<Uuid>, Query, description = "Category filter"),
        ("sort" = Option<String>, Query, description = "newest | oldest | low-price | high-price"),
    ),
    responses(
        (status = 200, description = "Filtered product page", body = ApiResponse<ProductList>),
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    Ok(Json(product_service::list_products(&state, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    Ok(Json(product_service::get_product(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/products/by-slug/{slug}",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    Ok(Json(
        product_service::get_product_by_slug(&state, &slug).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/products/by-category/{slug}",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Products in category", body = ApiResponse<ProductList>),
        (status = 404, description = "Category not found"),
    ),
    tag = "Products"
)]
pub async fn get_products_by_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    Ok(Json(
        product_service::get_products_by_category(&state, &slug).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/products/similar/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Products from the same category", body = ApiResponse<ProductList>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_similar_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    Ok(Json(
        product_service::get_similar_products(&state, id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body(content = inline(String), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product created", body = ApiResponse<Product>),
        (status = 400, description = "Invalid price or unknown category"),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<Product>>> {
    let payload = payload_from_form(&state, &mut multipart).await?;
    Ok(Json(
        product_service::create_product(&state, &user, payload).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body(content = inline(String), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<Product>>> {
    let payload = payload_from_form(&state, &mut multipart).await?;
    Ok(Json(
        product_service::update_product(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product and its reviews and item snapshots deleted"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        product_service::delete_product(&state, &user, id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/variants",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product variants", body = ApiResponse<ProductVariantList>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn list_variants(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductVariantList>>> {
    Ok(Json(product_service::list_variants(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/variants",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body(content = inline(String), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Variant created", body = ApiResponse<ProductVariant>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_variant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<ProductVariant>>> {
    let payload = variant_from_form(&state, &mut multipart).await?;
    Ok(Json(
        product_service::create_variant(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}/variants/{variant_id}",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("variant_id" = Uuid, Path, description = "Variant ID"),
    ),
    request_body(content = inline(String), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Variant updated", body = ApiResponse<ProductVariant>),
        (status = 404, description = "Variant not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_variant(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, variant_id)): Path<(Uuid, Uuid)>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<ProductVariant>>> {
    let payload = variant_from_form(&state, &mut multipart).await?;
    Ok(Json(
        product_service::update_variant(&state, &user, id, variant_id, payload).await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/variants/{variant_id}/name",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("variant_id" = Uuid, Path, description = "Variant ID"),
    ),
    request_body = RenameVariantRequest,
    responses(
        (status = 200, description = "Variant renamed", body = ApiResponse<ProductVariant>),
        (status = 404, description = "Variant not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn rename_variant(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, variant_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<RenameVariantRequest>,
) -> AppResult<Json<ApiResponse<ProductVariant>>> {
    Ok(Json(
        product_service::rename_variant(&state, &user, id, variant_id, payload.color).await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/variants/{variant_id}/images",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("variant_id" = Uuid, Path, description = "Variant ID"),
    ),
    request_body(content = inline(String), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Variant images replaced", body = ApiResponse<ProductVariant>),
        (status = 404, description = "Variant not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_variant_images(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, variant_id)): Path<(Uuid, Uuid)>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<ProductVariant>>> {
    let form = upload::read_form(&state.config, &mut multipart).await?;
    Ok(Json(
        product_service::update_variant_images(&state, &user, id, variant_id, form.images).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}/variants/{variant_id}",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("variant_id" = Uuid, Path, description = "Variant ID"),
    ),
    responses(
        (status = 200, description = "Variant deleted"),
        (status = 404, description = "Variant not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_variant(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, variant_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        product_service::delete_variant(&state, &user, id, variant_id).await?,
    ))
}
