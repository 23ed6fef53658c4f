use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
};
use uuid::Uuid;

use crate::{
    dto::categories::{CategoryList, CategoryPayload},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Category,
    response::ApiResponse,
    services::category_service,
    state::AppState,
    upload,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(list_categories))
        .route("/", axum::routing::post(create_category))
        .route("/{id}", axum::routing::get(get_category))
        .route("/{id}", axum::routing::put(update_category))
        .route("/{id}", axum::routing::delete(delete_category))
        .route("/by-slug/{slug}", axum::routing::get(get_category_by_slug))
}

async fn payload_from_form(
    state: &AppState,
    multipart: &mut Multipart,
) -> AppResult<CategoryPayload> {
    let form = upload::read_form(&state.config, multipart).await?;
    Ok(CategoryPayload {
        name: form.require("name")?,
        description: form.get("description").unwrap_or_default().to_string(),
        image: form.images.first().cloned(),
    })
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List categories", body = ApiResponse<CategoryList>),
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    Ok(Json(category_service::list_categories(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Get category", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Category>>> {
    Ok(Json(category_service::get_category(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/categories/by-slug/{slug}",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Get category", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
    ),
    tag = "Categories"
)]
pub async fn get_category_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<Category>>> {
    Ok(Json(
        category_service::get_category_by_slug(&state, &slug).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body(content = inline(String), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Category created", body = ApiResponse<Category>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<Category>>> {
    let payload = payload_from_form(&state, &mut multipart).await?;
    Ok(Json(
        category_service::create_category(&state, &user, payload).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body(content = inline(String), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<Category>>> {
    let payload = payload_from_form(&state, &mut multipart).await?;
    Ok(Json(
        category_service::update_category(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 400, description = "Category still has products assigned"),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        category_service::delete_category(&state, &user, id).await?,
    ))
}
