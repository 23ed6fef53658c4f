use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
};
use uuid::Uuid;

use crate::{
    dto::setups::{SetupList, SetupPayload, SetupProductList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Setup,
    response::ApiResponse,
    services::setup_service,
    state::AppState,
    upload,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(list_setups))
        .route("/", axum::routing::post(create_setup))
        .route("/{id}", axum::routing::get(get_setup))
        .route("/{id}", axum::routing::put(update_setup))
        .route("/{id}", axum::routing::delete(delete_setup))
        .route("/{id}/products", axum::routing::get(list_setup_products))
        .route(
            "/{id}/products/{product_id}",
            axum::routing::post(attach_product),
        )
}

async fn payload_from_form(state: &AppState, multipart: &mut Multipart) -> AppResult<SetupPayload> {
    let form = upload::read_form(&state.config, multipart).await?;
    Ok(SetupPayload {
        name: form.require("name")?,
        description: form.get("description").unwrap_or_default().to_string(),
        image: form.images.first().cloned(),
    })
}

#[utoipa::path(
    get,
    path = "/api/setups",
    responses(
        (status = 200, description = "List setups", body = ApiResponse<SetupList>),
    ),
    tag = "Setups"
)]
pub async fn list_setups(State(state): State<AppState>) -> AppResult<Json<ApiResponse<SetupList>>> {
    Ok(Json(setup_service::list_setups(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/setups/{id}",
    params(("id" = Uuid, Path, description = "Setup ID")),
    responses(
        (status = 200, description = "Get setup", body = ApiResponse<Setup>),
        (status = 404, description = "Setup not found"),
    ),
    tag = "Setups"
)]
pub async fn get_setup(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Setup>>> {
    Ok(Json(setup_service::get_setup(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/setups",
    request_body(content = inline(String), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Setup created", body = ApiResponse<Setup>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Setups"
)]
pub async fn create_setup(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<Setup>>> {
    let payload = payload_from_form(&state, &mut multipart).await?;
    Ok(Json(
        setup_service::create_setup(&state, &user, payload).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/setups/{id}",
    params(("id" = Uuid, Path, description = "Setup ID")),
    request_body(content = inline(String), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Setup updated", body = ApiResponse<Setup>),
        (status = 404, description = "Setup not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Setups"
)]
pub async fn update_setup(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<Setup>>> {
    let payload = payload_from_form(&state, &mut multipart).await?;
    Ok(Json(
        setup_service::update_setup(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/setups/{id}",
    params(("id" = Uuid, Path, description = "Setup ID")),
    responses(
        (status = 200, description = "Setup deleted"),
        (status = 404, description = "Setup not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Setups"
)]
pub async fn delete_setup(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(setup_service::delete_setup(&state, &user, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/setups/{id}/products/{product_id}",
    params(
        ("id" = Uuid, Path, description = "Setup ID"),
        ("product_id" = Uuid, Path, description = "Product ID"),
    ),
    responses(
        (status = 200, description = "Product attached"),
        (status = 400, description = "Product is already attached to this setup"),
        (status = 404, description = "Setup or product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Setups"
)]
pub async fn attach_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        setup_service::attach_product(&state, &user, id, product_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/setups/{id}/products",
    params(("id" = Uuid, Path, description = "Setup ID")),
    responses(
        (status = 200, description = "Products in setup", body = ApiResponse<SetupProductList>),
        (status = 404, description = "Setup not found"),
    ),
    tag = "Setups"
)]
pub async fn list_setup_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SetupProductList>>> {
    Ok(Json(setup_service::list_setup_products(&state, id).await?))
}
