use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    dto::setups::{SetupList, SetupPayload, SetupProductList},
    entity::{
        Products, SetupProducts, Setups,
        setup_products::{ActiveModel as SetupProductActive, Column as SetupProductCol},
        setups::{ActiveModel, Model as SetupModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Setup,
    response::{ApiResponse, Meta},
    services::product_service::product_from_entity,
    state::AppState,
};

pub async fn list_setups(state: &AppState) -> AppResult<ApiResponse<SetupList>> {
    let items = Setups::find()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(setup_from_entity)
        .collect();
    Ok(ApiResponse::success("Setups", SetupList { items }, None))
}

pub async fn get_setup(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Setup>> {
    let setup = Setups::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Setup", setup_from_entity(setup), None))
}

pub async fn create_setup(
    state: &AppState,
    user: &AuthUser,
    payload: SetupPayload,
) -> AppResult<ApiResponse<Setup>> {
    ensure_admin(user)?;

    let setup = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        description: Set(payload.description),
        image: Set(payload.image),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Setup created",
        setup_from_entity(setup),
        Some(Meta::empty()),
    ))
}

pub async fn update_setup(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: SetupPayload,
) -> AppResult<ApiResponse<Setup>> {
    ensure_admin(user)?;

    let existing = Setups::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    active.name = Set(payload.name);
    active.description = Set(payload.description);
    if payload.image.is_some() {
        active.image = Set(payload.image);
    }
    let setup = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Setup updated",
        setup_from_entity(setup),
        Some(Meta::empty()),
    ))
}

pub async fn delete_setup(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let result = Setups::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Setup deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Attach a product to a setup through the join table. A product may belong
/// to any number of setups; the same pair twice is a BadRequest.
pub async fn attach_product(
    state: &AppState,
    user: &AuthUser,
    setup_id: Uuid,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    Setups::find_by_id(setup_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let already = SetupProducts::find()
        .filter(SetupProductCol::SetupId.eq(setup_id))
        .filter(SetupProductCol::ProductId.eq(product_id))
        .one(&state.orm)
        .await?
        .is_some();
    if already {
        return Err(AppError::BadRequest(
            "Product is already attached to this setup".into(),
        ));
    }

    SetupProductActive {
        id: Set(Uuid::new_v4()),
        setup_id: Set(setup_id),
        product_id: Set(product_id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Product attached",
        serde_json::json!({ "setup_id": setup_id, "product_id": product_id }),
        Some(Meta::empty()),
    ))
}

pub async fn list_setup_products(
    state: &AppState,
    setup_id: Uuid,
) -> AppResult<ApiResponse<SetupProductList>> {
    let setup = Setups::find_by_id(setup_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = setup
        .find_related(Products)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Setup products",
        SetupProductList { items },
        None,
    ))
}

fn setup_from_entity(model: SetupModel) -> Setup {
    Setup {
        id: model.id,
        name: model.name,
        description: model.description,
        image: model.image,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
