use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    dto::users::{FavoriteToggle, Profile, UpdateProfileRequest, UserList},
    entity::{
        Favorites, Products, Users,
        favorites::{ActiveModel as FavoriteActive, Column as FavoriteCol},
        users::{ActiveModel as UserActive, Column as UserCol, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::User,
    response::{ApiResponse, Meta},
    services::{auth_service::hash_password, product_service::product_from_entity},
    state::AppState,
};

pub async fn get_profile(state: &AppState, user_id: Uuid) -> AppResult<ApiResponse<Profile>> {
    let user = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let favorites = user
        .find_related(Favorites)
        .find_also_related(Products)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(_, product)| product.map(product_from_entity))
        .collect();

    Ok(ApiResponse::success(
        "Profile",
        Profile {
            user: user_from_entity(user),
            favorites,
        },
        None,
    ))
}

pub async fn update_profile(
    state: &AppState,
    user_id: Uuid,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    let existing = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(email) = payload.email.as_ref().filter(|e| **e != existing.email) {
        let taken = Users::find()
            .filter(UserCol::Email.eq(email.as_str()))
            .one(&state.orm)
            .await?
            .is_some();
        if taken {
            return Err(AppError::Conflict("Email is already taken".into()));
        }
    }
    if let Some(name) = payload.name.as_ref().filter(|n| **n != existing.name) {
        let taken = Users::find()
            .filter(UserCol::Name.eq(name.as_str()))
            .one(&state.orm)
            .await?
            .is_some();
        if taken {
            return Err(AppError::Conflict("Name is already taken".into()));
        }
    }

    let mut active: UserActive = existing.into();
    if let Some(email) = payload.email {
        active.email = Set(email);
    }
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(password) = payload.password.filter(|p| !p.is_empty()) {
        active.password_hash = Set(hash_password(&password)?);
    }
    let user = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Profile updated",
        user_from_entity(user),
        Some(Meta::empty()),
    ))
}

pub async fn toggle_favorite(
    state: &AppState,
    user_id: Uuid,
    product_id: Uuid,
) -> AppResult<ApiResponse<FavoriteToggle>> {
    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let existing = Favorites::find()
        .filter(FavoriteCol::UserId.eq(user_id))
        .filter(FavoriteCol::ProductId.eq(product_id))
        .one(&state.orm)
        .await?;

    let favorited = match existing {
        Some(favorite) => {
            favorite.delete(&state.orm).await?;
            false
        }
        None => {
            FavoriteActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                product_id: Set(product_id),
                created_at: NotSet,
            }
            .insert(&state.orm)
            .await?;
            true
        }
    };

    Ok(ApiResponse::success(
        "Favorite toggled",
        FavoriteToggle { favorited },
        Some(Meta::empty()),
    ))
}

pub async fn list_users(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;

    let items = Users::find()
        .order_by_desc(UserCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    Ok(ApiResponse::success("Users", UserList { items }, None))
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    // Reviews and favorites cascade; placed orders survive with a null user.
    let result = Users::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "User deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        email: model.email,
        name: model.name,
        is_admin: model.is_admin,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
