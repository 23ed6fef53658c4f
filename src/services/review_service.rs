use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    dto::reviews::{AverageRating, LeaveReviewResponse, ReviewList, ReviewPayload},
    entity::{
        Products, Reviews,
        reviews::{ActiveModel, Column, Model as ReviewModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Review,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_reviews(state: &AppState) -> AppResult<ApiResponse<ReviewList>> {
    let items = Reviews::find()
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(review_from_entity)
        .collect();
    Ok(ApiResponse::success("Reviews", ReviewList { items }, None))
}

pub async fn leave_review(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: ReviewPayload,
) -> AppResult<ApiResponse<LeaveReviewResponse>> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest(
            "Rating must be between 1 and 5".into(),
        ));
    }

    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let review = ActiveModel {
        id: Set(Uuid::new_v4()),
        rating: Set(payload.rating),
        text: Set(payload.text),
        image_url: Set(payload.image_url),
        product_id: Set(product_id),
        user_id: Set(user.user_id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Review created",
        LeaveReviewResponse {
            review: review_from_entity(review),
            username: user.name.clone(),
        },
        Some(Meta::empty()),
    ))
}

pub async fn average_by_product(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<AverageRating>> {
    // NULL when the product has no reviews yet.
    let (rating,): (Option<f64>,) =
        sqlx::query_as("SELECT AVG(rating)::float8 FROM reviews WHERE product_id = $1")
            .bind(product_id)
            .fetch_one(&state.pool)
            .await?;

    Ok(ApiResponse::success(
        "Average rating",
        AverageRating { rating },
        None,
    ))
}

fn review_from_entity(model: ReviewModel) -> Review {
    Review {
        id: model.id,
        rating: model.rating,
        text: model.text,
        image_url: model.image_url,
        product_id: model.product_id,
        user_id: model.user_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
