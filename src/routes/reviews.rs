use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
};
use uuid::Uuid;

use crate::{
    dto::reviews::{AverageRating, LeaveReviewResponse, ReviewList, ReviewPayload},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::review_service,
    state::AppState,
    upload,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(list_reviews))
        .route("/leave/{product_id}", axum::routing::post(leave_review))
        .route(
            "/average-by-product/{product_id}",
            axum::routing::get(average_by_product),
        )
}

#[utoipa::path(
    get,
    path = "/api/reviews",
    responses(
        (status = 200, description = "All reviews, newest first", body = ApiResponse<ReviewList>),
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    Ok(Json(review_service::list_reviews(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/reviews/leave/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    request_body(content = inline(String), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Review created", body = ApiResponse<LeaveReviewResponse>),
        (status = 400, description = "Rating out of range"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn leave_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<LeaveReviewResponse>>> {
    let form = upload::read_form(&state.config, &mut multipart).await?;
    let payload = ReviewPayload {
        rating: form.parse("rating")?,
        text: form.get("text").unwrap_or_default().to_string(),
        image_url: form.images.first().cloned(),
    };
    Ok(Json(
        review_service::leave_review(&state, &user, product_id, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/reviews/average-by-product/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Average rating, null when unreviewed", body = ApiResponse<AverageRating>),
    ),
    tag = "Reviews"
)]
pub async fn average_by_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<AverageRating>>> {
    Ok(Json(
        review_service::average_by_product(&state, product_id).await?,
    ))
}
