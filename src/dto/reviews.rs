use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Review;

#[derive(Debug)]
pub struct ReviewPayload {
    pub rating: i32,
    pub text: String,
    pub image_url: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ReviewList {
    pub items: Vec<Review>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveReviewResponse {
    #[serde(flatten)]
    pub review: Review,
    pub username: String,
}

#[derive(Serialize, ToSchema)]
pub struct AverageRating {
    pub rating: Option<f64>,
}
