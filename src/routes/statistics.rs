use axum::{Json, Router, extract::State};

use crate::{
    dto::statistics::StatisticItem,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::statistic_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/main", axum::routing::get(get_main))
}

#[utoipa::path(
    get,
    path = "/api/statistics/main",
    responses(
        (status = 200, description = "Dashboard figures", body = ApiResponse<Vec<StatisticItem>>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Statistics"
)]
pub async fn get_main(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<StatisticItem>>>> {
    Ok(Json(statistic_service::get_main(&state, &user).await?))
}
