use axum::{Json, Router, extract::State};

use crate::{
    dto::auth::{
        AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, RefreshRequest,
        RegisterRequest, ResetPasswordRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", axum::routing::post(register))
        .route("/login", axum::routing::post(login))
        .route("/login/access-token", axum::routing::post(refresh_tokens))
        .route("/change-password", axum::routing::patch(change_password))
        .route("/forgot-password", axum::routing::post(forgot_password))
        .route("/reset-password", axum::routing::patch(reset_password))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = ApiResponse<AuthResponse>),
        (status = 409, description = "Email or name already taken"),
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    Ok(Json(auth_service::register(&state, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Wrong password"),
        (status = 404, description = "Unknown email"),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    Ok(Json(auth_service::login(&state, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/auth/login/access-token",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid or expired refresh token"),
    ),
    tag = "Auth"
)]
pub async fn refresh_tokens(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    Ok(Json(
        auth_service::get_new_tokens(&state, &payload.refresh_token).await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Current password does not match"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        auth_service::change_password(&state, user.user_id, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Always succeeds; does not reveal whether the email exists"),
    ),
    tag = "Auth"
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(auth_service::forgot_password(&state, payload).await?))
}

#[utoipa::path(
    patch,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 400, description = "No token issued or token expired"),
        (status = 401, description = "Token does not match"),
    ),
    tag = "Auth"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(auth_service::reset_password(&state, payload).await?))
}
