use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use rand::RngCore;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    dto::auth::{AuthResponse, Claims, UserSummary},
    entity::{
        Orders, Users,
        orders::Column as OrderCol,
        users::{ActiveModel as UserActive, Column as UserCol, Model as UserModel},
    },
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    state::AppState,
};
use crate::dto::auth::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest,
};

const ACCESS_TOKEN_TTL_HOURS: i64 = 1;
const REFRESH_TOKEN_TTL_DAYS: i64 = 7;
const RESET_TOKEN_TTL_MINUTES: i64 = 15;

pub async fn register(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let RegisterRequest {
        email,
        name,
        password,
    } = payload;

    let email_taken = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?
        .is_some();
    if email_taken {
        return Err(AppError::Conflict("Email is already taken".into()));
    }

    let name_taken = Users::find()
        .filter(UserCol::Name.eq(name.as_str()))
        .one(&state.orm)
        .await?
        .is_some();
    if name_taken {
        return Err(AppError::Conflict("Name is already taken".into()));
    }

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        name: Set(name),
        password_hash: Set(hash_password(&password)?),
        is_admin: Set(false),
        reset_password_token: Set(None),
        reset_password_expire: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    claim_anonymous_orders(state, user.id, &user.email).await?;

    let response = auth_response(state, &user)?;
    Ok(ApiResponse::success(
        "User created",
        response,
        Some(Meta::empty()),
    ))
}

pub async fn login(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let user = Users::find()
        .filter(UserCol::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    verify_password(&user.password_hash, &payload.password)
        .map_err(|_| AppError::Unauthorized("Invalid password".into()))?;

    claim_anonymous_orders(state, user.id, &user.email).await?;

    let response = auth_response(state, &user)?;
    Ok(ApiResponse::success(
        "Logged in",
        response,
        Some(Meta::empty()),
    ))
}

/// Re-issue a token pair from a still-valid refresh token. Expiry is
/// enforced like any other claim.
pub async fn get_new_tokens(
    state: &AppState,
    refresh_token: &str,
) -> AppResult<ApiResponse<AuthResponse>> {
    let claims = decode::<Claims>(
        refresh_token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid refresh token".into()))?
    .claims;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".into()))?;

    let user = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let response = auth_response(state, &user)?;
    Ok(ApiResponse::success(
        "Tokens refreshed",
        response,
        Some(Meta::empty()),
    ))
}

pub async fn change_password(
    state: &AppState,
    user_id: Uuid,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let user = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    verify_password(&user.password_hash, &payload.current_password)
        .map_err(|_| AppError::Unauthorized("Invalid current password".into()))?;

    let mut active: UserActive = user.into();
    active.password_hash = Set(hash_password(&payload.new_password)?);
    active.update(&state.orm).await?;

    Ok(ApiResponse::message_only("Password updated successfully"))
}

/// Always answers success so callers cannot enumerate registered emails.
pub async fn forgot_password(
    state: &AppState,
    payload: ForgotPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let reply = ApiResponse::message_only("If the email is registered, a reset token has been sent");

    let Some(user) = Users::find()
        .filter(UserCol::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?
    else {
        return Ok(reply);
    };

    let token = generate_reset_token();
    let expire = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

    let email = user.email.clone();
    let mut active: UserActive = user.into();
    active.reset_password_token = Set(Some(token.clone()));
    active.reset_password_expire = Set(Some(expire.into()));
    active.update(&state.orm).await?;

    // Token leaves the system only via email.
    if let Some(mailer) = state.mailer.clone() {
        tokio::spawn(async move {
            if let Err(err) = mailer.send_reset_token(&email, &token).await {
                tracing::error!(error = %err, "failed to send password reset email");
            }
        });
    } else {
        tracing::warn!("SMTP not configured, skipping password reset email");
    }

    Ok(reply)
}

pub async fn reset_password(
    state: &AppState,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let user = Users::find()
        .filter(UserCol::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let stored = user
        .reset_password_token
        .clone()
        .ok_or_else(|| AppError::BadRequest("No reset token requested".into()))?;

    if stored != payload.token {
        return Err(AppError::Unauthorized("Invalid reset token".into()));
    }

    let expired = user
        .reset_password_expire
        .map(|expire| expire < Utc::now())
        .unwrap_or(true);
    if expired {
        return Err(AppError::BadRequest("Reset token expired".into()));
    }

    let mut active: UserActive = user.into();
    active.password_hash = Set(hash_password(&payload.new_password)?);
    active.reset_password_token = Set(None);
    active.reset_password_expire = Set(None);
    active.update(&state.orm).await?;

    Ok(ApiResponse::message_only("Password has been reset"))
}

/// Orders placed before the account existed are matched by email and
/// attached to the user.
async fn claim_anonymous_orders(state: &AppState, user_id: Uuid, email: &str) -> AppResult<()> {
    let result = Orders::update_many()
        .col_expr(OrderCol::UserId, Expr::value(user_id))
        .filter(OrderCol::Email.eq(email))
        .filter(OrderCol::UserId.is_null())
        .exec(&state.orm)
        .await?;
    if result.rows_affected > 0 {
        tracing::info!(
            user_id = %user_id,
            orders = result.rows_affected,
            "claimed anonymous orders"
        );
    }
    Ok(())
}

fn auth_response(state: &AppState, user: &UserModel) -> AppResult<AuthResponse> {
    let (access_token, refresh_token) = issue_tokens(&state.config.jwt_secret, user.id)?;
    Ok(AuthResponse {
        user: UserSummary {
            id: user.id,
            email: user.email.clone(),
            is_admin: user.is_admin,
        },
        access_token,
        refresh_token,
    })
}

pub fn issue_tokens(secret: &str, user_id: Uuid) -> AppResult<(String, String)> {
    let access = sign_token(secret, user_id, Duration::hours(ACCESS_TOKEN_TTL_HOURS))?;
    let refresh = sign_token(secret, user_id, Duration::days(REFRESH_TOKEN_TTL_DAYS))?;
    Ok((access, refresh))
}

fn sign_token(secret: &str, user_id: Uuid, ttl: Duration) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("failed to compute token expiry")))?;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn verify_password(stored_hash: &str, password: &str) -> anyhow::Result<()> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|e| anyhow::anyhow!(e.to_string()))
}

fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password(&hash, "hunter2").is_ok());
        assert!(verify_password(&hash, "hunter3").is_err());
    }

    #[test]
    fn tokens_carry_only_the_user_id() {
        let user_id = Uuid::new_v4();
        let (access, refresh) = issue_tokens("test-secret", user_id).unwrap();
        assert_ne!(access, refresh);

        for token in [access, refresh] {
            let claims = decode::<Claims>(
                &token,
                &DecodingKey::from_secret(b"test-secret"),
                &Validation::default(),
            )
            .unwrap()
            .claims;
            assert_eq!(claims.sub, user_id.to_string());
            assert!(claims.exp > Utc::now().timestamp() as usize);
        }
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let (access, _) = issue_tokens("secret-a", Uuid::new_v4()).unwrap();
        let result = decode::<Claims>(
            &access,
            &DecodingKey::from_secret(b"secret-b"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn reset_tokens_are_opaque_and_unique() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }
}
