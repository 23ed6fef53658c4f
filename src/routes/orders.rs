use std::collections::HashMap;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use stripe::{EventObject, EventType, Webhook};
use uuid::Uuid;

use crate::{
    dto::orders::{CheckoutSessionResponse, OrderList, PlaceOrderRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, MaybeAuthUser},
    response::ApiResponse,
    services::order_service::{self, CompletedCheckout},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(place_order))
        .route("/", axum::routing::get(list_all_orders))
        .route("/by-user", axum::routing::get(list_my_orders))
        .route("/webhook", axum::routing::post(stripe_webhook))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 200, description = "Checkout session created", body = ApiResponse<CheckoutSessionResponse>),
        (status = 400, description = "Empty order or unknown product"),
    ),
    tag = "Orders"
)]
pub async fn place_order(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<Json<ApiResponse<CheckoutSessionResponse>>> {
    Ok(Json(
        order_service::place_order(&state, &user, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "All orders, newest first", body = ApiResponse<OrderList>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    Ok(Json(order_service::get_all(&state, &user).await?))
}

#[utoipa::path(
    get,
    path = "/api/orders/by-user",
    responses(
        (status = 200, description = "Orders of the calling user", body = ApiResponse<OrderList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    Ok(Json(order_service::get_by_user(&state, user.user_id).await?))
}

/// Stripe delivery endpoint. Signature failures are rejected; everything
/// after a verified signature is acknowledged so Stripe does not retry
/// deliveries we cannot ever process.
#[utoipa::path(
    post,
    path = "/api/orders/webhook",
    request_body = String,
    responses(
        (status = 200, description = "Event acknowledged"),
        (status = 400, description = "Bad signature"),
    ),
    tag = "Orders"
)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Bytes,
) -> AppResult<StatusCode> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing stripe-signature header".into()))?;
    let payload = std::str::from_utf8(&payload)
        .map_err(|_| AppError::BadRequest("Invalid UTF-8 in payload".into()))?;

    let event = Webhook::construct_event(payload, signature, &state.config.stripe_webhook_secret)
        .map_err(|e| AppError::BadRequest(format!("Webhook signature verification failed: {e}")))?;

    match event.type_ {
        EventType::CheckoutSessionCompleted => {
            if let EventObject::CheckoutSession(session) = &event.data.object {
                let Some(completed) = completed_checkout(
                    event.id.as_str(),
                    session.metadata.as_ref(),
                    session.payment_intent.as_ref().map(|pi| pi.id().to_string()),
                    session
                        .customer_details
                        .as_ref()
                        .and_then(|d| d.email.clone()),
                ) else {
                    tracing::error!(
                        event_id = %event.id,
                        "checkout session without an order_id or payment intent, dropping"
                    );
                    return Ok(StatusCode::OK);
                };

                if let Err(err) = order_service::apply_checkout_completed(&state, completed).await {
                    tracing::error!(error = %err, event_id = %event.id, "failed to process checkout completion");
                }
            }
        }
        other => {
            tracing::debug!(event_type = %other, "unhandled webhook event type");
        }
    }

    Ok(StatusCode::OK)
}

/// Pulls the fields we act on out of a completed checkout session. A
/// session without our order_id metadata or without a payment intent
/// cannot be tied to an order, so it yields nothing.
fn completed_checkout(
    event_id: &str,
    metadata: Option<&HashMap<String, String>>,
    payment_intent_id: Option<String>,
    payer_email: Option<String>,
) -> Option<CompletedCheckout> {
    let order_id = metadata
        .and_then(|m| m.get("order_id"))
        .and_then(|raw| Uuid::parse_str(raw).ok())?;
    Some(CompletedCheckout {
        event_id: event_id.to_string(),
        order_id,
        payment_intent_id: payment_intent_id?,
        payer_email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata_with(order_id: &str) -> HashMap<String, String> {
        HashMap::from([("order_id".to_string(), order_id.to_string())])
    }

    #[test]
    fn session_without_metadata_yields_nothing() {
        let result = completed_checkout("evt_1", None, Some("pi_1".into()), None);
        assert!(result.is_none());
    }

    #[test]
    fn session_with_garbled_order_id_yields_nothing() {
        let metadata = metadata_with("not-a-uuid");
        let result = completed_checkout("evt_1", Some(&metadata), Some("pi_1".into()), None);
        assert!(result.is_none());
    }

    #[test]
    fn session_without_payment_intent_yields_nothing() {
        let metadata = metadata_with(&Uuid::new_v4().to_string());
        let result = completed_checkout("evt_1", Some(&metadata), None, None);
        assert!(result.is_none());
    }

    #[test]
    fn session_with_order_and_payment_intent_is_accepted() {
        let order_id = Uuid::new_v4();
        let metadata = metadata_with(&order_id.to_string());
        let completed = completed_checkout(
            "evt_1",
            Some(&metadata),
            Some("pi_1".into()),
            Some("payer@example.com".into()),
        )
        .unwrap();
        assert_eq!(completed.event_id, "evt_1");
        assert_eq!(completed.order_id, order_id);
        assert_eq!(completed.payment_intent_id, "pi_1");
        assert_eq!(completed.payer_email.as_deref(), Some("payer@example.com"));
    }
}
