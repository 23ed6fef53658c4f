use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    crypto::FieldCipher,
    dto::orders::{
        CheckoutSessionResponse, OrderItemWithProduct, OrderList, OrderWithItems,
        PlaceOrderRequest, ProductSummary,
    },
    entity::{
        OrderItems, Orders, Products, WebhookEvents,
        order_items::{ActiveModel as OrderItemActive, Model as OrderItemModel},
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Model as OrderModel, STATUS_PAYED,
            STATUS_PENDING,
        },
        products::Model as ProductModel,
        webhook_events::ActiveModel as WebhookEventActive,
    },
    error::{AppError, AppResult},
    mail::{OrderEmail, OrderEmailItem},
    middleware::auth::{AuthUser, MaybeAuthUser, ensure_admin},
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Creates the order row, its item snapshots and a Stripe checkout session.
///
/// The session is created first so the order can be stored with its payment
/// URL; if Stripe rejects the request nothing is persisted. The order and its
/// items go in within one transaction.
pub async fn place_order(
    state: &AppState,
    user: &MaybeAuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<CheckoutSessionResponse>> {
    if payload.items.is_empty() {
        return Err(AppError::BadRequest("Order has no items".into()));
    }
    for item in &payload.items {
        if item.quantity <= 0 {
            return Err(AppError::BadRequest("Quantity must be positive".into()));
        }
        if item.price <= 0 {
            return Err(AppError::BadRequest("Price must be positive".into()));
        }
    }

    let mut products = HashMap::new();
    for item in &payload.items {
        if !products.contains_key(&item.product_id) {
            let product = Products::find_by_id(item.product_id)
                .one(&state.orm)
                .await?
                .ok_or_else(|| {
                    AppError::BadRequest(format!("Unknown product {}", item.product_id))
                })?;
            products.insert(item.product_id, product);
        }
    }

    let order_id = Uuid::new_v4();
    let total = compute_total(payload.items.iter().map(|i| (i.price, i.quantity)))
        .ok_or_else(|| AppError::BadRequest("Order total overflows".into()))?;

    let session = create_checkout_session(state, order_id, &payload, &products).await?;
    let payment_url = session.url.clone().ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("checkout session came back without a url"))
    })?;

    let cipher = &state.cipher;
    let txn = state.orm.begin().await?;
    OrderActive {
        id: Set(order_id),
        status: Set(STATUS_PENDING.to_string()),
        total: Set(total),
        payment_intent_id: Set(String::new()),
        payment_url: Set(payment_url.clone()),
        first_name: Set(cipher.encrypt(&payload.first_name)),
        last_name: Set(cipher.encrypt(&payload.last_name)),
        country: Set(cipher.encrypt(&payload.country)),
        state: Set(cipher.encrypt(&payload.state)),
        city: Set(cipher.encrypt(&payload.city)),
        post_code: Set(cipher.encrypt(&payload.post_code)),
        street: Set(cipher.encrypt(&payload.street)),
        house: Set(cipher.encrypt(&payload.house)),
        phone_code: Set(cipher.encrypt(&payload.phone_code)),
        phone: Set(cipher.encrypt(&payload.phone)),
        email: Set(payload.email.clone()),
        user_id: Set(user.0.as_ref().map(|u| u.user_id)),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;
    for item in &payload.items {
        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            price: Set(item.price),
            kind: Set(item.kind.clone()),
            color: Set(item.color.clone()),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    tracing::info!(order_id = %order_id, total, "order placed, awaiting payment");

    Ok(ApiResponse::success(
        "Checkout session created",
        CheckoutSessionResponse {
            id: session.id.to_string(),
            url: payment_url,
        },
        Some(Meta::empty()),
    ))
}

async fn create_checkout_session(
    state: &AppState,
    order_id: Uuid,
    payload: &PlaceOrderRequest,
    products: &HashMap<Uuid, ProductModel>,
) -> AppResult<stripe::CheckoutSession> {
    let mut line_items = Vec::with_capacity(payload.items.len());
    for item in &payload.items {
        let product = &products[&item.product_id];
        line_items.push(stripe::CreateCheckoutSessionLineItems {
            price_data: Some(stripe::CreateCheckoutSessionLineItemsPriceData {
                currency: stripe::Currency::USD,
                product_data: Some(stripe::CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: product.name.clone(),
                    images: Some(product.images.iter().take(1).cloned().collect()),
                    ..Default::default()
                }),
                unit_amount: Some(item.price),
                ..Default::default()
            }),
            quantity: Some(item.quantity as u64),
            ..Default::default()
        });
    }

    let mut metadata = HashMap::new();
    metadata.insert("order_id".to_string(), order_id.to_string());

    let mut params = stripe::CreateCheckoutSession::new();
    params.success_url = Some(&state.config.client_success_url);
    params.cancel_url = Some(&state.config.client_cancel_url);
    params.mode = Some(stripe::CheckoutSessionMode::Payment);
    params.customer_email = Some(&payload.email);
    params.payment_method_types = Some(vec![
        stripe::CreateCheckoutSessionPaymentMethodTypes::Card,
    ]);
    params.line_items = Some(line_items);
    params.metadata = Some(metadata);

    stripe::CheckoutSession::create(&state.stripe, params)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, order_id = %order_id, "failed to create checkout session");
            AppError::Internal(anyhow::anyhow!("stripe checkout session failed: {e}"))
        })
}

/// A verified `checkout.session.completed` delivery, reduced to the pieces
/// the order flow needs.
#[derive(Debug)]
pub struct CompletedCheckout {
    pub event_id: String,
    pub order_id: Uuid,
    pub payment_intent_id: String,
    pub payer_email: Option<String>,
}

/// Marks the order payed and records the event id so a redelivery is a no-op.
/// Returns false when the event was already processed.
pub async fn apply_checkout_completed(
    state: &AppState,
    completed: CompletedCheckout,
) -> AppResult<bool> {
    let seen = WebhookEvents::find_by_id(completed.event_id.clone())
        .one(&state.orm)
        .await?
        .is_some();
    if seen {
        tracing::info!(event_id = %completed.event_id, "duplicate webhook delivery, skipping");
        return Ok(false);
    }

    let order = Orders::find_by_id(completed.order_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let txn = state.orm.begin().await?;
    let mut active: OrderActive = order.into();
    active.status = Set(STATUS_PAYED.to_string());
    active.payment_intent_id = Set(completed.payment_intent_id);
    if let Some(email) = completed.payer_email {
        active.email = Set(email);
    }
    let order = active.update(&txn).await?;
    WebhookEventActive {
        id: Set(completed.event_id.clone()),
        event_type: Set("checkout.session.completed".to_string()),
        processed_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, event_id = %completed.event_id, "order payed");

    send_confirmation(state, order).await;

    Ok(true)
}

/// Best effort: a failed mail never bubbles into the webhook response.
async fn send_confirmation(state: &AppState, order: OrderModel) {
    let Some(mailer) = state.mailer.clone() else {
        tracing::warn!(order_id = %order.id, "no SMTP configured, skipping confirmation email");
        return;
    };

    let items = match order
        .find_related(OrderItems)
        .find_also_related(Products)
        .all(&state.orm)
        .await
    {
        Ok(items) => items,
        Err(err) => {
            tracing::error!(error = %err, order_id = %order.id, "failed to load items for confirmation email");
            return;
        }
    };

    let cipher = &state.cipher;
    let email = OrderEmail {
        first_name: cipher.decrypt(&order.first_name),
        last_name: cipher.decrypt(&order.last_name),
        country: cipher.decrypt(&order.country),
        state: cipher.decrypt(&order.state),
        city: cipher.decrypt(&order.city),
        post_code: cipher.decrypt(&order.post_code),
        street: cipher.decrypt(&order.street),
        house: cipher.decrypt(&order.house),
        phone_code: cipher.decrypt(&order.phone_code),
        phone: cipher.decrypt(&order.phone),
        email: order.email.clone(),
        items: items
            .into_iter()
            .map(|(item, product)| OrderEmailItem {
                name: product
                    .map(|p| p.name)
                    .unwrap_or_else(|| "Removed product".to_string()),
                quantity: item.quantity,
            })
            .collect(),
        total: order.total,
    };

    let to = order.email.clone();
    let order_id = order.id;
    tokio::spawn(async move {
        if let Err(err) = mailer.send_order_paid(&to, &email).await {
            tracing::error!(error = %err, order_id = %order_id, "failed to send confirmation email");
        }
    });
}

pub async fn get_all(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;

    let orders = Orders::find()
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;
    let items = attach_items(state, orders).await?;

    Ok(ApiResponse::success("Orders", OrderList { items }, None))
}

pub async fn get_by_user(state: &AppState, user_id: Uuid) -> AppResult<ApiResponse<OrderList>> {
    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(user_id))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;
    let items = attach_items(state, orders).await?;

    Ok(ApiResponse::success("Orders", OrderList { items }, None))
}

async fn attach_items(
    state: &AppState,
    orders: Vec<OrderModel>,
) -> AppResult<Vec<OrderWithItems>> {
    let mut out = Vec::with_capacity(orders.len());
    for order in orders {
        let items = order
            .find_related(OrderItems)
            .find_also_related(Products)
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|(item, product)| OrderItemWithProduct {
                item: order_item_from_entity(item),
                product: product.map(|p| ProductSummary {
                    id: p.id,
                    name: p.name,
                    slug: p.slug,
                    price: p.price,
                    images: p.images,
                }),
            })
            .collect();
        out.push(OrderWithItems {
            order: order_from_entity(&state.cipher, order),
            items,
        });
    }
    Ok(out)
}

/// None when a client-supplied price pushes the sum past i64.
fn compute_total(mut items: impl Iterator<Item = (i64, i32)>) -> Option<i64> {
    items.try_fold(0i64, |acc, (price, quantity)| {
        acc.checked_add(price.checked_mul(quantity as i64)?)
    })
}

pub(crate) fn order_from_entity(cipher: &FieldCipher, model: OrderModel) -> Order {
    Order {
        id: model.id,
        status: model.status,
        total: model.total,
        payment_intent_id: model.payment_intent_id,
        payment_url: model.payment_url,
        first_name: cipher.decrypt(&model.first_name),
        last_name: cipher.decrypt(&model.last_name),
        country: cipher.decrypt(&model.country),
        state: cipher.decrypt(&model.state),
        city: cipher.decrypt(&model.city),
        post_code: cipher.decrypt(&model.post_code),
        street: cipher.decrypt(&model.street),
        house: cipher.decrypt(&model.house),
        phone_code: cipher.decrypt(&model.phone_code),
        phone: cipher.decrypt(&model.phone),
        email: model.email,
        user_id: model.user_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
        price: model.price,
        kind: model.kind,
        color: model.color,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::compute_total;

    #[test]
    fn total_is_price_times_quantity_summed() {
        let items = [(1000i64, 2i32), (550, 1), (99, 3)];
        assert_eq!(compute_total(items.into_iter()), Some(2847));
    }

    #[test]
    fn total_of_no_items_is_zero() {
        assert_eq!(compute_total(std::iter::empty()), Some(0));
    }

    #[test]
    fn total_refuses_overflow() {
        assert_eq!(compute_total([(i64::MAX, 2i32)].into_iter()), None);
        assert_eq!(
            compute_total([(i64::MAX, 1i32), (1, 1)].into_iter()),
            None
        );
    }
}
