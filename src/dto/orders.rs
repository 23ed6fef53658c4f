use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub post_code: String,
    pub street: String,
    pub house: String,
    pub phone_code: String,
    pub phone: String,
    pub email: String,
}

/// Item snapshot as submitted by the client. The price is trusted as-is;
/// the checkout line item must use the same number so the stored total and
/// the charged amount agree.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Minor units (cents).
    pub price: i64,
    pub kind: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutSessionResponse {
    pub id: String,
    pub url: String,
}

/// Slimmed product columns embedded in order listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub price: i64,
    pub images: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemWithProduct {
    #[serde(flatten)]
    pub item: OrderItem,
    pub product: Option<ProductSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemWithProduct>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderWithItems>,
}
