use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Product, ProductVariant};

/// Built by the route from multipart fields. `images` is only applied when
/// the request actually uploaded files, so updates without files keep the
/// existing image set.
#[derive(Debug)]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub info: String,
    pub remains: i32,
    pub category_id: Uuid,
    pub images: Vec<String>,
}

#[derive(Debug)]
pub struct VariantPayload {
    pub color: String,
    pub kind: Option<String>,
    pub images: Vec<String>,
}

/// Filtered product page plus the unpaginated match count.
#[derive(Serialize, ToSchema)]
pub struct ProductList {
    pub products: Vec<Product>,
    pub length: i64,
}

#[derive(Serialize, ToSchema)]
pub struct ProductVariantList {
    pub items: Vec<ProductVariant>,
}
