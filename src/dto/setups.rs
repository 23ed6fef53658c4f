use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Product, Setup};

#[derive(Debug)]
pub struct SetupPayload {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SetupList {
    pub items: Vec<Setup>,
}

#[derive(Serialize, ToSchema)]
pub struct SetupProductList {
    pub items: Vec<Product>,
}
