use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Category;

/// Built by the route from multipart fields; the image, if any, is already
/// an absolute URL under the upload base.
#[derive(Debug)]
pub struct CategoryPayload {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}
