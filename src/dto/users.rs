use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Product, User};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct Profile {
    #[serde(flatten)]
    pub user: User,
    pub favorites: Vec<Product>,
}

#[derive(Serialize, ToSchema)]
pub struct FavoriteToggle {
    pub favorited: bool,
}

#[derive(Serialize, ToSchema)]
pub struct UserList {
    pub items: Vec<User>,
}
