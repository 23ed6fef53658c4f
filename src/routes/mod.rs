use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod categories;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;
pub mod reviews;
pub mod setups;
pub mod statistics;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/categories", categories::router())
        .nest("/setups", setups::router())
        .nest("/products", products::router())
        .nest("/reviews", reviews::router())
        .nest("/orders", orders::router())
        .nest("/users", users::router())
        .nest("/statistics", statistics::router())
}
