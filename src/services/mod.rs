pub mod auth_service;
pub mod category_service;
pub mod order_service;
pub mod product_service;
pub mod review_service;
pub mod setup_service;
pub mod statistic_service;
pub mod user_service;
